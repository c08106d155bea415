use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

use super::{
    aggregation::ChartPoint,
    filter::Filter,
    repo_types::{Expense, NewExpense, DEFAULT_CATEGORY},
};
use crate::error::AppError;

pub const MAX_CATEGORY_LEN: usize = 64;

// 18 digits with 2 after the point
const MAX_AMOUNT_EXCLUSIVE: i64 = 10_000_000_000_000_000;

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD&category=...`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExpenseQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
}

impl ExpenseQuery {
    pub fn to_filter(&self) -> Result<Filter, AppError> {
        Ok(Filter::new(
            parse_query_date("from", self.from.as_deref())?,
            parse_query_date("to", self.to.as_deref())?,
            self.category.clone(),
        ))
    }
}

fn parse_query_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub items: Vec<Expense>,
    pub total: Decimal,
    pub categories: Vec<String>,
    pub filters: ExpenseQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub by_category: Vec<ChartPoint>,
    pub by_month: Vec<ChartPoint>,
}

/// Raw text fields of the create form, echoed back untouched on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateExpenseForm {
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseFormView {
    pub form: CreateExpenseForm,
    pub errors: Vec<FieldError>,
}

impl CreateExpenseForm {
    /// Blank form as first shown to the user.
    pub fn blank(today: Date) -> Self {
        Self {
            date: Some(today.to_string()),
            category: Some(DEFAULT_CATEGORY.to_string()),
            description: Some(String::new()),
            amount: Some(String::new()),
        }
    }

    /// Checks every field and collects all problems at once. `now` stands in
    /// for a missing date.
    pub fn validate(&self, now: OffsetDateTime) -> Result<NewExpense, Vec<FieldError>> {
        let mut errors = Vec::new();

        let date = match self.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Some(now),
            Some(raw) => {
                let parsed = parse_form_date(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new("date", "date is not a valid date"));
                }
                parsed
            }
        };

        let category = match self.category.as_deref().map(str::trim) {
            None => Some(DEFAULT_CATEGORY.to_string()),
            Some("") => {
                errors.push(FieldError::new("category", "category is required"));
                None
            }
            Some(c) if c.chars().count() > MAX_CATEGORY_LEN => {
                errors.push(FieldError::new(
                    "category",
                    format!("category must be at most {MAX_CATEGORY_LEN} characters"),
                ));
                None
            }
            Some(c) => Some(c.to_string()),
        };

        let description = match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => Some(d.to_string()),
            _ => {
                errors.push(FieldError::new("description", "description is required"));
                None
            }
        };

        let amount = match self.amount.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => {
                errors.push(FieldError::new("amount", "amount is required"));
                None
            }
            Some(raw) => match parse_amount(raw) {
                Ok(a) => Some(a),
                Err(msg) => {
                    errors.push(FieldError::new("amount", msg));
                    None
                }
            },
        };

        match (date, category, description, amount) {
            (Some(date), Some(category), Some(description), Some(amount)) if errors.is_empty() => {
                Ok(NewExpense {
                    date,
                    category,
                    description,
                    amount,
                    receipt_url: None,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` (as sent by date inputs) or RFC 3339.
fn parse_form_date(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(d) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(d.midnight().assume_utc());
    }
    PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    let amount = Decimal::from_str(raw).map_err(|_| "amount must be a number")?;
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if amount.abs() >= Decimal::from(MAX_AMOUNT_EXCLUSIVE) {
        return Err("amount is too large");
    }
    Ok(amount)
}
