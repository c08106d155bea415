use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

pub const DEFAULT_CATEGORY: &str = "General";

/// Expense record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Expense {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: String, // owning principal, never sent back
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub category: String,
    pub description: String,
    pub amount: Decimal, // NUMERIC(18,2)
    pub receipt_url: Option<String>,
}

/// Validated fields for a new expense; the owner is supplied separately.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: OffsetDateTime,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub receipt_url: Option<String>,
}
