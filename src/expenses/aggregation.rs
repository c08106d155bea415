//! Chart windows and group-by sums.
//!
//! Both charts keep the caller's category restriction but substitute their
//! own date window for any bound the caller left open.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use time::{Date, Duration, Month};

use super::{filter::Filter, repo_types::Expense};

const CATEGORY_WINDOW_DAYS: i64 = 90;
const MONTH_WINDOW_MONTHS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    #[serde(serialize_with = "exact_number")]
    pub amount: Decimal,
}

/// Writes the decimal as a bare JSON number with every digit kept.
fn exact_number<S: Serializer>(amount: &Decimal, s: S) -> Result<S::Ok, S::Error> {
    RawValue::from_string(amount.to_string())
        .map_err(serde::ser::Error::custom)?
        .serialize(s)
}

/// Filter for the by-category chart: explicit bounds win, otherwise the last
/// 90 days ending `today`.
pub fn category_window(filter: &Filter, today: Date) -> Filter {
    let from = filter
        .from
        .unwrap_or_else(|| today - Duration::days(CATEGORY_WINDOW_DAYS - 1));
    let to = filter.to.unwrap_or(today);
    filter.with_window(from, to)
}

/// Filter for the by-month chart: explicit bounds win, otherwise the six
/// calendar months ending with the current one.
pub fn month_window(filter: &Filter, today: Date) -> Filter {
    let from = filter
        .from
        .unwrap_or_else(|| first_of_month_back(today, MONTH_WINDOW_MONTHS - 1));
    let to = filter.to.unwrap_or(today);
    filter.with_window(from, to)
}

fn first_of_month_back(today: Date, months: i32) -> Date {
    let index = today.year() * 12 + (today.month() as i32 - 1) - months;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    Date::from_calendar_date(year, month, 1).unwrap_or(today)
}

/// Sum per category, largest first. Equal sums are ordered by label.
pub fn sum_by_category(expenses: &[Expense]) -> Vec<ChartPoint> {
    let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
    for e in expenses {
        *sums.entry(e.category.as_str()).or_default() += e.amount;
    }
    let mut points: Vec<ChartPoint> = sums
        .into_iter()
        .map(|(label, amount)| ChartPoint {
            label: label.to_string(),
            amount,
        })
        .collect();
    points.sort_by(|a, b| b.amount.cmp(&a.amount));
    points
}

/// Sum per calendar month, labelled `YYYY-MM`, oldest first.
pub fn sum_by_month(expenses: &[Expense]) -> Vec<ChartPoint> {
    let mut sums: BTreeMap<(i32, u8), Decimal> = BTreeMap::new();
    for e in expenses {
        *sums
            .entry((e.date.year(), e.date.month() as u8))
            .or_default() += e.amount;
    }
    sums.into_iter()
        .map(|((year, month), amount)| ChartPoint {
            label: format!("{:04}-{:02}", year, month),
            amount,
        })
        .collect()
}
