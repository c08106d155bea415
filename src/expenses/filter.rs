//! Filter value used by the ledger and the charts, and its two renderings:
//! an SQL fragment for Postgres and an in-process predicate.

use sqlx::{Postgres, QueryBuilder};
use time::{macros::time, Date, OffsetDateTime, PrimitiveDateTime};

use super::repo_types::Expense;

/// Category value meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub category: Option<String>,
}

impl Filter {
    /// Builds a filter, dropping a blank or `"All"` category.
    pub fn new(from: Option<Date>, to: Option<Date>, category: Option<String>) -> Self {
        let category = category.filter(|c| !c.trim().is_empty() && c != ALL_CATEGORIES);
        Self { from, to, category }
    }

    /// Same category restriction, different date window.
    pub fn with_window(&self, from: Date, to: Date) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            category: self.category.clone(),
        }
    }

    pub fn lower_bound(&self) -> Option<OffsetDateTime> {
        self.from.map(start_of_day)
    }

    pub fn upper_bound(&self) -> Option<OffsetDateTime> {
        self.to.map(end_of_day)
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(lo) = self.lower_bound() {
            if expense.date < lo {
                return false;
            }
        }
        if let Some(hi) = self.upper_bound() {
            if expense.date > hi {
                return false;
            }
        }
        match &self.category {
            Some(c) => expense.category == *c,
            None => true,
        }
    }

    /// Appends ` AND ...` conditions for every present field. The caller has
    /// already opened the `WHERE` clause.
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(lo) = self.lower_bound() {
            qb.push(" AND date >= ").push_bind(lo);
        }
        if let Some(hi) = self.upper_bound() {
            qb.push(" AND date <= ").push_bind(hi);
        }
        if let Some(category) = &self.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
    }
}

pub fn start_of_day(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

/// Last representable instant of `date`.
pub fn end_of_day(date: Date) -> OffsetDateTime {
    PrimitiveDateTime::new(date, time!(23:59:59.999999999)).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};

    fn expense(at: OffsetDateTime, category: &str) -> Expense {
        Expense {
            id: 1,
            user_id: "u".into(),
            date: at,
            category: category.into(),
            description: "d".into(),
            amount: Decimal::ONE,
            receipt_url: None,
        }
    }

    #[test]
    fn category_all_or_blank_means_no_restriction() {
        assert_eq!(Filter::new(None, None, Some("All".into())).category, None);
        assert_eq!(Filter::new(None, None, Some("  ".into())).category, None);
        assert_eq!(
            Filter::new(None, None, Some("Food".into())).category.as_deref(),
            Some("Food")
        );
    }

    #[test]
    fn category_is_exact_match() {
        let f = Filter::new(None, None, Some("Food".into()));
        let at = datetime!(2024-01-10 12:00 UTC);
        assert!(f.matches(&expense(at, "Food")));
        assert!(!f.matches(&expense(at, "food")));
        assert!(!f.matches(&expense(at, "Food ")));
        assert!(!f.matches(&expense(at, "Travel")));
    }

    #[test]
    fn single_day_range_covers_whole_day() {
        let f = Filter::new(Some(date!(2024-01-10)), Some(date!(2024-01-10)), None);
        assert!(f.matches(&expense(datetime!(2024-01-10 00:00 UTC), "x")));
        assert!(f.matches(&expense(datetime!(2024-01-10 23:59:59.999999 UTC), "x")));
        assert!(!f.matches(&expense(datetime!(2024-01-09 23:59:59.999999 UTC), "x")));
        assert!(!f.matches(&expense(datetime!(2024-01-11 00:00 UTC), "x")));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = Filter::default();
        assert!(f.matches(&expense(datetime!(1999-12-31 23:00 UTC), "any")));
    }

    #[test]
    fn with_window_keeps_category() {
        let f = Filter::new(Some(date!(2020-01-01)), None, Some("Food".into()));
        let w = f.with_window(date!(2024-01-01), date!(2024-03-31));
        assert_eq!(w.from, Some(date!(2024-01-01)));
        assert_eq!(w.to, Some(date!(2024-03-31)));
        assert_eq!(w.category.as_deref(), Some("Food"));
    }

    #[test]
    fn sql_fragment_only_binds_present_fields() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM expenses WHERE user_id = ");
        qb.push_bind("u".to_string());
        Filter::default().push_conditions(&mut qb);
        assert_eq!(qb.sql(), "SELECT 1 FROM expenses WHERE user_id = $1");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM expenses WHERE user_id = ");
        qb.push_bind("u".to_string());
        Filter::new(Some(date!(2024-01-01)), Some(date!(2024-01-31)), Some("Food".into()))
            .push_conditions(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM expenses WHERE user_id = $1 AND date >= $2 AND date <= $3 AND category = $4"
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM expenses WHERE user_id = ");
        qb.push_bind("u".to_string());
        Filter::new(None, Some(date!(2024-01-31)), None).push_conditions(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM expenses WHERE user_id = $1 AND date <= $2"
        );
    }
}
