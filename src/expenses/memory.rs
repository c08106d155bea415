//! In-process [`ExpenseStore`] used by the test suite.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    filter::Filter,
    repo::ExpenseStore,
    repo_types::{Expense, NewExpense},
};
use crate::auth::UserId;

#[derive(Default)]
pub struct MemoryExpenseStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<Expense>,
}

impl MemoryExpenseStore {
    /// Every row regardless of owner.
    pub async fn all(&self) -> Vec<Expense> {
        self.inner.read().await.rows.clone()
    }
}

#[async_trait]
impl ExpenseStore for MemoryExpenseStore {
    async fn list_categories(&self, user_id: &UserId) -> anyhow::Result<Vec<String>> {
        let inner = self.inner.read().await;
        let mut categories: Vec<String> = inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id.as_str())
            .map(|e| e.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn list(&self, user_id: &UserId, filter: &Filter) -> anyhow::Result<Vec<Expense>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Expense> = inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id.as_str() && filter.matches(e))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn create(&self, user_id: &UserId, new: NewExpense) -> anyhow::Result<Expense> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let row = Expense {
            id: inner.next_id,
            user_id: user_id.as_str().to_owned(),
            date: new.date,
            category: new.category,
            description: new.description,
            amount: new.amount,
            receipt_url: new.receipt_url,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: &UserId, id: i64) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner
            .rows
            .retain(|e| !(e.id == id && e.user_id == user_id.as_str()));
        Ok(inner.rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::macros::{date, datetime};
    use time::OffsetDateTime;

    fn new_expense(at: OffsetDateTime, category: &str, cents: i64) -> NewExpense {
        NewExpense {
            date: at,
            category: category.into(),
            description: "test".into(),
            amount: Decimal::new(cents, 2),
            receipt_url: None,
        }
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let store = MemoryExpenseStore::default();
        let a = user("a");
        let at = datetime!(2024-01-10 10:00 UTC);
        for c in ["B", "A", "A", "C"] {
            store.create(&a, new_expense(at, c, 100)).await.unwrap();
        }
        store.create(&user("b"), new_expense(at, "Z", 100)).await.unwrap();
        assert_eq!(store.list_categories(&a).await.unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn list_is_newest_first_with_id_tiebreak() {
        let store = MemoryExpenseStore::default();
        let a = user("a");
        let early = datetime!(2024-01-01 09:00 UTC);
        let late = datetime!(2024-02-01 09:00 UTC);
        let first = store.create(&a, new_expense(early, "x", 1)).await.unwrap();
        let second = store.create(&a, new_expense(late, "x", 2)).await.unwrap();
        let third = store.create(&a, new_expense(late, "x", 3)).await.unwrap();
        let ids: Vec<i64> = store
            .list(&a, &Filter::default())
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn list_applies_filter_within_owner() {
        let store = MemoryExpenseStore::default();
        let a = user("a");
        let b = user("b");
        store
            .create(&a, new_expense(datetime!(2024-01-10 08:00 UTC), "Food", 500))
            .await
            .unwrap();
        store
            .create(&a, new_expense(datetime!(2024-01-11 08:00 UTC), "Food", 700))
            .await
            .unwrap();
        store
            .create(&a, new_expense(datetime!(2024-01-10 20:00 UTC), "Fuel", 900))
            .await
            .unwrap();
        store
            .create(&b, new_expense(datetime!(2024-01-10 09:00 UTC), "Food", 100))
            .await
            .unwrap();

        let f = Filter::new(
            Some(date!(2024-01-10)),
            Some(date!(2024-01-10)),
            Some("Food".into()),
        );
        let rows = store.list(&a, &f).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Decimal::new(500, 2));
        assert_eq!(rows[0].user_id, "a");
    }

    #[tokio::test]
    async fn delete_only_touches_own_rows() {
        let store = MemoryExpenseStore::default();
        let a = user("a");
        let b = user("b");
        let row = store
            .create(&a, new_expense(datetime!(2024-01-10 08:00 UTC), "Food", 500))
            .await
            .unwrap();

        assert!(!store.delete(&b, row.id).await.unwrap());
        assert_eq!(store.all().await.len(), 1);
        assert!(!store.delete(&a, row.id + 100).await.unwrap());
        assert!(store.delete(&a, row.id).await.unwrap());
        assert!(store.all().await.is_empty());
        assert!(!store.delete(&a, row.id).await.unwrap());
    }
}
