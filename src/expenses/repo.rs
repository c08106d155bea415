use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    filter::Filter,
    repo_types::{Expense, NewExpense},
};
use crate::auth::UserId;

/// Persistence of expense records. Every operation is scoped to the owner
/// passed in; no call can reach another user's rows.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Distinct categories, byte-lexicographically sorted.
    async fn list_categories(&self, user_id: &UserId) -> anyhow::Result<Vec<String>>;

    /// Matching expenses, most recent first; equal dates by descending id.
    async fn list(&self, user_id: &UserId, filter: &Filter) -> anyhow::Result<Vec<Expense>>;

    async fn create(&self, user_id: &UserId, new: NewExpense) -> anyhow::Result<Expense>;

    /// Returns false when the row does not exist or belongs to someone else.
    async fn delete(&self, user_id: &UserId, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgExpenseStore {
    db: PgPool,
}

impl PgExpenseStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const EXPENSE_COLUMNS: &str = "id, user_id, date, category, description, amount, receipt_url";

fn list_query<'a>(user_id: &UserId, filter: &Filter) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = "
    ));
    qb.push_bind(user_id.as_str().to_owned());
    filter.push_conditions(&mut qb);
    qb.push(" ORDER BY date DESC, id DESC");
    qb
}

#[async_trait]
impl ExpenseStore for PgExpenseStore {
    async fn list_categories(&self, user_id: &UserId) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category
              FROM expenses
             WHERE user_id = $1
             ORDER BY category COLLATE "C"
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.db)
        .await
        .context("list categories")?;
        Ok(rows)
    }

    async fn list(&self, user_id: &UserId, filter: &Filter) -> anyhow::Result<Vec<Expense>> {
        let rows = list_query(user_id, filter)
            .build_query_as::<Expense>()
            .fetch_all(&self.db)
            .await
            .context("list expenses")?;
        Ok(rows)
    }

    async fn create(&self, user_id: &UserId, new: NewExpense) -> anyhow::Result<Expense> {
        let row = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses (user_id, date, category, description, amount, receipt_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(user_id.as_str())
        .bind(new.date)
        .bind(new.category)
        .bind(new.description)
        .bind(new.amount)
        .bind(new.receipt_url) // Option<String> → NULL allowed
        .fetch_one(&self.db)
        .await
        .context("insert expense")?;
        Ok(row)
    }

    async fn delete(&self, user_id: &UserId, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id.as_str())
            .execute(&self.db)
            .await
            .context("delete expense")?;
        Ok(res.rows_affected() > 0)
    }
}
