use anyhow::Context;
use rust_decimal::Decimal;
use time::Date;
use tracing::{info, warn};

use super::{
    aggregation,
    dto::{ChartData, ExpenseQuery, LedgerResponse},
    filter::Filter,
    repo::ExpenseStore,
    repo_types::{Expense, NewExpense},
};
use crate::{
    auth::UserId,
    receipts::{upload_receipt, ReceiptUpload},
    state::AppState,
};

/// Filtered ledger plus the categories for the filter picker.
pub async fn ledger(
    store: &dyn ExpenseStore,
    user_id: &UserId,
    query: ExpenseQuery,
    filter: &Filter,
) -> anyhow::Result<LedgerResponse> {
    let categories = store.list_categories(user_id).await?;
    let items = store.list(user_id, filter).await?;
    let total = items.iter().map(|e| e.amount).sum::<Decimal>();
    Ok(LedgerResponse {
        items,
        total,
        categories,
        filters: query,
    })
}

/// Uploads the receipt (if any) and only then persists the record pointing at
/// it. If the upload fails nothing is written.
pub async fn create_expense(
    st: &AppState,
    user_id: &UserId,
    mut new: NewExpense,
    receipt: Option<ReceiptUpload>,
) -> anyhow::Result<Expense> {
    let stored = match receipt {
        Some(upload) => Some(
            upload_receipt(st.storage.as_ref(), upload)
                .await
                .context("upload receipt")?,
        ),
        None => None,
    };
    new.receipt_url = stored.as_ref().map(|s| s.url.clone());

    match st.expenses.create(user_id, new).await {
        Ok(expense) => {
            info!(%user_id, expense_id = expense.id, has_receipt = stored.is_some(), "expense created");
            Ok(expense)
        }
        Err(e) => {
            // the blob is unreferenced now; removing it is best effort
            if let Some(s) = stored {
                if let Err(cleanup) = st.storage.delete_object(&s.key).await {
                    warn!(error = %cleanup, key = %s.key, "orphaned receipt left behind");
                }
            }
            Err(e)
        }
    }
}

pub async fn chart_data(
    store: &dyn ExpenseStore,
    user_id: &UserId,
    filter: &Filter,
    today: Date,
) -> anyhow::Result<ChartData> {
    let by_category = store
        .list(user_id, &aggregation::category_window(filter, today))
        .await?;
    let by_month = store
        .list(user_id, &aggregation::month_window(filter, today))
        .await?;
    Ok(ChartData {
        by_category: aggregation::sum_by_category(&by_category),
        by_month: aggregation::sum_by_month(&by_month),
    })
}
