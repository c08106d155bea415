use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    dto::{ChartData, CreateExpenseForm, ExpenseFormView, ExpenseQuery, LedgerResponse},
    services,
};
use crate::{
    auth::AuthUser, error::AppError, receipts::ReceiptUpload, state::AppState,
};

const LEDGER_PATH: &str = "/expenses";

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses/create", get(create_form))
        .route("/expenses/chart-data", get(chart_data))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/expenses/create", post(create_expense))
        .route("/expenses/:id/delete", post(delete_expense))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<LedgerResponse>, AppError> {
    let filter = query.to_filter()?;
    let ledger = services::ledger(state.expenses.as_ref(), &user_id, query, &filter).await?;
    Ok(Json(ledger))
}

#[instrument(skip_all)]
pub async fn create_form(AuthUser(_user_id): AuthUser) -> Json<ExpenseFormView> {
    Json(ExpenseFormView {
        form: CreateExpenseForm::blank(OffsetDateTime::now_utc().date()),
        errors: Vec::new(),
    })
}

/// POST /expenses/create (multipart)
/// Fields: date, category, description, amount, receipt (file, optional)
#[instrument(skip(state, mp))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Response, AppError> {
    let mut form = CreateExpenseForm::default();
    let mut receipt: Option<ReceiptUpload> = None;

    while let Some(field) = mp.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "receipt" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let body = field.bytes().await?;
                // browsers send an empty part when no file was picked
                if !body.is_empty() {
                    receipt = Some(ReceiptUpload {
                        file_name,
                        content_type,
                        body,
                    });
                }
            }
            "date" | "category" | "description" | "amount" => {
                let value = field.text().await?;
                match name.as_str() {
                    "date" => form.date = Some(value),
                    "category" => form.category = Some(value),
                    "description" => form.description = Some(value),
                    _ => form.amount = Some(value),
                }
            }
            _ => {}
        }
    }

    let new = match form.validate(OffsetDateTime::now_utc()) {
        Ok(new) => new,
        Err(errors) => {
            warn!(%user_id, error_count = errors.len(), "expense form rejected");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ExpenseFormView { form, errors }),
            )
                .into_response());
        }
    };

    services::create_expense(&state, &user_id, new, receipt).await?;
    Ok(Redirect::to(LEDGER_PATH).into_response())
}

/// Always redirects back to the ledger, whether or not anything was removed.
/// An id that is not a number matches nothing.
#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Redirect, AppError> {
    let Ok(id) = raw_id.parse::<i64>() else {
        info!(%user_id, %raw_id, "delete expense: unparseable id");
        return Ok(Redirect::to(LEDGER_PATH));
    };
    let deleted = state.expenses.delete(&user_id, id).await?;
    info!(%user_id, expense_id = id, deleted, "delete expense");
    Ok(Redirect::to(LEDGER_PATH))
}

#[instrument(skip(state))]
pub async fn chart_data(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<ChartData>, AppError> {
    let filter = query.to_filter()?;
    let today = OffsetDateTime::now_utc().date();
    let data = services::chart_data(state.expenses.as_ref(), &user_id, &filter, today).await?;
    Ok(Json(data))
}
