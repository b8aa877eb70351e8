//! Handlers for the `/transactions` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use domari_core::error::CoreError;
use domari_core::types::DbId;
use domari_core::validation::{validate_amount, validate_transaction_date};
use domari_db::models::document::{Document, DocumentScope};
use domari_db::models::project::Project;
use domari_db::models::transaction::{CreateTransaction, Transaction, UpdateTransaction};
use domari_db::repositories::{DocumentRepo, FundRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_owned;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Check the date shape of a create payload against its project.
///
/// Either `tx_date` or both period dates must be present; the effective
/// date may not precede the project's contract start.
fn validate_dates(input: &CreateTransaction, project: &Project) -> Result<(), CoreError> {
    let effective = match (input.tx_date, input.period_start_date, input.period_end_date) {
        (Some(date), _, _) => date,
        (None, Some(start), Some(end)) => {
            if end < start {
                return Err(CoreError::Validation(format!(
                    "Period end {end} is before period start {start}"
                )));
            }
            start
        }
        _ => {
            return Err(CoreError::Validation(
                "Either tx_date or both period dates are required".into(),
            ))
        }
    };
    validate_transaction_date(effective, project.start_date)
}

/// POST /api/v1/transactions
///
/// Validates amount and dates, probes for duplicates (409 unless
/// `allow_duplicate`), creates the row, and records a fund withdrawal for
/// `from_fund` transactions.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let project = load_owned(&state.pool, input.project_id, &user).await?;

    validate_amount(input.amount)?;
    validate_dates(&input, &project)?;

    if !input.allow_duplicate {
        if let Some(existing) = TransactionRepo::find_duplicate(&state.pool, &input).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "A similar transaction already exists (id {}). Set allow_duplicate to create anyway.",
                existing.id
            ))));
        }
    }

    let transaction = TransactionRepo::create(&state.pool, &input).await?;

    if transaction.from_fund {
        let entry_date = transaction.tx_date.unwrap_or_else(|| Utc::now().date_naive());
        FundRepo::insert_withdrawal(
            &state.pool,
            transaction.project_id,
            transaction.amount,
            entry_date,
            transaction.id,
        )
        .await?;
    }

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Load a transaction and enforce project ownership.
async fn load_owned_tx(
    state: &AppState,
    id: DbId,
    user: &AuthUser,
) -> AppResult<Transaction> {
    let transaction = TransactionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id,
        }))?;
    load_owned(&state.pool, transaction.project_id, user).await?;
    Ok(transaction)
}

/// GET /api/v1/transactions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Transaction>> {
    let transaction = load_owned_tx(&state, id, &user).await?;
    Ok(Json(transaction))
}

/// PUT /api/v1/transactions/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTransaction>,
) -> AppResult<Json<Transaction>> {
    let existing = load_owned_tx(&state, id, &user).await?;
    let project = load_owned(&state.pool, existing.project_id, &user).await?;

    if let Some(amount) = input.amount {
        validate_amount(amount)?;
    }
    if let Some(date) = input.tx_date {
        validate_transaction_date(date, project.start_date)?;
    }

    let transaction = TransactionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id,
        }))?;
    Ok(Json(transaction))
}

/// DELETE /api/v1/transactions/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_tx(&state, id, &user).await?;
    TransactionRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for transaction listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter to "unforeseen" transactions (`true`) or ordinary ones (`false`).
    pub exceptional: Option<bool>,
}

/// GET /api/v1/transactions/project/{id}?exceptional=
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    load_owned(&state.pool, id, &user).await?;
    let transactions =
        TransactionRepo::list_by_project(&state.pool, id, query.exceptional).await?;
    Ok(Json(transactions))
}

/// POST /api/v1/transactions/{id}/supplier-document
///
/// Accepts a multipart form with one or more `file` fields. Each file is
/// stored and attached to the transaction.
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<Document>>)> {
    load_owned_tx(&state, id, &user).await?;

    let mut documents = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue; // ignore unknown fields
        }
        let filename = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let stored_path = state
            .storage
            .save(&filename, &data)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let document = DocumentRepo::create(
            &state.pool,
            DocumentScope::Transaction,
            Some(id),
            &filename,
            &stored_path,
            content_type.as_deref(),
            data.len() as i64,
        )
        .await?;
        documents.push(document);
    }

    if documents.is_empty() {
        return Err(AppError::BadRequest(
            "Missing required 'file' field".into(),
        ));
    }

    Ok((StatusCode::CREATED, Json(documents)))
}
