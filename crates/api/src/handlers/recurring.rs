//! Handlers for the `/recurring-transactions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use domari_core::error::CoreError;
use domari_core::recurring::validate_day_of_month;
use domari_core::types::DbId;
use domari_core::validation::{validate_amount, validate_transaction_date};
use domari_db::models::recurring::{
    CreateRecurringTemplate, RecurringTemplate, UpdateRecurringTemplate,
};
use domari_db::repositories::RecurringRepo;
use domari_worker::RecurringReport;

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_owned;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/recurring-transactions
///
/// The template's start date is held to the same contract-start guard as
/// ordinary transactions.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateRecurringTemplate>,
) -> AppResult<(StatusCode, Json<RecurringTemplate>)> {
    let project = load_owned(&state.pool, input.project_id, &user).await?;

    validate_amount(input.amount)?;
    validate_day_of_month(input.day_of_month.max(0) as u32)?;
    validate_transaction_date(input.start_date, project.start_date)?;

    let template = RecurringRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Query parameters for the template listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub project_id: DbId,
}

/// GET /api/v1/recurring-transactions?project_id=
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<RecurringTemplate>>> {
    load_owned(&state.pool, query.project_id, &user).await?;
    let templates = RecurringRepo::list_by_project(&state.pool, query.project_id).await?;
    Ok(Json(templates))
}

/// Load a template and enforce project ownership.
async fn load_owned_template(
    state: &AppState,
    id: DbId,
    user: &AuthUser,
) -> AppResult<RecurringTemplate> {
    let template = RecurringRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RecurringTemplate",
            id,
        }))?;
    load_owned(&state.pool, template.project_id, user).await?;
    Ok(template)
}

/// PUT /api/v1/recurring-transactions/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRecurringTemplate>,
) -> AppResult<Json<RecurringTemplate>> {
    load_owned_template(&state, id, &user).await?;

    if let Some(amount) = input.amount {
        validate_amount(amount)?;
    }
    if let Some(day) = input.day_of_month {
        validate_day_of_month(day.max(0) as u32)?;
    }

    let template = RecurringRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RecurringTemplate",
            id,
        }))?;
    Ok(Json(template))
}

/// DELETE /api/v1/recurring-transactions/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_template(&state, id, &user).await?;
    RecurringRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/recurring-transactions/generate-monthly
///
/// Run a generation pass for every active template, up to today.
pub async fn generate_monthly(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<RecurringReport>> {
    let today = Utc::now().date_naive();
    let report = domari_worker::generate_recurring(&state.pool, today)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(Json(report))
}

/// POST /api/v1/recurring-transactions/ensure-generated
///
/// Idempotent catch-up: identical to a scheduled worker pass, so a client
/// can guarantee generated data is current before rendering.
pub async fn ensure_generated(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<RecurringReport>> {
    let today = Utc::now().date_naive();
    let report = domari_worker::generate_recurring(&state.pool, today)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(Json(report))
}
