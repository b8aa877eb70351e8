//! Handlers for the `/budgets` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use domari_core::error::CoreError;
use domari_core::period::{add_months, annual_budget_end_date, days_inclusive, Window};
use domari_core::summary::windowed_amount;
use domari_core::types::{DbId, EntryType};
use domari_core::validation::validate_amount;
use domari_db::models::budget::{Budget, BudgetPeriod, CreateBudget, UpdateBudget};
use domari_db::repositories::{BudgetRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_owned;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/budgets
///
/// Annual budgets without an explicit end date get start + 1 year - 1 day;
/// monthly budgets get start + 1 month - 1 day.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateBudget>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    load_owned(&state.pool, input.project_id, &user).await?;
    validate_amount(input.amount)?;

    let end_date = match input.end_date {
        Some(end) => {
            if end < input.start_date {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Budget end {end} is before start {}",
                    input.start_date
                ))));
            }
            end
        }
        None => match input.period_type {
            BudgetPeriod::Annual => annual_budget_end_date(input.start_date)?,
            BudgetPeriod::Monthly => add_months(input.start_date, 1)?
                .pred_opt()
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation("Date out of range".into()))
                })?,
        },
    };

    let budget = BudgetRepo::create(&state.pool, &input, end_date).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// Load a budget and enforce project ownership.
async fn load_owned_budget(state: &AppState, id: DbId, user: &AuthUser) -> AppResult<Budget> {
    let budget = BudgetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Budget",
            id,
        }))?;
    load_owned(&state.pool, budget.project_id, user).await?;
    Ok(budget)
}

/// GET /api/v1/budgets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Budget>> {
    let budget = load_owned_budget(&state, id, &user).await?;
    Ok(Json(budget))
}

/// PUT /api/v1/budgets/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBudget>,
) -> AppResult<Json<Budget>> {
    load_owned_budget(&state, id, &user).await?;
    if let Some(amount) = input.amount {
        validate_amount(amount)?;
    }
    let budget = BudgetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Budget",
            id,
        }))?;
    Ok(Json(budget))
}

/// DELETE /api/v1/budgets/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned_budget(&state, id, &user).await?;
    BudgetRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Computed spending state of a budget.
#[derive(Debug, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// Expense total in the budget's category and window (pro-rated).
    pub spent: Decimal,
    pub remaining: Decimal,
    /// The share of the budget expected to be consumed by today, accrued
    /// linearly over the window.
    pub expected_by_now: Decimal,
}

/// GET /api/v1/budgets/{id}/status
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<BudgetStatus>> {
    let budget = load_owned_budget(&state, id, &user).await?;
    let today = Utc::now().date_naive();

    let window = Window {
        start: budget.start_date,
        end: budget.end_date,
    };

    let transactions =
        TransactionRepo::list_by_project(&state.pool, budget.project_id, None).await?;
    let spent: Decimal = transactions
        .iter()
        .filter(|tx| tx.category_id == Some(budget.category_id))
        .filter(|tx| !tx.from_fund)
        .filter(|tx| EntryType::from(tx.entry_type) == EntryType::Expense)
        .map(|tx| {
            windowed_amount(
                &domari_core::summary::SummaryTx {
                    kind: tx.entry_type.into(),
                    amount: tx.amount,
                    tx_date: tx.tx_date,
                    period_start: tx.period_start_date,
                    period_end: tx.period_end_date,
                    from_fund: tx.from_fund,
                },
                window,
            )
        })
        .sum();
    let spent = spent.round_dp(2);

    let total_days = days_inclusive(budget.start_date, budget.end_date).max(1);
    let elapsed_days = if today < budget.start_date {
        0
    } else {
        days_inclusive(budget.start_date, today.min(budget.end_date))
    };
    let expected_by_now =
        (budget.amount * Decimal::from(elapsed_days) / Decimal::from(total_days)).round_dp(2);

    Ok(Json(BudgetStatus {
        remaining: budget.amount - spent,
        expected_by_now,
        spent,
        budget,
    }))
}
