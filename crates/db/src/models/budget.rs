//! Category budget model and DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// Budget period kind stored as the `budget_period` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "budget_period", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Monthly,
    Annual,
}

/// A budget row: an amount allocated to a category over a date window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Budget {
    pub id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub period_type: BudgetPeriod,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: Timestamp,
}

/// DTO for creating a budget. `end_date` may be omitted for annual budgets;
/// the handler derives it as start + 1 year - 1 day.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudget {
    pub project_id: DbId,
    pub category_id: DbId,
    pub period_type: BudgetPeriod,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// DTO for updating a budget. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBudget {
    pub amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
