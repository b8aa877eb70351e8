//! Project entity model and DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
///
/// `end_date` is derived from `start_date` plus `contract_duration_months`
/// and kept in sync whenever the contract changes. A non-null `archived_at`
/// means the project is archived (soft-deleted).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub budget_monthly: Option<Decimal>,
    pub budget_annual: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub contract_duration_months: Option<i32>,
    pub is_parent_project: bool,
    /// Parent project id for sub-projects.
    pub relation_project: Option<DbId>,
    pub has_fund: bool,
    pub monthly_fund_amount: Option<Decimal>,
    pub image_path: Option<String>,
    pub contract_path: Option<String>,
    pub archived_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. `owner_id` and `end_date` are filled in
/// by the handler, not the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub budget_monthly: Option<Decimal>,
    pub budget_annual: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub contract_duration_months: Option<i32>,
    #[serde(default)]
    pub is_parent_project: bool,
    pub relation_project: Option<DbId>,
    #[serde(default)]
    pub has_fund: bool,
    pub monthly_fund_amount: Option<Decimal>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub budget_monthly: Option<Decimal>,
    pub budget_annual: Option<Decimal>,
    pub has_fund: Option<bool>,
    pub monthly_fund_amount: Option<Decimal>,
    pub image_path: Option<String>,
    pub contract_path: Option<String>,
}
