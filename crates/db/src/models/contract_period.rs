//! Contract period model.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// A generated contract period row. Periods are contiguous year-long slices
/// of a project's contract, ordered by `start_date`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContractPeriod {
    pub id: DbId,
    pub project_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contract_year: i32,
    pub year_index: i32,
    pub created_at: Timestamp,
}
