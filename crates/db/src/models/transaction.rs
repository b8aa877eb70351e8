//! Transaction entity model and DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use domari_core::types::{DbId, EntryType, Timestamp};

/// Income/expense marker stored as the `entry_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Income,
    Expense,
}

impl From<TxType> for EntryType {
    fn from(value: TxType) -> Self {
        match value {
            TxType::Income => EntryType::Income,
            TxType::Expense => EntryType::Expense,
        }
    }
}

/// A transaction row.
///
/// Either `tx_date` is set (single-dated) or both `period_start_date` and
/// `period_end_date` are (period-based, pro-rated in summaries).
/// `from_fund` rows draw the project fund and never enter normal reporting.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub project_id: DbId,
    pub entry_type: TxType,
    pub amount: Decimal,
    pub tx_date: Option<NaiveDate>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    pub is_exceptional: bool,
    pub from_fund: bool,
    pub recurring_template_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub project_id: DbId,
    pub entry_type: TxType,
    pub amount: Decimal,
    pub tx_date: Option<NaiveDate>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_exceptional: bool,
    #[serde(default)]
    pub from_fund: bool,
    pub recurring_template_id: Option<DbId>,
    /// Skip the duplicate probe and force creation.
    #[serde(default)]
    pub allow_duplicate: bool,
}

/// DTO for updating a transaction. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransaction {
    pub amount: Option<Decimal>,
    pub tx_date: Option<NaiveDate>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    pub is_exceptional: Option<bool>,
}
