//! Project fund ledger model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// Fund ledger entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "fund_entry_kind", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum FundEntryKind {
    /// Monthly increment of `monthly_fund_amount`.
    Accrual,
    /// Draw created by a `from_fund` transaction.
    Withdrawal,
}

/// A fund ledger row. Balance = accruals - withdrawals; negative balances
/// are allowed and surfaced to the client.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub entry_kind: FundEntryKind,
    pub amount: Decimal,
    pub entry_date: NaiveDate,
    pub month_key: Option<String>,
    pub transaction_id: Option<DbId>,
    pub created_at: Timestamp,
}
