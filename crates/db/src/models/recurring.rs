//! Recurring transaction template model and DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use domari_core::error::CoreError;
use domari_core::recurring::EndCondition;
use domari_core::types::{DbId, Timestamp};

use crate::models::transaction::TxType;

/// End-condition discriminant stored as the `recurring_end_kind` enum.
/// `end_count` / `end_date` columns carry the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recurring_end_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecurringEndKind {
    NoEnd,
    AfterOccurrences,
    OnDate,
}

/// A recurring-template row. Generates one transaction per month on
/// `day_of_month` (clamped to month length) until the end condition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecurringTemplate {
    pub id: DbId,
    pub project_id: DbId,
    pub entry_type: TxType,
    pub amount: Decimal,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    pub day_of_month: i32,
    pub start_date: NaiveDate,
    pub end_kind: RecurringEndKind,
    pub end_count: Option<i32>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    /// Date of the latest generated occurrence.
    pub last_generated: Option<NaiveDate>,
    pub created_at: Timestamp,
}

impl RecurringTemplate {
    /// Reassemble the typed end condition from its row columns.
    pub fn end_condition(&self) -> Result<EndCondition, CoreError> {
        match self.end_kind {
            RecurringEndKind::NoEnd => Ok(EndCondition::NoEnd),
            RecurringEndKind::AfterOccurrences => {
                let count = self.end_count.ok_or_else(|| {
                    CoreError::Internal(format!(
                        "Recurring template {} has end_kind=after_occurrences without end_count",
                        self.id
                    ))
                })?;
                Ok(EndCondition::AfterOccurrences(count.max(0) as u32))
            }
            RecurringEndKind::OnDate => {
                let date = self.end_date.ok_or_else(|| {
                    CoreError::Internal(format!(
                        "Recurring template {} has end_kind=on_date without end_date",
                        self.id
                    ))
                })?;
                Ok(EndCondition::OnDate(date))
            }
        }
    }
}

/// DTO for creating a recurring template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecurringTemplate {
    pub project_id: DbId,
    pub entry_type: TxType,
    pub amount: Decimal,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    pub day_of_month: i32,
    pub start_date: NaiveDate,
    pub end_condition: EndCondition,
}

/// DTO for updating a recurring template. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecurringTemplate {
    pub amount: Option<Decimal>,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    pub day_of_month: Option<i32>,
    pub end_condition: Option<EndCondition>,
    pub is_active: Option<bool>,
}

/// Split a typed end condition into its storage columns.
pub fn end_condition_columns(
    end: &EndCondition,
) -> (RecurringEndKind, Option<i32>, Option<NaiveDate>) {
    match end {
        EndCondition::NoEnd => (RecurringEndKind::NoEnd, None, None),
        EndCondition::AfterOccurrences(n) => {
            (RecurringEndKind::AfterOccurrences, Some(*n as i32), None)
        }
        EndCondition::OnDate(d) => (RecurringEndKind::OnDate, None, Some(*d)),
    }
}
