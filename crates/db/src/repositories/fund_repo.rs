//! Repository for the `fund_entries` ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::fund::FundEntry;

const COLUMNS: &str =
    "id, project_id, entry_kind, amount, entry_date, month_key, transaction_id, created_at";

/// Provides access to a project's fund ledger.
pub struct FundRepo;

impl FundRepo {
    /// Insert one monthly accrual, keyed by `month_key` so re-running the
    /// generator is a no-op. Returns `true` when a row was actually added.
    pub async fn insert_accrual(
        pool: &PgPool,
        project_id: DbId,
        amount: Decimal,
        entry_date: NaiveDate,
        month_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO fund_entries (project_id, entry_kind, amount, entry_date, month_key)
             VALUES ($1, 'accrual', $2, $3, $4)
             ON CONFLICT (project_id, month_key) DO NOTHING",
        )
        .bind(project_id)
        .bind(amount)
        .bind(entry_date)
        .bind(month_key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a withdrawal backing a `from_fund` transaction.
    pub async fn insert_withdrawal(
        pool: &PgPool,
        project_id: DbId,
        amount: Decimal,
        entry_date: NaiveDate,
        transaction_id: DbId,
    ) -> Result<FundEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO fund_entries (project_id, entry_kind, amount, entry_date, transaction_id)
             VALUES ($1, 'withdrawal', $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundEntry>(&query)
            .bind(project_id)
            .bind(amount)
            .bind(entry_date)
            .bind(transaction_id)
            .fetch_one(pool)
            .await
    }

    /// Current balance: accruals minus withdrawals. May be negative.
    pub async fn balance(pool: &PgPool, project_id: DbId) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE entry_kind WHEN 'accrual' THEN amount ELSE -amount END), 0)
             FROM fund_entries WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// List a project's ledger entries, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<FundEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_entries WHERE project_id = $1
             ORDER BY entry_date DESC, id DESC"
        );
        sqlx::query_as::<_, FundEntry>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
