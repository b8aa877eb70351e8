//! Repository for the `contract_periods` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use domari_core::period::PeriodSpan;
use domari_core::types::DbId;

use crate::models::contract_period::ContractPeriod;

const COLUMNS: &str = "id, project_id, start_date, end_date, contract_year, year_index, created_at";

/// Provides access to a project's generated contract periods.
pub struct ContractPeriodRepo;

impl ContractPeriodRepo {
    /// List a project's periods ordered by start date.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ContractPeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contract_periods WHERE project_id = $1 ORDER BY start_date"
        );
        sqlx::query_as::<_, ContractPeriod>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Find a period by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContractPeriod>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contract_periods WHERE id = $1");
        sqlx::query_as::<_, ContractPeriod>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace all of a project's periods with freshly generated spans.
    /// Runs in one transaction so readers never see a half-written set.
    pub async fn replace_all(
        pool: &PgPool,
        project_id: DbId,
        spans: &[PeriodSpan],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM contract_periods WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        Self::insert_spans(&mut tx, project_id, spans, 0).await?;
        tx.commit().await
    }

    /// Replace periods starting at or after `effective_start` with new
    /// spans. Earlier (historical) periods are preserved; the new spans'
    /// year indexes continue from the last kept period.
    pub async fn replace_from(
        pool: &PgPool,
        project_id: DbId,
        effective_start: NaiveDate,
        spans: &[PeriodSpan],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM contract_periods WHERE project_id = $1 AND start_date >= $2")
            .bind(project_id)
            .bind(effective_start)
            .execute(&mut *tx)
            .await?;
        let kept: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(year_index), 0) FROM contract_periods WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;
        Self::insert_spans(&mut tx, project_id, spans, kept).await?;
        tx.commit().await
    }

    async fn insert_spans(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
        spans: &[PeriodSpan],
        index_offset: i32,
    ) -> Result<(), sqlx::Error> {
        for span in spans {
            sqlx::query(
                "INSERT INTO contract_periods
                     (project_id, start_date, end_date, contract_year, year_index)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(project_id)
            .bind(span.start_date)
            .bind(span.end_date)
            .bind(span.contract_year)
            .bind(span.year_index + index_offset)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
