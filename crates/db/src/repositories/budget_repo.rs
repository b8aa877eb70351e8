//! Repository for the `budgets` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::budget::{Budget, CreateBudget, UpdateBudget};

const COLUMNS: &str =
    "id, project_id, category_id, period_type, amount, start_date, end_date, created_at";

/// Provides CRUD operations for category budgets.
pub struct BudgetRepo;

impl BudgetRepo {
    /// Insert a new budget. `end_date` is the resolved window end (annual
    /// budgets get start + 1 year - 1 day from the handler).
    pub async fn create(
        pool: &PgPool,
        input: &CreateBudget,
        end_date: NaiveDate,
    ) -> Result<Budget, sqlx::Error> {
        let query = format!(
            "INSERT INTO budgets (project_id, category_id, period_type, amount, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(input.project_id)
            .bind(input.category_id)
            .bind(input.period_type)
            .bind(input.amount)
            .bind(input.start_date)
            .bind(end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a budget by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM budgets WHERE id = $1");
        sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's budgets ordered by window start.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Budget>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM budgets WHERE project_id = $1 ORDER BY start_date, id");
        sqlx::query_as::<_, Budget>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a budget. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBudget,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!(
            "UPDATE budgets SET
                amount = COALESCE($2, amount),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .bind(input.amount)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a budget by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
