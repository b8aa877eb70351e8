//! Repository for the `recurring_templates` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::recurring::{
    end_condition_columns, CreateRecurringTemplate, RecurringTemplate, UpdateRecurringTemplate,
};

const COLUMNS: &str = "id, project_id, entry_type, amount, category_id, supplier_id, \
     description, day_of_month, start_date, end_kind, end_count, end_date, is_active, \
     last_generated, created_at";

/// Provides CRUD operations for recurring transaction templates.
pub struct RecurringRepo;

impl RecurringRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRecurringTemplate,
    ) -> Result<RecurringTemplate, sqlx::Error> {
        let (end_kind, end_count, end_date) = end_condition_columns(&input.end_condition);
        let query = format!(
            "INSERT INTO recurring_templates (project_id, entry_type, amount, category_id,
                 supplier_id, description, day_of_month, start_date, end_kind, end_count, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecurringTemplate>(&query)
            .bind(input.project_id)
            .bind(input.entry_type)
            .bind(input.amount)
            .bind(input.category_id)
            .bind(input.supplier_id)
            .bind(&input.description)
            .bind(input.day_of_month)
            .bind(input.start_date)
            .bind(end_kind)
            .bind(end_count)
            .bind(end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RecurringTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recurring_templates WHERE id = $1");
        sqlx::query_as::<_, RecurringTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's templates.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<RecurringTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recurring_templates WHERE project_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, RecurringTemplate>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List every active template across all projects. Used by generation.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<RecurringTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recurring_templates WHERE is_active ORDER BY id");
        sqlx::query_as::<_, RecurringTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a template. Only non-`None` fields are applied; passing a new
    /// end condition rewrites all three end columns together.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRecurringTemplate,
    ) -> Result<Option<RecurringTemplate>, sqlx::Error> {
        if let Some(end) = &input.end_condition {
            let (end_kind, end_count, end_date) = end_condition_columns(end);
            sqlx::query(
                "UPDATE recurring_templates
                 SET end_kind = $2, end_count = $3, end_date = $4
                 WHERE id = $1",
            )
            .bind(id)
            .bind(end_kind)
            .bind(end_count)
            .bind(end_date)
            .execute(pool)
            .await?;
        }
        let query = format!(
            "UPDATE recurring_templates SET
                amount = COALESCE($2, amount),
                category_id = COALESCE($3, category_id),
                supplier_id = COALESCE($4, supplier_id),
                description = COALESCE($5, description),
                day_of_month = COALESCE($6, day_of_month),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecurringTemplate>(&query)
            .bind(id)
            .bind(input.amount)
            .bind(input.category_id)
            .bind(input.supplier_id)
            .bind(&input.description)
            .bind(input.day_of_month)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Record the latest generated occurrence date.
    pub async fn set_last_generated(
        pool: &PgPool,
        id: DbId,
        date: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE recurring_templates SET last_generated = $2 WHERE id = $1")
            .bind(id)
            .bind(date)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a template by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recurring_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
