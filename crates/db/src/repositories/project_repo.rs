//! Repository for the `projects` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, description, budget_monthly, budget_annual, \
     start_date, end_date, contract_duration_months, is_parent_project, relation_project, \
     has_fund, monthly_fund_amount, image_path, contract_path, archived_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row. `end_date` is the
    /// contract end derived by the caller from start + duration.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateProject,
        end_date: Option<NaiveDate>,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, name, description, budget_monthly, budget_annual,
                 start_date, end_date, contract_duration_months, is_parent_project,
                 relation_project, has_fund, monthly_fund_amount)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.budget_monthly)
            .bind(input.budget_annual)
            .bind(input.start_date)
            .bind(end_date)
            .bind(input.contract_duration_months)
            .bind(input.is_parent_project)
            .bind(input.relation_project)
            .bind(input.has_fund)
            .bind(input.monthly_fund_amount)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID. Excludes archived rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND archived_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by ID, including archived rows. Used by hard delete.
    pub async fn find_by_id_any(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's top-level projects, newest first. Excludes archived
    /// rows and sub-projects.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE owner_id = $1 AND archived_at IS NULL AND relation_project IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List the sub-projects of a parent project, ordered by name.
    pub async fn list_subprojects(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE relation_project = $1 AND archived_at IS NULL
             ORDER BY name"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                budget_monthly = COALESCE($4, budget_monthly),
                budget_annual = COALESCE($5, budget_annual),
                has_fund = COALESCE($6, has_fund),
                monthly_fund_amount = COALESCE($7, monthly_fund_amount),
                image_path = COALESCE($8, image_path),
                contract_path = COALESCE($9, contract_path),
                updated_at = NOW()
             WHERE id = $1 AND archived_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.budget_monthly)
            .bind(input.budget_annual)
            .bind(input.has_fund)
            .bind(input.monthly_fund_amount)
            .bind(&input.image_path)
            .bind(&input.contract_path)
            .fetch_optional(pool)
            .await
    }

    /// Rewrite the contract fields after a renewal or duration change.
    pub async fn set_contract(
        pool: &PgPool,
        id: DbId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration_months: i32,
        budget_monthly: Option<rust_decimal::Decimal>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                start_date = $2,
                end_date = $3,
                contract_duration_months = $4,
                budget_monthly = COALESCE($5, budget_monthly),
                updated_at = NOW()
             WHERE id = $1 AND archived_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(start_date)
            .bind(end_date)
            .bind(duration_months)
            .bind(budget_monthly)
            .fetch_optional(pool)
            .await
    }

    /// List every live project with a fund. Used by monthly accrual.
    pub async fn list_with_fund(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE has_fund AND archived_at IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Archive a project by ID. Returns `true` if a row was archived.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET archived_at = NOW() WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
