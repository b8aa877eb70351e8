//! Repository for the `transactions` table.

use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::transaction::{CreateTransaction, Transaction, UpdateTransaction};

const COLUMNS: &str = "id, project_id, entry_type, amount, tx_date, period_start_date, \
     period_end_date, category_id, supplier_id, description, is_exceptional, from_fund, \
     recurring_template_id, created_at, updated_at";

/// Provides CRUD operations for transactions.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a new transaction, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions (project_id, entry_type, amount, tx_date,
                 period_start_date, period_end_date, category_id, supplier_id, description,
                 is_exceptional, from_fund, recurring_template_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.project_id)
            .bind(input.entry_type)
            .bind(input.amount)
            .bind(input.tx_date)
            .bind(input.period_start_date)
            .bind(input.period_end_date)
            .bind(input.category_id)
            .bind(input.supplier_id)
            .bind(&input.description)
            .bind(input.is_exceptional)
            .bind(input.from_fund)
            .bind(input.recurring_template_id)
            .fetch_one(pool)
            .await
    }

    /// Find a transaction by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's transactions, newest date first. When `exceptional`
    /// is set, only "unforeseen" (or only ordinary) rows are returned.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        exceptional: Option<bool>,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE project_id = $1 AND ($2::BOOLEAN IS NULL OR is_exceptional = $2)
             ORDER BY COALESCE(tx_date, period_start_date) DESC, id DESC"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(project_id)
            .bind(exceptional)
            .fetch_all(pool)
            .await
    }

    /// List every transaction attached to a supplier, newest date first.
    pub async fn list_by_supplier(
        pool: &PgPool,
        supplier_id: DbId,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE supplier_id = $1
             ORDER BY COALESCE(tx_date, period_start_date) DESC, id DESC"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(supplier_id)
            .fetch_all(pool)
            .await
    }

    /// Probe for an existing transaction with the same identifying fields.
    /// Backs duplicate detection on create (409 unless forced).
    pub async fn find_duplicate(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions
             WHERE project_id = $1
               AND entry_type = $2
               AND amount = $3
               AND tx_date IS NOT DISTINCT FROM $4
               AND supplier_id IS NOT DISTINCT FROM $5
             LIMIT 1"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.project_id)
            .bind(input.entry_type)
            .bind(input.amount)
            .bind(input.tx_date)
            .bind(input.supplier_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a transaction. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "UPDATE transactions SET
                amount = COALESCE($2, amount),
                tx_date = COALESCE($3, tx_date),
                period_start_date = COALESCE($4, period_start_date),
                period_end_date = COALESCE($5, period_end_date),
                category_id = COALESCE($6, category_id),
                supplier_id = COALESCE($7, supplier_id),
                description = COALESCE($8, description),
                is_exceptional = COALESCE($9, is_exceptional),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .bind(input.amount)
            .bind(input.tx_date)
            .bind(input.period_start_date)
            .bind(input.period_end_date)
            .bind(input.category_id)
            .bind(input.supplier_id)
            .bind(&input.description)
            .bind(input.is_exceptional)
            .fetch_optional(pool)
            .await
    }

    /// Delete a transaction by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
