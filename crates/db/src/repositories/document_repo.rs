//! Repository for the `documents` metadata table.

use sqlx::PgPool;

use domari_core::types::DbId;

use crate::models::document::{Document, DocumentScope};

const COLUMNS: &str = "id, scope, scope_id, filename, stored_path, content_type, size_bytes, \
     created_at";

/// Provides access to uploaded-document metadata. File bytes live on the
/// filesystem; this table only records where.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Record an upload. New documents start in the `staged` scope unless
    /// attached immediately.
    pub async fn create(
        pool: &PgPool,
        scope: DocumentScope,
        scope_id: Option<DbId>,
        filename: &str,
        stored_path: &str,
        content_type: Option<&str>,
        size_bytes: i64,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (scope, scope_id, filename, stored_path, content_type, size_bytes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(scope)
            .bind(scope_id)
            .bind(filename)
            .bind(stored_path)
            .bind(content_type)
            .bind(size_bytes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Re-scope a staged document onto its final owner. Returns `None` when
    /// the document does not exist or is no longer staged.
    pub async fn attach(
        pool: &PgPool,
        id: DbId,
        scope: DocumentScope,
        scope_id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET scope = $2, scope_id = $3
             WHERE id = $1 AND scope = 'staged'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(scope)
            .bind(scope_id)
            .fetch_optional(pool)
            .await
    }

    /// List the documents attached to one owner.
    pub async fn list_for_scope(
        pool: &PgPool,
        scope: DocumentScope,
        scope_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE scope = $1 AND scope_id = $2 ORDER BY id"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(scope)
            .bind(scope_id)
            .fetch_all(pool)
            .await
    }
}
