//! Uploaded document metadata model.

use serde::Serialize;
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// What a stored document is attached to. Uploads land as `staged` and are
/// re-scoped when linked to a transaction, supplier, or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "document_scope", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum DocumentScope {
    Staged,
    Transaction,
    Supplier,
    Project,
}

/// A document metadata row. The bytes live on the filesystem at
/// `stored_path`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub scope: DocumentScope,
    pub scope_id: Option<DbId>,
    pub filename: String,
    pub stored_path: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: Timestamp,
}
