//! Category reference model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use domari_core::types::{DbId, Timestamp};

/// A category row. Inactive categories stay attached to old transactions
/// but are hidden from pickers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
