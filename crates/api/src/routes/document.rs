//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// POST /staged           -> stage (multipart)
/// GET  /{id}/download    -> download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/staged", post(document::stage))
        .route("/{id}/download", get(document::download))
}
