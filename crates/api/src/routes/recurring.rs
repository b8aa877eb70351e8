//! Route definitions for the `/recurring-transactions` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::recurring;
use crate::state::AppState;

/// Routes mounted at `/recurring-transactions`.
///
/// ```text
/// GET  /                    -> list (?project_id)
/// POST /                    -> create
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// POST /generate-monthly    -> generate_monthly
/// POST /ensure-generated    -> ensure_generated
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recurring::list).post(recurring::create))
        .route("/{id}", put(recurring::update).delete(recurring::delete))
        .route("/generate-monthly", post(recurring::generate_monthly))
        .route("/ensure-generated", post(recurring::ensure_generated))
}
