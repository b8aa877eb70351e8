//! Route definitions for the `/budgets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::budget;
use crate::state::AppState;

/// Routes mounted at `/budgets`.
///
/// ```text
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// GET    /{id}/status   -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(budget::create))
        .route(
            "/{id}",
            get(budget::get_by_id)
                .put(budget::update)
                .delete(budget::delete),
        )
        .route("/{id}/status", get(budget::status))
}
