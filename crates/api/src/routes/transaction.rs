//! Route definitions for the `/transactions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{group, transaction};
use crate::state::AppState;

/// Routes mounted at `/transactions`.
///
/// ```text
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/supplier-document    -> upload_document (multipart)
/// GET    /project/{id}              -> list_by_project
/// POST   /group                     -> create_group
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(transaction::create))
        .route(
            "/{id}",
            get(transaction::get_by_id)
                .put(transaction::update)
                .delete(transaction::delete),
        )
        .route(
            "/{id}/supplier-document",
            post(transaction::upload_document),
        )
        .route("/project/{id}", get(transaction::list_by_project))
        .route("/group", post(group::create_group))
}
