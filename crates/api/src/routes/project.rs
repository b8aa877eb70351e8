//! Route definitions for the `/projects` resource.
//!
//! Also nests the fund, detail, contract-period, and summary routes under
//! `/projects/{id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> archive
/// POST   /{id}/hard-delete            -> hard_delete
/// POST   /{id}/files                  -> upload_files (multipart)
/// GET    /{id}/subprojects            -> subprojects
/// GET    /{id}/detail                 -> detail
/// GET    /{id}/financial-summary      -> summary
/// GET    /{id}/fund                   -> fund
/// POST   /{id}/fund/ensure-accrued    -> ensure_accrued
/// GET    /{id}/contract-periods       -> contract_periods
/// PUT    /{id}/contract               -> update_contract
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::archive),
        )
        .route("/{id}/hard-delete", post(project::hard_delete))
        .route("/{id}/files", post(project::upload_files))
        .route("/{id}/subprojects", get(project::subprojects))
        .route("/{id}/detail", get(project::detail))
        .route("/{id}/financial-summary", get(project::summary))
        .route("/{id}/fund", get(project::fund))
        .route("/{id}/fund/ensure-accrued", post(project::ensure_accrued))
        .route("/{id}/contract-periods", get(project::contract_periods))
        .route("/{id}/contract", put(project::update_contract))
}
