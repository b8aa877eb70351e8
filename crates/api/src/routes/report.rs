//! Route definitions for the `/reports` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// POST /project/custom-report          -> project_report
/// POST /supplier/{id}/custom-report    -> supplier_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/project/custom-report", post(report::project_report))
        .route("/supplier/{id}/custom-report", post(report::supplier_report))
}
