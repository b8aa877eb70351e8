pub mod auth;
pub mod budget;
pub mod category;
pub mod document;
pub mod health;
pub mod project;
pub mod recurring;
pub mod report;
pub mod supplier;
pub mod transaction;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/change-password                            change password
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, archive
/// /projects/{id}/hard-delete                       permanent delete (password-gated)
/// /projects/{id}/files                             image/contract upload (POST, multipart)
/// /projects/{id}/subprojects                       list sub-projects
/// /projects/{id}/detail                            combined detail payload (?period_id)
/// /projects/{id}/financial-summary                 windowed income/expense totals
/// /projects/{id}/fund                              fund balance + ledger
/// /projects/{id}/fund/ensure-accrued               idempotent accrual catch-up (POST)
/// /projects/{id}/contract-periods                  list generated periods
/// /projects/{id}/contract                          renew/reshape contract (PUT)
///
/// /transactions                                    create
/// /transactions/{id}                               get, update, delete
/// /transactions/{id}/supplier-document             multipart upload (POST)
/// /transactions/project/{id}                       list by project (?exceptional)
/// /transactions/group                              group creation (POST)
///
/// /recurring-transactions                          list (?project_id), create
/// /recurring-transactions/{id}                     update, delete
/// /recurring-transactions/generate-monthly         generation pass (POST)
/// /recurring-transactions/ensure-generated         idempotent catch-up (POST)
///
/// /budgets                                         create
/// /budgets/{id}                                    get, update, delete
/// /budgets/{id}/status                             spent/remaining/expected
///
/// /categories                                      list (?active), create
/// /categories/{id}                                 update, delete
///
/// /suppliers                                       list (?active), create
/// /suppliers/{id}                                  get, update, delete
/// /suppliers/{id}/documents                        list, multipart upload
///
/// /documents/staged                                stage uploads (POST, multipart)
/// /documents/{id}/download                         binary download
///
/// /reports/project/custom-report                   ZIP report (POST)
/// /reports/supplier/{id}/custom-report             ZIP report (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (login, refresh, logout, change-password).
        .nest("/auth", auth::router())
        // Projects (also nests fund, detail, contract periods).
        .nest("/projects", project::router())
        // Transactions, group creation, document upload.
        .nest("/transactions", transaction::router())
        // Recurring templates and generation.
        .nest("/recurring-transactions", recurring::router())
        // Category budgets.
        .nest("/budgets", budget::router())
        // Reference lists.
        .nest("/categories", category::router())
        .nest("/suppliers", supplier::router())
        // Staged uploads and downloads.
        .nest("/documents", document::router())
        // Report exports.
        .nest("/reports", report::router())
}
