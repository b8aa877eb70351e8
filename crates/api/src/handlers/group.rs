//! Group-transaction creation: N independent rows from one submission.
//!
//! Validation runs first over every row and aborts the whole submission if
//! anything is wrong -- nothing is created in that case. Once execution
//! starts, rows are processed sequentially (document linkage needs the id
//! just created) and failures are isolated per row: a failed create is
//! recorded and processing continues. Document attachment failures never
//! roll back the created transaction.

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domari_core::retry::RetryPolicy;
use domari_core::types::{DbId, EntryType};
use domari_core::validation::{validate_group_rows, GroupRow, RowError};
use domari_db::models::document::DocumentScope;
use domari_db::models::project::Project;
use domari_db::models::transaction::{CreateTransaction, TxType};
use domari_db::repositories::{CategoryRepo, DocumentRepo, FundRepo, ProjectRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// One row of a group submission.
#[derive(Debug, Deserialize)]
pub struct GroupRowRequest {
    pub project_id: Option<DbId>,
    /// Required when the selected project is a parent project.
    pub subproject_id: Option<DbId>,
    pub entry_type: TxType,
    pub amount: Option<Decimal>,
    pub tx_date: Option<NaiveDate>,
    pub category_id: Option<DbId>,
    pub supplier_id: Option<DbId>,
    pub description: Option<String>,
    #[serde(default)]
    pub from_fund: bool,
    #[serde(default)]
    pub is_exceptional: bool,
    /// Previously staged documents to attach to the created transaction.
    #[serde(default)]
    pub document_ids: Vec<DbId>,
}

/// Request body for `POST /transactions/group`.
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub rows: Vec<GroupRowRequest>,
}

/// Aggregated outcome of a group submission.
#[derive(Debug, Serialize)]
pub struct GroupResult {
    pub created: usize,
    pub failed: usize,
    pub income_count: usize,
    pub income_total: Decimal,
    pub expense_count: usize,
    pub expense_total: Decimal,
    pub documents_attached: usize,
    /// Row-tagged execution errors (creates and attachments).
    pub errors: Vec<RowError>,
}

/// A row that passed resolution: the insert payload aimed at the target
/// project (the sub-project when one was selected).
struct PreparedRow {
    input: CreateTransaction,
    document_ids: Vec<DbId>,
}

/// POST /api/v1/transactions/group
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GroupRequest>,
) -> AppResult<Json<GroupResult>> {
    if request.rows.is_empty() {
        return Err(AppError::BadRequest("At least one row is required".into()));
    }

    // ------------------------------------------------------------------
    // Phase 1: resolve references and validate every row. Errors are
    // collected, not short-circuited; any error aborts the submission.
    // ------------------------------------------------------------------
    let mut resolution_errors: Vec<RowError> = Vec::new();
    let mut validation_rows: Vec<GroupRow> = Vec::new();
    let mut prepared: Vec<Option<PreparedRow>> = Vec::new();

    for (index, row) in request.rows.iter().enumerate() {
        let row_number = index + 1;
        let (validation_row, prepared_row) =
            resolve_row(&state, &user, row, row_number, &mut resolution_errors).await?;
        validation_rows.push(validation_row);
        prepared.push(prepared_row);
    }

    let mut errors = resolution_errors;
    errors.extend(validate_group_rows(&validation_rows));
    errors.sort_by_key(|e| e.row);
    errors.dedup();
    if !errors.is_empty() {
        return Err(AppError::RowErrors(errors));
    }

    // ------------------------------------------------------------------
    // Phase 2: sequential creation with per-row failure isolation.
    // ------------------------------------------------------------------
    let mut result = GroupResult {
        created: 0,
        failed: 0,
        income_count: 0,
        income_total: Decimal::ZERO,
        expense_count: 0,
        expense_total: Decimal::ZERO,
        documents_attached: 0,
        errors: Vec::new(),
    };

    for (index, slot) in prepared.into_iter().enumerate() {
        let row_number = index + 1;
        // Validation passed, so every slot is populated.
        let Some(row) = slot else { continue };

        let transaction = match TransactionRepo::create(&state.pool, &row.input).await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!(row = row_number, error = %e, "Group row create failed");
                result.failed += 1;
                result.errors.push(RowError {
                    row: row_number,
                    message: "Failed to create transaction".into(),
                });
                continue;
            }
        };

        result.created += 1;
        match EntryType::from(transaction.entry_type) {
            EntryType::Income => {
                result.income_count += 1;
                result.income_total += transaction.amount;
            }
            EntryType::Expense => {
                result.expense_count += 1;
                result.expense_total += transaction.amount;
            }
        }

        if transaction.from_fund {
            let entry_date = transaction.tx_date.unwrap_or_else(|| Utc::now().date_naive());
            if let Err(e) = FundRepo::insert_withdrawal(
                &state.pool,
                transaction.project_id,
                transaction.amount,
                entry_date,
                transaction.id,
            )
            .await
            {
                tracing::error!(row = row_number, error = %e, "Fund withdrawal failed");
                result.errors.push(RowError {
                    row: row_number,
                    message: "Transaction created but the fund withdrawal failed".into(),
                });
            }
        }

        // Attach staged documents one by one; each failure is tracked
        // independently and never rolls the transaction back.
        for document_id in &row.document_ids {
            match attach_document(&state, *document_id, transaction.id).await {
                Ok(()) => result.documents_attached += 1,
                Err(message) => {
                    tracing::warn!(row = row_number, document_id, %message, "Attachment failed");
                    result.errors.push(RowError {
                        row: row_number,
                        message,
                    });
                }
            }
        }
    }

    Ok(Json(result))
}

/// Resolve one row's references (project, sub-project, category), producing
/// the core validation row and, when everything resolved, the prepared
/// insert payload. Reference failures are pushed onto `errors`.
async fn resolve_row(
    state: &AppState,
    user: &AuthUser,
    row: &GroupRowRequest,
    row_number: usize,
    errors: &mut Vec<RowError>,
) -> AppResult<(GroupRow, Option<PreparedRow>)> {
    let mut project: Option<Project> = None;
    let mut project_is_parent = false;
    let project_selected = row.project_id.is_some();

    if let Some(project_id) = row.project_id {
        match ProjectRepo::find_by_id(&state.pool, project_id).await? {
            Some(p) if p.owner_id == user.user_id => {
                project_is_parent = p.is_parent_project;
                project = Some(p);
            }
            _ => errors.push(RowError {
                row: row_number,
                message: format!("Project {project_id} not found"),
            }),
        }
    }

    let mut subproject: Option<Project> = None;
    let subproject_selected = row.subproject_id.is_some();
    if let (Some(parent), Some(sub_id)) = (&project, row.subproject_id) {
        match ProjectRepo::find_by_id(&state.pool, sub_id).await? {
            Some(sub) if sub.relation_project == Some(parent.id) => subproject = Some(sub),
            _ => errors.push(RowError {
                row: row_number,
                message: format!("Sub-project {sub_id} not found under project {}", parent.id),
            }),
        }
    }

    let mut category_name = None;
    if let Some(category_id) = row.category_id {
        match CategoryRepo::find_by_id(&state.pool, category_id).await? {
            Some(category) => category_name = Some(category.name),
            None => errors.push(RowError {
                row: row_number,
                message: format!("Category {category_id} not found"),
            }),
        }
    }

    // The date guard runs against the target project (the sub-project when
    // one is selected).
    let target = subproject.clone().or_else(|| project.clone());
    let contract_start = target.as_ref().and_then(|p| p.start_date);

    let validation_row = GroupRow {
        kind: row.entry_type.into(),
        project_selected,
        project_is_parent,
        subproject_selected,
        amount: row.amount,
        tx_date: row.tx_date,
        contract_start,
        from_fund: row.from_fund,
        supplier_selected: row.supplier_id.is_some(),
        category_name,
    };

    let prepared = match (target, row.amount, row.tx_date) {
        (Some(target), Some(amount), Some(tx_date)) => Some(PreparedRow {
            input: CreateTransaction {
                project_id: target.id,
                entry_type: row.entry_type,
                amount,
                tx_date: Some(tx_date),
                period_start_date: None,
                period_end_date: None,
                category_id: row.category_id,
                supplier_id: row.supplier_id,
                description: row.description.clone(),
                is_exceptional: row.is_exceptional,
                from_fund: row.from_fund,
                recurring_template_id: None,
                allow_duplicate: true,
            },
            document_ids: row.document_ids.clone(),
        }),
        _ => None,
    };

    Ok((validation_row, prepared))
}

/// Attach one staged document to a transaction, retrying while the stored
/// file is not yet visible. Returns a user-facing message on failure.
async fn attach_document(
    state: &AppState,
    document_id: DbId,
    transaction_id: DbId,
) -> Result<(), String> {
    let document = match DocumentRepo::find_by_id(&state.pool, document_id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return Err(format!("Document {document_id} not found")),
        Err(e) => {
            tracing::error!(document_id, error = %e, "Document lookup failed");
            return Err(format!("Failed to look up document {document_id}"));
        }
    };

    // A freshly staged upload may not be visible to the store yet; retry
    // the visibility check before linking.
    let policy = RetryPolicy::attachment_default();
    let storage = state.storage.clone();
    let stored_path = document.stored_path.clone();
    let verified = policy
        .run(
            |e: &crate::storage::StorageError| e.is_retryable(),
            || storage.verify(&stored_path),
        )
        .await;
    if let Err(e) = verified {
        return Err(format!("Document {document_id} is not available: {e}"));
    }

    match DocumentRepo::attach(
        &state.pool,
        document_id,
        DocumentScope::Transaction,
        transaction_id,
    )
    .await
    {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(format!(
            "Document {document_id} is no longer staged and cannot be attached"
        )),
        Err(e) => {
            tracing::error!(document_id, error = %e, "Document attach failed");
            Err(format!("Failed to attach document {document_id}"))
        }
    }
}
