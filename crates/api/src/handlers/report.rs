//! Custom report exports: ZIP bundles of CSV files.

use std::io::Write;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use domari_core::error::CoreError;
use domari_core::period::Window;
use domari_core::summary::{financial_summary, windowed_amount, SummaryTx};
use domari_core::types::DbId;
use domari_db::models::transaction::Transaction;
use domari_db::repositories::{SupplierRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::load_owned;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for custom reports.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request body for `POST /reports/project/custom-report`.
#[derive(Debug, Deserialize)]
pub struct ProjectReportRequest {
    pub project_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// POST /api/v1/reports/project/custom-report
///
/// ZIP bundle with `summary.csv` (windowed income/expense totals) and
/// `transactions.csv` (every transaction contributing to the window).
pub async fn project_report(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ProjectReportRequest>,
) -> AppResult<impl IntoResponse> {
    if input.end_date < input.start_date {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid date range: {} is after {}",
            input.start_date, input.end_date
        ))));
    }
    let project = load_owned(&state.pool, input.project_id, &user).await?;
    let window = Window {
        start: input.start_date,
        end: input.end_date,
    };

    let transactions =
        TransactionRepo::list_by_project(&state.pool, project.id, None).await?;
    let summary_rows: Vec<SummaryTx> = transactions.iter().map(to_summary_tx).collect();
    let summary = financial_summary(&summary_rows, window, project.budget_monthly);

    let mut summary_csv = String::from("window_start,window_end,income,expense\n");
    summary_csv.push_str(&format!(
        "{},{},{},{}\n",
        window.start, window.end, summary.income, summary.expense
    ));

    let tx_csv = transactions_csv(&transactions, window);

    let filename = format!("project-{}-report.zip", project.id);
    zip_response(&filename, &[("summary.csv", &summary_csv), ("transactions.csv", &tx_csv)])
}

/// POST /api/v1/reports/supplier/{id}/custom-report
///
/// ZIP bundle of the supplier's transactions in the window.
pub async fn supplier_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ReportRequest>,
) -> AppResult<impl IntoResponse> {
    if input.end_date < input.start_date {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid date range: {} is after {}",
            input.start_date, input.end_date
        ))));
    }
    let supplier = SupplierRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))?;
    let window = Window {
        start: input.start_date,
        end: input.end_date,
    };

    let transactions = TransactionRepo::list_by_supplier(&state.pool, supplier.id).await?;
    let tx_csv = transactions_csv(&transactions, window);

    let filename = format!("supplier-{}-report.zip", supplier.id);
    zip_response(&filename, &[("transactions.csv", &tx_csv)])
}

/// Project a row to the summary input shape.
fn to_summary_tx(tx: &Transaction) -> SummaryTx {
    SummaryTx {
        kind: tx.entry_type.into(),
        amount: tx.amount,
        tx_date: tx.tx_date,
        period_start: tx.period_start_date,
        period_end: tx.period_end_date,
        from_fund: tx.from_fund,
    }
}

/// CSV of the transactions contributing to `window`, with their windowed
/// (pro-rated) amounts.
fn transactions_csv(transactions: &[Transaction], window: Window) -> String {
    let mut csv = String::from(
        "id,project_id,type,amount,windowed_amount,date,period_start,period_end,\
         category_id,supplier_id,from_fund,exceptional,description\n",
    );
    for tx in transactions {
        let summary_tx = to_summary_tx(tx);
        let windowed = windowed_amount(&summary_tx, window);
        if windowed.is_zero() && !tx.from_fund {
            continue;
        }
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            tx.id,
            tx.project_id,
            domari_core::types::EntryType::from(tx.entry_type).as_str(),
            tx.amount,
            windowed.round_dp(2),
            opt(tx.tx_date),
            opt(tx.period_start_date),
            opt(tx.period_end_date),
            opt(tx.category_id),
            opt(tx.supplier_id),
            tx.from_fund,
            tx.is_exceptional,
            escape_csv(tx.description.as_deref().unwrap_or("")),
        ));
    }
    csv
}

/// Render an optional value or an empty cell.
fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a free-text field.
fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Build the ZIP bundle and binary response with a download filename.
fn zip_response(
    filename: &str,
    files: &[(&str, &str)],
) -> AppResult<impl IntoResponse> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            zip.write_all(content.as_bytes())
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }
        zip.finish()
            .map_err(|e| AppError::InternalError(e.to_string()))?;
    }

    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        cursor.into_inner(),
    ))
}
