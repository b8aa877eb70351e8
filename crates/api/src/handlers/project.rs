//! Handlers for the `/projects` resource.
//!
//! Projects own most of the domain: sub-projects, contract periods, the
//! combined detail payload, the financial summary, and the fund ledger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domari_core::error::CoreError;
use domari_core::period::{
    contract_end_date, current_period, default_filter_mode, generate_periods, resolve_window,
    FilterMode, Window, WindowMode,
};
use domari_core::summary::{financial_summary, FinancialSummary, SummaryTx};
use domari_core::types::DbId;
use domari_db::models::budget::Budget;
use domari_db::models::category::Category;
use domari_db::models::contract_period::ContractPeriod;
use domari_db::models::fund::FundEntry;
use domari_db::models::project::{CreateProject, Project, UpdateProject};
use domari_db::models::transaction::Transaction;
use domari_db::repositories::{
    BudgetRepo, CategoryRepo, ContractPeriodRepo, FundRepo, ProjectRepo, TransactionRepo, UserRepo,
};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Load a live project and enforce that the caller owns it.
pub(crate) async fn load_owned(
    pool: &domari_db::DbPool,
    id: DbId,
    user: &AuthUser,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if project.owner_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Project belongs to another user".into(),
        )));
    }
    Ok(project)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Creates the project, derives the contract end date from start + duration,
/// and generates the contract periods.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name is required".into(),
        )));
    }
    if let Some(months) = input.contract_duration_months {
        if months <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Contract duration must be at least one month".into(),
            )));
        }
    }
    if let Some(parent_id) = input.relation_project {
        let parent = load_owned(&state.pool, parent_id, &user).await?;
        if !parent.is_parent_project {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Project {parent_id} is not a parent project"
            ))));
        }
    }

    let end_date = match (input.start_date, input.contract_duration_months) {
        (Some(start), Some(months)) => Some(contract_end_date(start, months as u32)?),
        _ => None,
    };

    let project = ProjectRepo::create(&state.pool, user.user_id, &input, end_date).await?;

    if let (Some(start), Some(months)) = (project.start_date, project.contract_duration_months) {
        let spans = generate_periods(start, months as u32)?;
        ContractPeriodRepo::replace_all(&state.pool, project.id, &spans).await?;
    }

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = load_owned(&state.pool, id, &user).await?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    load_owned(&state.pool, id, &user).await?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Archives the project (soft delete). Hard deletion is a separate,
/// password-gated operation.
pub async fn archive(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state.pool, id, &user).await?;
    ProjectRepo::archive(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for `POST /projects/{id}/hard-delete`.
#[derive(Debug, Deserialize)]
pub struct HardDeleteRequest {
    pub password: String,
}

/// POST /api/v1/projects/{id}/hard-delete
///
/// Permanently removes the project and everything under it. Gated on the
/// caller re-entering their password.
pub async fn hard_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<HardDeleteRequest>,
) -> AppResult<StatusCode> {
    let project = ProjectRepo::find_by_id_any(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if project.owner_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Project belongs to another user".into(),
        )));
    }

    let account = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Forbidden(
            "Password confirmation failed".into(),
        )));
    }

    ProjectRepo::hard_delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/subprojects
pub async fn subprojects(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Project>>> {
    load_owned(&state.pool, id, &user).await?;
    let children = ProjectRepo::list_subprojects(&state.pool, id).await?;
    Ok(Json(children))
}

// ---------------------------------------------------------------------------
// Image / contract files
// ---------------------------------------------------------------------------

/// Outcome of a project file upload. Failures are per-file; one bad file
/// does not discard the other.
#[derive(Debug, Serialize)]
pub struct ProjectFilesResult {
    pub project: Project,
    /// Messages for files that could not be stored.
    pub errors: Vec<String>,
}

/// POST /api/v1/projects/{id}/files
///
/// Multipart upload of the project's `image` and/or `contract` file.
/// Stored files are recorded as documents and their paths written onto the
/// project. Per-file failures are aggregated; the project keeps whatever
/// succeeded.
pub async fn upload_files(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: axum::extract::Multipart,
) -> AppResult<Json<ProjectFilesResult>> {
    load_owned(&state.pool, id, &user).await?;

    let mut image_path = None;
    let mut contract_path = None;
    let mut errors = Vec::new();
    let mut seen_any = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "image" && name != "contract" {
            continue; // ignore unknown fields
        }
        seen_any = true;
        let filename = field.file_name().unwrap_or(&name).to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                errors.push(format!("Failed to read '{name}' upload: {e}"));
                continue;
            }
        };

        let stored_path = match state.storage.save(&filename, &data).await {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(project_id = id, field = %name, error = %e, "File store failed");
                errors.push(format!("Failed to store '{name}' upload"));
                continue;
            }
        };

        if let Err(e) = domari_db::repositories::DocumentRepo::create(
            &state.pool,
            domari_db::models::document::DocumentScope::Project,
            Some(id),
            &filename,
            &stored_path,
            content_type.as_deref(),
            data.len() as i64,
        )
        .await
        {
            tracing::error!(project_id = id, field = %name, error = %e, "Document record failed");
            errors.push(format!("Failed to record '{name}' upload"));
            continue;
        }

        match name.as_str() {
            "image" => image_path = Some(stored_path),
            _ => contract_path = Some(stored_path),
        }
    }

    if !seen_any {
        return Err(AppError::BadRequest(
            "Expected an 'image' or 'contract' field".into(),
        ));
    }

    let update = UpdateProject {
        name: None,
        description: None,
        budget_monthly: None,
        budget_annual: None,
        has_fund: None,
        monthly_fund_amount: None,
        image_path,
        contract_path,
    };
    let project = ProjectRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(ProjectFilesResult { project, errors }))
}

// ---------------------------------------------------------------------------
// Combined detail payload
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects/{id}/detail`.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// Select a historical contract period to view.
    pub period_id: Option<DbId>,
}

/// Fund section of the detail payload.
#[derive(Debug, Serialize)]
pub struct FundSummary {
    pub has_fund: bool,
    pub monthly_fund_amount: Option<Decimal>,
    pub balance: Decimal,
    /// Negative balances are allowed; this flags them for the client.
    pub is_negative: bool,
    pub entries: Vec<FundEntry>,
}

/// Everything a project detail view needs, in one payload.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub subprojects: Vec<Project>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
    pub fund: Option<FundSummary>,
    pub contract_periods: Vec<ContractPeriod>,
    pub current_period_id: Option<DbId>,
    pub selected_period_id: Option<DbId>,
    /// The reconciled display window.
    pub window: Window,
    pub default_filter_mode: FilterMode,
}

/// GET /api/v1/projects/{id}/detail?period_id=
///
/// One combined payload: project, sub-projects, transactions (including
/// sub-project transactions, fetched concurrently), budgets, categories,
/// fund, and contract periods, plus the reconciled viewing window.
///
/// Selecting a historical period overrides the window with that period's
/// bounds and forces whole-period viewing. A contract that ended before the
/// current month defaults to whole-project viewing instead of an empty
/// current month.
pub async fn detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<ProjectDetail>> {
    let project = load_owned(&state.pool, id, &user).await?;
    let today = Utc::now().date_naive();

    // Independent reads, issued together.
    let (subprojects, budgets, categories, periods) = tokio::try_join!(
        ProjectRepo::list_subprojects(&state.pool, id),
        BudgetRepo::list_by_project(&state.pool, id),
        CategoryRepo::list(&state.pool, true),
        ContractPeriodRepo::list_by_project(&state.pool, id),
    )?;

    // Own transactions plus each sub-project's, fetched as one batch.
    // Ordering across the batch does not matter; results are concatenated.
    let mut tx_ids = vec![id];
    tx_ids.extend(subprojects.iter().map(|p| p.id));
    let transactions: Vec<Transaction> = try_join_all(
        tx_ids
            .iter()
            .map(|pid| TransactionRepo::list_by_project(&state.pool, *pid, None)),
    )
    .await?
    .into_iter()
    .flatten()
    .collect();

    let fund = if project.has_fund {
        let (balance, entries) = tokio::try_join!(
            FundRepo::balance(&state.pool, id),
            FundRepo::list_by_project(&state.pool, id),
        )?;
        Some(FundSummary {
            has_fund: true,
            monthly_fund_amount: project.monthly_fund_amount,
            is_negative: balance < Decimal::ZERO,
            balance,
            entries,
        })
    } else {
        None
    };

    let current_period_id = periods
        .iter()
        .filter(|p| p.start_date <= today)
        .max_by_key(|p| p.start_date)
        .map(|p| p.id);

    let selected = match query.period_id {
        Some(period_id) => {
            let period = periods.iter().find(|p| p.id == period_id).ok_or(AppError::Core(
                CoreError::NotFound {
                    entity: "ContractPeriod",
                    id: period_id,
                },
            ))?;
            Some(period)
        }
        None => None,
    };

    let filter_mode = default_filter_mode(today, project.end_date, selected.is_some());
    let selected_period_id = selected.map(|p| p.id);
    let window = match selected {
        Some(period) => Window {
            start: period.start_date,
            end: period.end_date,
        },
        None => {
            let mode = match filter_mode {
                FilterMode::Project => WindowMode::Project,
                _ => WindowMode::CurrentMonth,
            };
            resolve_window(mode, today, project.start_date, project.end_date)?
        }
    };

    Ok(Json(ProjectDetail {
        selected_period_id,
        project,
        subprojects,
        transactions,
        budgets,
        categories,
        fund,
        contract_periods: periods,
        current_period_id,
        window,
        default_filter_mode: filter_mode,
    }))
}

// ---------------------------------------------------------------------------
// Financial summary
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects/{id}/financial-summary`.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// `current_month` (default), `selected_month`, `date_range`,
    /// `all_time`, or `project`.
    pub mode: Option<String>,
    /// `YYYY-MM`, required for `selected_month`.
    pub month: Option<String>,
    /// Required (with `end_date`) for `date_range`.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SummaryQuery {
    fn window_mode(&self) -> Result<WindowMode, CoreError> {
        match self.mode.as_deref().unwrap_or("current_month") {
            "current_month" => Ok(WindowMode::CurrentMonth),
            "selected_month" => {
                let key = self.month.as_deref().ok_or_else(|| {
                    CoreError::Validation("mode=selected_month requires month=YYYY-MM".into())
                })?;
                let (year, month) = domari_core::period::parse_month_key(key)?;
                Ok(WindowMode::SelectedMonth { year, month })
            }
            "date_range" => {
                let (start, end) = self.start_date.zip(self.end_date).ok_or_else(|| {
                    CoreError::Validation(
                        "mode=date_range requires start_date and end_date".into(),
                    )
                })?;
                Ok(WindowMode::DateRange { start, end })
            }
            "all_time" => Ok(WindowMode::AllTime),
            "project" => Ok(WindowMode::Project),
            other => Err(CoreError::Validation(format!("Unknown mode: {other}"))),
        }
    }
}

/// Summary response: the resolved window plus the totals.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub window: Window,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

/// GET /api/v1/projects/{id}/financial-summary
///
/// Income/expense totals for the requested window, pro-rating period
/// transactions by day, excluding fund movements, and flooring income at
/// the accrued recurring monthly amount. Parent projects aggregate their
/// sub-projects' transactions.
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<SummaryResponse>> {
    let project = load_owned(&state.pool, id, &user).await?;
    let today = Utc::now().date_naive();

    let mode = query.window_mode()?;
    let window = resolve_window(mode, today, project.start_date, project.end_date)?;

    let mut tx_ids = vec![id];
    if project.is_parent_project {
        let children = ProjectRepo::list_subprojects(&state.pool, id).await?;
        tx_ids.extend(children.iter().map(|p| p.id));
    }
    let transactions: Vec<SummaryTx> = try_join_all(
        tx_ids
            .iter()
            .map(|pid| TransactionRepo::list_by_project(&state.pool, *pid, None)),
    )
    .await?
    .into_iter()
    .flatten()
    .map(|tx| SummaryTx {
        kind: tx.entry_type.into(),
        amount: tx.amount,
        tx_date: tx.tx_date,
        period_start: tx.period_start_date,
        period_end: tx.period_end_date,
        from_fund: tx.from_fund,
    })
    .collect();

    let summary = financial_summary(&transactions, window, project.budget_monthly);
    Ok(Json(SummaryResponse { window, summary }))
}

// ---------------------------------------------------------------------------
// Fund
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/fund
pub async fn fund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<FundSummary>> {
    let project = load_owned(&state.pool, id, &user).await?;
    let (balance, entries) = tokio::try_join!(
        FundRepo::balance(&state.pool, id),
        FundRepo::list_by_project(&state.pool, id),
    )?;
    Ok(Json(FundSummary {
        has_fund: project.has_fund,
        monthly_fund_amount: project.monthly_fund_amount,
        is_negative: balance < Decimal::ZERO,
        balance,
        entries,
    }))
}

/// POST /api/v1/projects/{id}/fund/ensure-accrued
///
/// Catch up the project's monthly fund accruals. Idempotent.
pub async fn ensure_accrued(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let project = load_owned(&state.pool, id, &user).await?;
    if !project.has_fund {
        return Err(AppError::Core(CoreError::Validation(
            "Project has no fund".into(),
        )));
    }
    let today = Utc::now().date_naive();
    let created = domari_worker::accrue_project(&state.pool, &project, today)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(Json(serde_json::json!({ "entries_created": created })))
}

// ---------------------------------------------------------------------------
// Contract periods
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/contract-periods
pub async fn contract_periods(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ContractPeriod>>> {
    load_owned(&state.pool, id, &user).await?;
    let periods = ContractPeriodRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(periods))
}

/// Where a contract change takes effect.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "period_id")]
pub enum ApplyFrom {
    /// From the latest period that has already started.
    CurrentPeriod,
    /// From a specific (historical) period.
    Period(DbId),
}

/// Request body for `PUT /projects/{id}/contract`.
#[derive(Debug, Deserialize)]
pub struct ContractUpdate {
    pub apply_from: ApplyFrom,
    pub duration_months: i32,
    pub budget_monthly: Option<Decimal>,
}

/// PUT /api/v1/projects/{id}/contract
///
/// Renew or reshape the contract from a chosen period forward: periods from
/// the effective period's start date are regenerated with the new duration,
/// earlier periods are preserved, and the project end date becomes
/// effective start + duration.
pub async fn update_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ContractUpdate>,
) -> AppResult<Json<Project>> {
    let project = load_owned(&state.pool, id, &user).await?;
    if input.duration_months <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Contract duration must be at least one month".into(),
        )));
    }

    let periods = ContractPeriodRepo::list_by_project(&state.pool, id).await?;
    let today = Utc::now().date_naive();

    let effective_start = match input.apply_from {
        ApplyFrom::CurrentPeriod => {
            let spans: Vec<_> = periods
                .iter()
                .map(|p| domari_core::period::PeriodSpan {
                    start_date: p.start_date,
                    end_date: p.end_date,
                    contract_year: p.contract_year,
                    year_index: p.year_index,
                })
                .collect();
            current_period(&spans, today)
                .map(|p| p.start_date)
                .or(project.start_date)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(
                        "Project has no contract periods or start date".into(),
                    ))
                })?
        }
        ApplyFrom::Period(period_id) => periods
            .iter()
            .find(|p| p.id == period_id)
            .map(|p| p.start_date)
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ContractPeriod",
                id: period_id,
            }))?,
    };

    let spans = generate_periods(effective_start, input.duration_months as u32)?;
    ContractPeriodRepo::replace_from(&state.pool, id, effective_start, &spans).await?;

    let new_end = contract_end_date(effective_start, input.duration_months as u32)?;
    let start_date = project.start_date.unwrap_or(effective_start);
    let updated = ProjectRepo::set_contract(
        &state.pool,
        id,
        start_date,
        new_end,
        input.duration_months,
        input.budget_monthly,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    }))?;

    Ok(Json(updated))
}
