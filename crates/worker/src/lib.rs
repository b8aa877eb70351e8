//! Monthly generation: recurring-transaction instances and fund accruals.
//!
//! The scheduled worker binary and the API's `ensure-generated` /
//! `ensure-accrued` endpoints share these functions, so a catch-up
//! triggered over HTTP behaves exactly like the scheduled run. Both
//! passes are idempotent: recurring generation tracks the last generated
//! occurrence per template, fund accrual is keyed by calendar month.

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use domari_core::error::CoreError;
use domari_core::period::{add_months, first_day_of_month, month_key};
use domari_core::recurring::due_occurrences;
use domari_db::models::project::Project;
use domari_db::models::recurring::RecurringTemplate;
use domari_db::models::transaction::CreateTransaction;
use domari_db::repositories::{FundRepo, ProjectRepo, RecurringRepo, TransactionRepo};

/// Errors from a generation pass.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of one recurring-generation pass.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RecurringReport {
    pub templates_checked: usize,
    pub transactions_created: usize,
}

/// Outcome of one fund-accrual pass.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct AccrualReport {
    pub projects_checked: usize,
    pub entries_created: usize,
}

/// Generate every transaction due from active recurring templates, up to
/// and including `today`. Re-running is a no-op.
pub async fn generate_recurring(
    pool: &PgPool,
    today: NaiveDate,
) -> Result<RecurringReport, WorkerError> {
    let templates = RecurringRepo::list_active(pool).await?;
    let mut report = RecurringReport {
        templates_checked: templates.len(),
        ..Default::default()
    };

    for template in &templates {
        report.transactions_created += generate_for_template(pool, template, today).await?;
    }

    tracing::info!(
        templates = report.templates_checked,
        created = report.transactions_created,
        "Recurring generation pass complete"
    );
    Ok(report)
}

/// Generate the occurrences due for a single template. Returns the number
/// of transactions created.
pub async fn generate_for_template(
    pool: &PgPool,
    template: &RecurringTemplate,
    today: NaiveDate,
) -> Result<usize, WorkerError> {
    let end = template.end_condition()?;
    let due = due_occurrences(
        template.start_date,
        template.day_of_month.max(0) as u32,
        &end,
        template.last_generated,
        today,
    )?;

    let mut created = 0;
    for occurrence in due {
        let input = CreateTransaction {
            project_id: template.project_id,
            entry_type: template.entry_type,
            amount: template.amount,
            tx_date: Some(occurrence),
            period_start_date: None,
            period_end_date: None,
            category_id: template.category_id,
            supplier_id: template.supplier_id,
            description: template.description.clone(),
            is_exceptional: false,
            from_fund: false,
            recurring_template_id: Some(template.id),
            allow_duplicate: true,
        };
        TransactionRepo::create(pool, &input).await?;
        RecurringRepo::set_last_generated(pool, template.id, occurrence).await?;
        created += 1;
    }

    if created > 0 {
        tracing::debug!(template_id = template.id, created, "Generated recurring transactions");
    }
    Ok(created)
}

/// Insert the monthly fund accruals owed by every fund-carrying project,
/// one per elapsed calendar month since the project start. Month-keyed, so
/// re-running adds nothing.
pub async fn accrue_funds(pool: &PgPool, today: NaiveDate) -> Result<AccrualReport, WorkerError> {
    let projects = ProjectRepo::list_with_fund(pool).await?;
    let mut report = AccrualReport {
        projects_checked: projects.len(),
        ..Default::default()
    };

    for project in &projects {
        report.entries_created += accrue_project(pool, project, today).await?;
    }

    tracing::info!(
        projects = report.projects_checked,
        created = report.entries_created,
        "Fund accrual pass complete"
    );
    Ok(report)
}

/// Insert the accruals owed by a single project, one per calendar month
/// from its start through `today`. Returns the number of entries added.
pub async fn accrue_project(
    pool: &PgPool,
    project: &Project,
    today: NaiveDate,
) -> Result<usize, WorkerError> {
    let Some(amount) = project.monthly_fund_amount else {
        tracing::warn!(project_id = project.id, "Fund enabled without a monthly amount");
        return Ok(0);
    };
    let Some(start) = project.start_date else {
        tracing::warn!(project_id = project.id, "Fund enabled without a start date");
        return Ok(0);
    };

    let mut created = 0;
    let mut month = first_day_of_month(start.year(), start.month());
    while month <= today {
        let inserted =
            FundRepo::insert_accrual(pool, project.id, amount, month, &month_key(month)).await?;
        if inserted {
            created += 1;
        }
        month = add_months(month, 1)?;
    }
    Ok(created)
}
