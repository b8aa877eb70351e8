//! Transaction and group-row validation rules.
//!
//! Group-row validation collects every violation instead of stopping at the
//! first, so a submission can be rejected with the full per-row list. Row
//! numbers in messages are 1-based to match what the user sees.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::types::EntryType;

/// Category name that relaxes the supplier requirement on expenses.
pub const OTHER_CATEGORY_NAME: &str = "Other";

/// A transaction amount must be strictly positive.
pub fn validate_amount(amount: Decimal) -> Result<(), CoreError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Amount must be positive, got {amount}"
        )))
    }
}

/// A transaction may not predate its project's (or selected contract
/// period's) start date.
pub fn validate_transaction_date(
    tx_date: NaiveDate,
    contract_start: Option<NaiveDate>,
) -> Result<(), CoreError> {
    match contract_start {
        Some(start) if tx_date < start => Err(CoreError::Validation(format!(
            "Transaction date {tx_date} is before the contract start {start}"
        ))),
        _ => Ok(()),
    }
}

/// One row of a group-transaction submission, projected to what validation
/// needs. Referenced entities are resolved by the caller beforehand.
#[derive(Debug, Clone)]
pub struct GroupRow {
    pub kind: EntryType,
    pub project_selected: bool,
    /// Whether the selected project is a parent project.
    pub project_is_parent: bool,
    pub subproject_selected: bool,
    pub amount: Option<Decimal>,
    pub tx_date: Option<NaiveDate>,
    /// Contract start of the target project (or sub-project).
    pub contract_start: Option<NaiveDate>,
    pub from_fund: bool,
    pub supplier_selected: bool,
    /// Resolved category display name, when a category was chosen.
    pub category_name: Option<String>,
}

/// A validation failure tagged with its 1-based row number.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Validate every row, returning all violations. Empty means submittable.
pub fn validate_group_rows(rows: &[GroupRow]) -> Vec<RowError> {
    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let mut push = |message: String| errors.push(RowError { row: row_number, message });

        if !row.project_selected {
            push("A project is required".into());
        } else if row.project_is_parent && !row.subproject_selected {
            push("A sub-project is required for parent projects".into());
        }

        match row.amount {
            None => push("An amount is required".into()),
            Some(amount) if amount <= Decimal::ZERO => {
                push(format!("Amount must be positive, got {amount}"));
            }
            Some(_) => {}
        }

        match row.tx_date {
            None => push("A date is required".into()),
            Some(date) => {
                if let Err(e) = validate_transaction_date(date, row.contract_start) {
                    push(e.to_string());
                }
            }
        }

        if row.kind == EntryType::Expense
            && !row.from_fund
            && !row.supplier_selected
            && row.category_name.as_deref() != Some(OTHER_CATEGORY_NAME)
        {
            push("A supplier is required for expenses not paid from the fund".into());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn valid_row() -> GroupRow {
        GroupRow {
            kind: EntryType::Expense,
            project_selected: true,
            project_is_parent: false,
            subproject_selected: false,
            amount: Some(Decimal::from(100)),
            tx_date: Some(d(2024, 6, 1)),
            contract_start: Some(d(2024, 1, 1)),
            from_fund: false,
            supplier_selected: true,
            category_name: Some("Maintenance".into()),
        }
    }

    // -- validate_amount / validate_transaction_date --

    #[test]
    fn positive_amount_accepted() {
        assert!(validate_amount(Decimal::from(1)).is_ok());
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from(-5)).is_err());
    }

    #[test]
    fn date_before_contract_start_rejected_with_message() {
        let err = validate_transaction_date(d(2023, 12, 31), Some(d(2024, 1, 1))).unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(err.to_string().contains("before the contract start"));
    }

    #[test]
    fn date_on_contract_start_accepted() {
        assert!(validate_transaction_date(d(2024, 1, 1), Some(d(2024, 1, 1))).is_ok());
    }

    #[test]
    fn date_without_contract_start_accepted() {
        assert!(validate_transaction_date(d(2020, 1, 1), None).is_ok());
    }

    // -- validate_group_rows --

    #[test]
    fn valid_rows_produce_no_errors() {
        assert!(validate_group_rows(&[valid_row(), valid_row()]).is_empty());
    }

    #[test]
    fn missing_project_reported() {
        let mut row = valid_row();
        row.project_selected = false;
        let errors = validate_group_rows(&[row]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 1);
        assert!(errors[0].message.contains("project is required"));
    }

    #[test]
    fn parent_project_requires_subproject() {
        let mut row = valid_row();
        row.project_is_parent = true;
        row.subproject_selected = false;
        let errors = validate_group_rows(&[row]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("sub-project"));
    }

    #[test]
    fn negative_amount_reported_with_row_number() {
        let mut bad = valid_row();
        bad.amount = Some(Decimal::from(-50));
        let errors = validate_group_rows(&[valid_row(), bad, valid_row()]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 2);
    }

    #[test]
    fn date_guard_applies_per_row() {
        let mut bad = valid_row();
        bad.tx_date = Some(d(2023, 6, 1));
        let errors = validate_group_rows(&[bad]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("before the contract start"));
    }

    #[test]
    fn expense_without_supplier_rejected() {
        let mut row = valid_row();
        row.supplier_selected = false;
        let errors = validate_group_rows(&[row]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("supplier"));
    }

    #[test]
    fn other_category_waives_supplier() {
        let mut row = valid_row();
        row.supplier_selected = false;
        row.category_name = Some(OTHER_CATEGORY_NAME.into());
        assert!(validate_group_rows(&[row]).is_empty());
    }

    #[test]
    fn from_fund_expense_waives_supplier() {
        let mut row = valid_row();
        row.supplier_selected = false;
        row.from_fund = true;
        assert!(validate_group_rows(&[row]).is_empty());
    }

    #[test]
    fn income_rows_never_require_supplier() {
        let mut row = valid_row();
        row.kind = EntryType::Income;
        row.supplier_selected = false;
        assert!(validate_group_rows(&[row]).is_empty());
    }

    #[test]
    fn multiple_violations_all_collected() {
        let mut row = valid_row();
        row.project_selected = false;
        row.amount = None;
        row.tx_date = None;
        let errors = validate_group_rows(&[row]);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.row == 1));
    }
}
