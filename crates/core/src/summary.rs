//! Financial summary aggregation with period-overlap pro-ration.
//!
//! Computes income/expense totals for a date window. Transactions that span
//! multiple calendar periods (a quarterly utility bill tagged with a period
//! range) are apportioned linearly by day. Fund movements are excluded --
//! the fund ledger tracks those separately. Configured recurring monthly
//! income acts as a floor on reported income so it is never under-reported
//! relative to recorded transactions.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::period::{days_in_month, days_inclusive, first_day_of_month, last_day_of_month, overlap, Window};
use crate::types::EntryType;

/// Decimal places for reported money totals.
const MONEY_DP: u32 = 2;

/// A transaction projected down to the fields the summary needs.
#[derive(Debug, Clone)]
pub struct SummaryTx {
    pub kind: EntryType,
    pub amount: Decimal,
    /// Set for single-dated transactions.
    pub tx_date: Option<NaiveDate>,
    /// Set (with `period_end`) for period-based transactions.
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    /// Fund withdrawals never enter the summary.
    pub from_fund: bool,
}

/// Income and expense totals for a window. Callers derive net themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FinancialSummary {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Compute the summary for `window`.
///
/// `budget_monthly` is the project's configured recurring monthly income;
/// when set, reported income is the larger of the day-accrued monthly figure
/// and the summed transaction income.
pub fn financial_summary(
    transactions: &[SummaryTx],
    window: Window,
    budget_monthly: Option<Decimal>,
) -> FinancialSummary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for tx in transactions {
        if tx.from_fund {
            continue;
        }
        let contribution = windowed_amount(tx, window);
        if contribution.is_zero() {
            continue;
        }
        match tx.kind {
            EntryType::Income => income += contribution,
            EntryType::Expense => expense += contribution,
        }
    }

    if let Some(monthly) = budget_monthly {
        let accrued = accrued_monthly_amount(monthly, window);
        income = income.max(accrued);
    }

    FinancialSummary {
        income: income.round_dp(MONEY_DP),
        expense: expense.round_dp(MONEY_DP),
    }
}

/// The portion of a transaction's amount that falls inside `window`.
///
/// Single-dated transactions count at full amount when their date is in the
/// window. Period transactions contribute `amount / total_days * overlap_days`
/// (a zero-length period counts as one day). No overlap contributes zero.
pub fn windowed_amount(tx: &SummaryTx, window: Window) -> Decimal {
    match (tx.period_start, tx.period_end) {
        (Some(start), Some(end)) => {
            let total_days = days_inclusive(start, end);
            if total_days <= 0 {
                return Decimal::ZERO;
            }
            match overlap(start, end, window.start, window.end) {
                Some((o_start, o_end)) => {
                    let overlap_days = days_inclusive(o_start, o_end);
                    tx.amount / Decimal::from(total_days) * Decimal::from(overlap_days)
                }
                None => Decimal::ZERO,
            }
        }
        _ => match tx.tx_date {
            Some(date) if window.start <= date && date <= window.end => tx.amount,
            _ => Decimal::ZERO,
        },
    }
}

/// Accrue a monthly amount day-pro-rata over `window`.
///
/// Each overlapped calendar month contributes
/// `amount * overlap_days / days_in_month`, so a window covering exactly one
/// full month accrues exactly the monthly amount.
pub fn accrued_monthly_amount(monthly: Decimal, window: Window) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut cursor = first_day_of_month(window.start.year(), window.start.month());
    while cursor <= window.end {
        let month_end = last_day_of_month(cursor.year(), cursor.month());
        if let Some((o_start, o_end)) = overlap(cursor, month_end, window.start, window.end) {
            let overlap_days = days_inclusive(o_start, o_end);
            let month_days = days_in_month(cursor.year(), cursor.month());
            total += monthly * Decimal::from(overlap_days) / Decimal::from(month_days);
        }
        cursor = match month_end.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn window(start: NaiveDate, end: NaiveDate) -> Window {
        Window { start, end }
    }

    fn period_tx(kind: EntryType, amount: i64, start: NaiveDate, end: NaiveDate) -> SummaryTx {
        SummaryTx {
            kind,
            amount: dec(amount),
            tx_date: None,
            period_start: Some(start),
            period_end: Some(end),
            from_fund: false,
        }
    }

    fn dated_tx(kind: EntryType, amount: i64, date: NaiveDate) -> SummaryTx {
        SummaryTx {
            kind,
            amount: dec(amount),
            tx_date: Some(date),
            period_start: None,
            period_end: None,
            from_fund: false,
        }
    }

    // -- windowed_amount: pro-ration --

    #[test]
    fn pro_rates_period_transaction_by_day() {
        // 2024-01-02 .. 2024-03-31 is 90 days inclusive; February overlaps 29.
        let tx = period_tx(EntryType::Expense, 900, d(2024, 1, 2), d(2024, 3, 31));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), dec(290));
    }

    #[test]
    fn period_fully_inside_window_counts_in_full() {
        let tx = period_tx(EntryType::Expense, 300, d(2024, 2, 5), d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), dec(300));
    }

    #[test]
    fn period_outside_window_contributes_zero() {
        let before = period_tx(EntryType::Expense, 900, d(2023, 10, 1), d(2023, 12, 31));
        let after = period_tx(EntryType::Expense, 900, d(2024, 4, 1), d(2024, 6, 30));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&before, w), Decimal::ZERO);
        assert_eq!(windowed_amount(&after, w), Decimal::ZERO);
    }

    #[test]
    fn zero_length_period_counts_as_one_day() {
        let tx = period_tx(EntryType::Expense, 120, d(2024, 2, 15), d(2024, 2, 15));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), dec(120));
    }

    #[test]
    fn inverted_period_contributes_zero() {
        let tx = period_tx(EntryType::Expense, 120, d(2024, 2, 20), d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), Decimal::ZERO);
    }

    // -- windowed_amount: single-dated --

    #[test]
    fn dated_transaction_in_window_counts_in_full() {
        let tx = dated_tx(EntryType::Income, 500, d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), dec(500));
    }

    #[test]
    fn dated_transaction_outside_window_is_zero() {
        let tx = dated_tx(EntryType::Income, 500, d(2024, 3, 1));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(windowed_amount(&tx, w), Decimal::ZERO);
    }

    #[test]
    fn dated_transaction_on_window_bounds_counts() {
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let at_start = dated_tx(EntryType::Income, 10, d(2024, 2, 1));
        let at_end = dated_tx(EntryType::Income, 10, d(2024, 2, 29));
        assert_eq!(windowed_amount(&at_start, w), dec(10));
        assert_eq!(windowed_amount(&at_end, w), dec(10));
    }

    // -- fund exclusion --

    #[test]
    fn from_fund_transactions_are_excluded() {
        let mut tx = dated_tx(EntryType::Expense, 500, d(2024, 2, 10));
        tx.from_fund = true;
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[tx], w, None);
        assert_eq!(summary.expense, Decimal::ZERO);
    }

    #[test]
    fn from_fund_excluded_regardless_of_shape() {
        let mut tx = period_tx(EntryType::Expense, 900, d(2024, 1, 2), d(2024, 3, 31));
        tx.from_fund = true;
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[tx], w, None);
        assert_eq!(summary.expense, Decimal::ZERO);
    }

    // -- income floor --

    #[test]
    fn accrued_monthly_income_floors_empty_month() {
        // Full month, zero recorded income: report the accrued monthly figure.
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[], w, Some(dec(1000)));
        assert_eq!(summary.income, dec(1000));
    }

    #[test]
    fn recorded_income_above_floor_wins() {
        let tx = dated_tx(EntryType::Income, 1500, d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[tx], w, Some(dec(1000)));
        assert_eq!(summary.income, dec(1500));
    }

    #[test]
    fn floor_wins_over_smaller_recorded_income() {
        let tx = dated_tx(EntryType::Income, 400, d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[tx], w, Some(dec(1000)));
        assert_eq!(summary.income, dec(1000));
    }

    #[test]
    fn floor_does_not_touch_expenses() {
        let tx = dated_tx(EntryType::Expense, 400, d(2024, 2, 10));
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&[tx], w, Some(dec(1000)));
        assert_eq!(summary.expense, dec(400));
        assert_eq!(summary.income, dec(1000));
    }

    #[test]
    fn half_month_window_accrues_half() {
        // 1..15 of a 30-day month: 15/30 of the monthly amount.
        let w = window(d(2024, 4, 1), d(2024, 4, 15));
        assert_eq!(accrued_monthly_amount(dec(1000), w), dec(500));
    }

    #[test]
    fn accrual_spans_multiple_months() {
        // Two full months accrue twice the monthly amount.
        let w = window(d(2024, 1, 1), d(2024, 2, 29));
        assert_eq!(accrued_monthly_amount(dec(1000), w), dec(2000));
    }

    // -- full summary --

    #[test]
    fn summary_totals_by_kind() {
        let txs = vec![
            dated_tx(EntryType::Income, 800, d(2024, 2, 5)),
            dated_tx(EntryType::Expense, 300, d(2024, 2, 7)),
            dated_tx(EntryType::Expense, 200, d(2024, 2, 20)),
            // Outside the window, must not count.
            dated_tx(EntryType::Expense, 999, d(2024, 3, 1)),
        ];
        let w = window(d(2024, 2, 1), d(2024, 2, 29));
        let summary = financial_summary(&txs, w, None);
        assert_eq!(summary.income, dec(800));
        assert_eq!(summary.expense, dec(500));
    }

    #[test]
    fn summary_rounds_to_cents() {
        // 100 over a 3-day period, 1 day in window: 33.333... -> 33.33.
        let tx = period_tx(EntryType::Expense, 100, d(2024, 2, 1), d(2024, 2, 3));
        let w = window(d(2024, 2, 3), d(2024, 2, 10));
        let summary = financial_summary(&[tx], w, None);
        assert_eq!(summary.expense, Decimal::new(3333, 2));
    }
}
