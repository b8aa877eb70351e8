//! Calendar and contract-period arithmetic.
//!
//! Everything date-shaped lives here: month-clamped additions, contract
//! end-date derivation, contract-period generation, summary-window
//! resolution, and the display filter-mode defaulting. All functions are
//! pure and operate on `NaiveDate` (business dates carry no timezone).

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Start of the "all time" summary window. Predates every real project.
pub const ALL_TIME_EPOCH_YEAR: i32 = 2000;

/// Months per contract year. Contract periods are year-long slices.
pub const MONTHS_PER_PERIOD: u32 = 12;

// ---------------------------------------------------------------------------
// Month arithmetic
// ---------------------------------------------------------------------------

/// Advance a date by whole calendar months, clamping the day to the target
/// month's length (2024-01-31 + 1 month = 2024-02-29).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, CoreError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CoreError::Validation(format!("Date out of range: {date} + {months} months")))
}

/// Contract end date: the start date advanced by the contract duration.
pub fn contract_end_date(start: NaiveDate, duration_months: u32) -> Result<NaiveDate, CoreError> {
    add_months(start, duration_months)
}

/// Annual budget end date: one year after the start, minus one day
/// (2024-03-15 -> 2025-03-14).
pub fn annual_budget_end_date(start: NaiveDate) -> Result<NaiveDate, CoreError> {
    let next_year = add_months(start, MONTHS_PER_PERIOD)?;
    next_year
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| CoreError::Validation(format!("Date out of range: {start}")))
}

/// Number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = first_day_of_month(year, month);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (next - first).num_days() as u32
}

/// First day of a calendar month. `month` must be 1-12.
pub fn first_day_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// Last day of a calendar month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    first_day_of_month(year, month)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

/// Inclusive day count between two dates. `start == end` counts as 1.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// `"YYYY-MM"` key for a date's calendar month. Used for idempotent
/// monthly generation (fund accruals, recurring instances).
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a `"YYYY-MM"` month key into (year, month).
pub fn parse_month_key(key: &str) -> Result<(i32, u32), CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid month key: {key}"));
    let (y, m) = key.split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

// ---------------------------------------------------------------------------
// Interval overlap
// ---------------------------------------------------------------------------

/// Intersection of two inclusive date intervals, or `None` when disjoint.
pub fn overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start <= end).then_some((start, end))
}

// ---------------------------------------------------------------------------
// Summary window
// ---------------------------------------------------------------------------

/// How the caller wants the summary window computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WindowMode {
    /// The calendar month containing `today`.
    CurrentMonth,
    /// An explicit calendar month.
    SelectedMonth { year: i32, month: u32 },
    /// An explicit inclusive date range.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Fixed epoch up to `today`.
    AllTime,
    /// The project's own lifetime.
    Project,
}

/// An inclusive date window for financial aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolve a [`WindowMode`] into concrete bounds.
///
/// `Project` mode runs from the project start to the day before the project
/// end, capped at `today`. A project without a start date falls back to the
/// year preceding `today`.
pub fn resolve_window(
    mode: WindowMode,
    today: NaiveDate,
    project_start: Option<NaiveDate>,
    project_end: Option<NaiveDate>,
) -> Result<Window, CoreError> {
    let window = match mode {
        WindowMode::CurrentMonth => Window {
            start: first_day_of_month(today.year(), today.month()),
            end: last_day_of_month(today.year(), today.month()),
        },
        WindowMode::SelectedMonth { year, month } => {
            if !(1..=12).contains(&month) {
                return Err(CoreError::Validation(format!("Invalid month: {month}")));
            }
            Window {
                start: first_day_of_month(year, month),
                end: last_day_of_month(year, month),
            }
        }
        WindowMode::DateRange { start, end } => {
            if start > end {
                return Err(CoreError::Validation(format!(
                    "Invalid date range: {start} is after {end}"
                )));
            }
            Window { start, end }
        }
        WindowMode::AllTime => Window {
            start: first_day_of_month(ALL_TIME_EPOCH_YEAR, 1),
            end: today,
        },
        WindowMode::Project => {
            let start = match project_start {
                Some(d) => d,
                None => today
                    .checked_sub_months(Months::new(MONTHS_PER_PERIOD))
                    .unwrap_or(NaiveDate::MIN),
            };
            let end = match project_end {
                Some(d) => {
                    let last_covered = d.checked_sub_days(Days::new(1)).unwrap_or(d);
                    last_covered.min(today)
                }
                None => today,
            };
            // An ended contract can leave start > end when the project began
            // after its own end date was passed; collapse to a single day.
            Window {
                start,
                end: end.max(start),
            }
        }
    };
    Ok(window)
}

// ---------------------------------------------------------------------------
// Display filter mode
// ---------------------------------------------------------------------------

/// Default sub-filter applied when a project detail view loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    CurrentMonth,
    WholePeriod,
    Project,
}

/// Pick the default filter mode for a detail view.
///
/// A historical period selection forces whole-period viewing. A contract
/// whose end date already passed the current month defaults to the whole
/// project (the current month would be empty). Otherwise the current month.
pub fn default_filter_mode(
    today: NaiveDate,
    project_end: Option<NaiveDate>,
    historical_period_selected: bool,
) -> FilterMode {
    if historical_period_selected {
        return FilterMode::WholePeriod;
    }
    let current_month_start = first_day_of_month(today.year(), today.month());
    match project_end {
        Some(end) if end < current_month_start => FilterMode::Project,
        _ => FilterMode::CurrentMonth,
    }
}

// ---------------------------------------------------------------------------
// Contract periods
// ---------------------------------------------------------------------------

/// One generated contract period: a year-long slice of the contract.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PeriodSpan {
    pub start_date: NaiveDate,
    /// Inclusive. The next period starts the following day.
    pub end_date: NaiveDate,
    /// Calendar year of the period start.
    pub contract_year: i32,
    /// 1-based position within the contract.
    pub year_index: i32,
}

/// Generate the contiguous contract periods for a contract starting at
/// `start` and running `duration_months` months.
///
/// Periods are year-long; the final period is truncated to the contract end.
/// Period ends are inclusive (the day before the next period's start).
pub fn generate_periods(
    start: NaiveDate,
    duration_months: u32,
) -> Result<Vec<PeriodSpan>, CoreError> {
    if duration_months == 0 {
        return Err(CoreError::Validation(
            "Contract duration must be at least one month".into(),
        ));
    }
    let contract_end = contract_end_date(start, duration_months)?;
    let last_covered = contract_end
        .checked_sub_days(Days::new(1))
        .unwrap_or(contract_end);

    let mut periods = Vec::new();
    let mut period_start = start;
    let mut index = 1;
    while period_start <= last_covered {
        let next_start = add_months(period_start, MONTHS_PER_PERIOD)?;
        let period_end = next_start
            .checked_sub_days(Days::new(1))
            .unwrap_or(next_start)
            .min(last_covered);
        periods.push(PeriodSpan {
            start_date: period_start,
            end_date: period_end,
            contract_year: period_start.year(),
            year_index: index,
        });
        period_start = next_start;
        index += 1;
    }
    Ok(periods)
}

/// The current period: the one with the latest start date not after `today`.
pub fn current_period(periods: &[PeriodSpan], today: NaiveDate) -> Option<&PeriodSpan> {
    periods
        .iter()
        .filter(|p| p.start_date <= today)
        .max_by_key(|p| p.start_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // -- add_months / contract_end_date --

    #[test]
    fn add_months_plain() {
        assert_eq!(add_months(d(2024, 3, 15), 2).unwrap(), d(2024, 5, 15));
    }

    #[test]
    fn add_months_clamps_to_leap_february() {
        // Month rollover correctness, not naive day-addition.
        assert_eq!(contract_end_date(d(2024, 1, 31), 1).unwrap(), d(2024, 2, 29));
    }

    #[test]
    fn add_months_clamps_to_short_month() {
        assert_eq!(add_months(d(2023, 1, 31), 1).unwrap(), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 3, 31), 1).unwrap(), d(2024, 4, 30));
    }

    #[test]
    fn contract_end_date_year_boundary() {
        assert_eq!(contract_end_date(d(2024, 11, 1), 3).unwrap(), d(2025, 2, 1));
    }

    // -- annual_budget_end_date --

    #[test]
    fn annual_budget_end_is_one_year_minus_a_day() {
        assert_eq!(annual_budget_end_date(d(2024, 3, 15)).unwrap(), d(2025, 3, 14));
    }

    #[test]
    fn annual_budget_end_from_jan_first() {
        assert_eq!(annual_budget_end_date(d(2024, 1, 1)).unwrap(), d(2024, 12, 31));
    }

    // -- days_in_month / days_inclusive --

    #[test]
    fn february_leap_year_has_29_days() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
    }

    #[test]
    fn days_inclusive_same_day_is_one() {
        assert_eq!(days_inclusive(d(2024, 1, 1), d(2024, 1, 1)), 1);
    }

    #[test]
    fn days_inclusive_quarter() {
        // 2024-01-01 .. 2024-03-31 spans 91 days (leap February).
        assert_eq!(days_inclusive(d(2024, 1, 1), d(2024, 3, 31)), 91);
    }

    // -- month_key --

    #[test]
    fn month_key_zero_pads() {
        assert_eq!(month_key(d(2024, 3, 7)), "2024-03");
    }

    #[test]
    fn parse_month_key_round_trips() {
        assert_eq!(parse_month_key("2024-03").unwrap(), (2024, 3));
    }

    #[test]
    fn parse_month_key_rejects_bad_month() {
        assert!(parse_month_key("2024-13").is_err());
        assert!(parse_month_key("garbage").is_err());
    }

    // -- overlap --

    #[test]
    fn overlap_partial() {
        let got = overlap(d(2024, 1, 1), d(2024, 3, 31), d(2024, 2, 1), d(2024, 2, 29));
        assert_eq!(got, Some((d(2024, 2, 1), d(2024, 2, 29))));
    }

    #[test]
    fn overlap_disjoint_is_none() {
        assert_eq!(
            overlap(d(2024, 1, 1), d(2024, 1, 31), d(2024, 2, 1), d(2024, 2, 29)),
            None
        );
    }

    #[test]
    fn overlap_single_shared_day() {
        let got = overlap(d(2024, 1, 1), d(2024, 2, 1), d(2024, 2, 1), d(2024, 3, 1));
        assert_eq!(got, Some((d(2024, 2, 1), d(2024, 2, 1))));
    }

    // -- resolve_window --

    #[test]
    fn window_current_month() {
        let w = resolve_window(WindowMode::CurrentMonth, d(2024, 2, 15), None, None).unwrap();
        assert_eq!(w.start, d(2024, 2, 1));
        assert_eq!(w.end, d(2024, 2, 29));
    }

    #[test]
    fn window_selected_month() {
        let mode = WindowMode::SelectedMonth { year: 2023, month: 11 };
        let w = resolve_window(mode, d(2024, 2, 15), None, None).unwrap();
        assert_eq!(w.start, d(2023, 11, 1));
        assert_eq!(w.end, d(2023, 11, 30));
    }

    #[test]
    fn window_selected_month_rejects_invalid() {
        let mode = WindowMode::SelectedMonth { year: 2023, month: 0 };
        assert!(resolve_window(mode, d(2024, 2, 15), None, None).is_err());
    }

    #[test]
    fn window_date_range_rejects_inverted() {
        let mode = WindowMode::DateRange {
            start: d(2024, 3, 1),
            end: d(2024, 2, 1),
        };
        assert!(resolve_window(mode, d(2024, 2, 15), None, None).is_err());
    }

    #[test]
    fn window_all_time_starts_at_epoch() {
        let w = resolve_window(WindowMode::AllTime, d(2024, 2, 15), None, None).unwrap();
        assert_eq!(w.start, d(2000, 1, 1));
        assert_eq!(w.end, d(2024, 2, 15));
    }

    #[test]
    fn window_project_ends_day_before_project_end() {
        let w = resolve_window(
            WindowMode::Project,
            d(2026, 6, 1),
            Some(d(2024, 1, 1)),
            Some(d(2025, 1, 1)),
        )
        .unwrap();
        assert_eq!(w.start, d(2024, 1, 1));
        assert_eq!(w.end, d(2024, 12, 31));
    }

    #[test]
    fn window_project_caps_at_today_for_live_contracts() {
        let w = resolve_window(
            WindowMode::Project,
            d(2024, 6, 1),
            Some(d(2024, 1, 1)),
            Some(d(2026, 1, 1)),
        )
        .unwrap();
        assert_eq!(w.end, d(2024, 6, 1));
    }

    #[test]
    fn window_project_without_start_falls_back_one_year() {
        let w = resolve_window(WindowMode::Project, d(2024, 6, 1), None, None).unwrap();
        assert_eq!(w.start, d(2023, 6, 1));
        assert_eq!(w.end, d(2024, 6, 1));
    }

    // -- default_filter_mode --

    #[test]
    fn historical_period_forces_whole_period() {
        assert_eq!(
            default_filter_mode(d(2024, 6, 15), Some(d(2026, 1, 1)), true),
            FilterMode::WholePeriod
        );
    }

    #[test]
    fn ended_contract_defaults_to_project() {
        // Contract ended in March; viewing in June shows the whole project.
        assert_eq!(
            default_filter_mode(d(2024, 6, 15), Some(d(2024, 3, 1)), false),
            FilterMode::Project
        );
    }

    #[test]
    fn live_contract_defaults_to_current_month() {
        assert_eq!(
            default_filter_mode(d(2024, 6, 15), Some(d(2025, 3, 1)), false),
            FilterMode::CurrentMonth
        );
    }

    #[test]
    fn contract_ending_this_month_stays_on_current_month() {
        assert_eq!(
            default_filter_mode(d(2024, 6, 15), Some(d(2024, 6, 20)), false),
            FilterMode::CurrentMonth
        );
    }

    // -- generate_periods / current_period --

    #[test]
    fn periods_for_two_year_contract() {
        let periods = generate_periods(d(2024, 1, 1), 24).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start_date, d(2024, 1, 1));
        assert_eq!(periods[0].end_date, d(2024, 12, 31));
        assert_eq!(periods[0].year_index, 1);
        assert_eq!(periods[1].start_date, d(2025, 1, 1));
        assert_eq!(periods[1].end_date, d(2025, 12, 31));
        assert_eq!(periods[1].year_index, 2);
    }

    #[test]
    fn periods_are_contiguous() {
        let periods = generate_periods(d(2024, 3, 15), 36).unwrap();
        for pair in periods.windows(2) {
            assert_eq!(
                pair[0].end_date.checked_add_days(Days::new(1)).unwrap(),
                pair[1].start_date
            );
        }
    }

    #[test]
    fn short_final_period_is_truncated() {
        // 18 months: one full year plus a 6-month tail.
        let periods = generate_periods(d(2024, 1, 1), 18).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].start_date, d(2025, 1, 1));
        assert_eq!(periods[1].end_date, d(2025, 6, 30));
    }

    #[test]
    fn sub_year_contract_is_a_single_period() {
        let periods = generate_periods(d(2024, 1, 1), 6).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].end_date, d(2024, 6, 30));
    }

    #[test]
    fn zero_duration_rejected() {
        assert!(generate_periods(d(2024, 1, 1), 0).is_err());
    }

    #[test]
    fn contract_year_tracks_period_start() {
        let periods = generate_periods(d(2024, 7, 1), 24).unwrap();
        assert_eq!(periods[0].contract_year, 2024);
        assert_eq!(periods[1].contract_year, 2025);
    }

    #[test]
    fn current_period_is_latest_started() {
        let periods = generate_periods(d(2024, 1, 1), 36).unwrap();
        let current = current_period(&periods, d(2025, 6, 1)).unwrap();
        assert_eq!(current.year_index, 2);
    }

    #[test]
    fn current_period_none_before_contract() {
        let periods = generate_periods(d(2024, 1, 1), 12).unwrap();
        assert!(current_period(&periods, d(2023, 12, 31)).is_none());
    }

    #[test]
    fn current_period_after_contract_is_last() {
        // A finished contract still reports its final period as current.
        let periods = generate_periods(d(2024, 1, 1), 12).unwrap();
        let current = current_period(&periods, d(2030, 1, 1)).unwrap();
        assert_eq!(current.year_index, 1);
    }
}
