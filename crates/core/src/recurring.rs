//! Recurring-transaction occurrence schedule.
//!
//! A template generates one transaction per calendar month on a configured
//! day, clamped to the month's length (a template on the 31st fires on
//! Feb 29 in leap years). Generation is idempotent: callers pass the last
//! generated occurrence and only later occurrences are returned.

use chrono::{Datelike, NaiveDate};

use crate::error::CoreError;
use crate::period::{add_months, days_in_month, first_day_of_month};

/// When a template stops generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum EndCondition {
    /// Generates indefinitely.
    NoEnd,
    /// Stops after N occurrences, counted from the first.
    AfterOccurrences(u32),
    /// Stops after the given date.
    OnDate(NaiveDate),
}

/// Validate a configured day-of-month. 1-31; clamping handles short months.
pub fn validate_day_of_month(day: u32) -> Result<(), CoreError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Day of month must be 1-31, got {day}"
        )))
    }
}

/// The occurrence date in a given month: the configured day, clamped to the
/// month's last day.
pub fn occurrence_in_month(year: i32, month: u32, day_of_month: u32) -> NaiveDate {
    let day = day_of_month.min(days_in_month(year, month));
    first_day_of_month(year, month)
        .with_day(day)
        .unwrap_or_else(|| first_day_of_month(year, month))
}

/// All occurrences due up to and including `up_to`.
///
/// `start` anchors the schedule: the first occurrence is the earliest
/// clamped-day date on or after it. Occurrences at or before
/// `last_generated` are skipped (idempotent catch-up). The end condition
/// counts occurrences from the schedule start, not from `last_generated`.
pub fn due_occurrences(
    start: NaiveDate,
    day_of_month: u32,
    end: &EndCondition,
    last_generated: Option<NaiveDate>,
    up_to: NaiveDate,
) -> Result<Vec<NaiveDate>, CoreError> {
    validate_day_of_month(day_of_month)?;

    let mut due = Vec::new();
    let mut month_cursor = first_day_of_month(start.year(), start.month());
    let mut occurrence_index: u32 = 0;

    loop {
        let occurrence = occurrence_in_month(month_cursor.year(), month_cursor.month(), day_of_month);
        if occurrence >= start {
            if occurrence > up_to {
                break;
            }
            match end {
                EndCondition::NoEnd => {}
                EndCondition::AfterOccurrences(n) => {
                    if occurrence_index >= *n {
                        break;
                    }
                }
                EndCondition::OnDate(d) => {
                    if occurrence > *d {
                        break;
                    }
                }
            }
            occurrence_index += 1;
            if last_generated.is_none_or(|last| occurrence > last) {
                due.push(occurrence);
            }
        } else if occurrence > up_to {
            break;
        }
        month_cursor = add_months(month_cursor, 1)?;
    }

    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // -- occurrence_in_month clamping --

    #[test]
    fn day_31_clamps_to_leap_february() {
        assert_eq!(occurrence_in_month(2024, 2, 31), d(2024, 2, 29));
    }

    #[test]
    fn day_31_clamps_to_plain_february() {
        assert_eq!(occurrence_in_month(2023, 2, 31), d(2023, 2, 28));
    }

    #[test]
    fn day_30_clamps_only_in_february() {
        assert_eq!(occurrence_in_month(2024, 4, 30), d(2024, 4, 30));
        assert_eq!(occurrence_in_month(2024, 2, 30), d(2024, 2, 29));
    }

    #[test]
    fn day_within_month_is_unchanged() {
        assert_eq!(occurrence_in_month(2024, 2, 15), d(2024, 2, 15));
    }

    // -- validate_day_of_month --

    #[test]
    fn day_zero_rejected() {
        assert!(validate_day_of_month(0).is_err());
    }

    #[test]
    fn day_32_rejected() {
        assert!(validate_day_of_month(32).is_err());
    }

    #[test]
    fn days_1_and_31_accepted() {
        assert!(validate_day_of_month(1).is_ok());
        assert!(validate_day_of_month(31).is_ok());
    }

    // -- due_occurrences --

    #[test]
    fn generates_each_month_from_start() {
        let due = due_occurrences(d(2024, 1, 1), 10, &EndCondition::NoEnd, None, d(2024, 3, 31))
            .unwrap();
        assert_eq!(due, vec![d(2024, 1, 10), d(2024, 2, 10), d(2024, 3, 10)]);
    }

    #[test]
    fn first_occurrence_respects_start_day() {
        // Template starts mid-month after its configured day: the first
        // occurrence is next month.
        let due = due_occurrences(d(2024, 1, 15), 10, &EndCondition::NoEnd, None, d(2024, 3, 31))
            .unwrap();
        assert_eq!(due, vec![d(2024, 2, 10), d(2024, 3, 10)]);
    }

    #[test]
    fn skips_already_generated_occurrences() {
        let due = due_occurrences(
            d(2024, 1, 1),
            10,
            &EndCondition::NoEnd,
            Some(d(2024, 2, 10)),
            d(2024, 4, 30),
        )
        .unwrap();
        assert_eq!(due, vec![d(2024, 3, 10), d(2024, 4, 10)]);
    }

    #[test]
    fn rerun_generates_nothing_new() {
        let due = due_occurrences(
            d(2024, 1, 1),
            10,
            &EndCondition::NoEnd,
            Some(d(2024, 3, 10)),
            d(2024, 3, 31),
        )
        .unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn after_occurrences_stops_at_count() {
        let due = due_occurrences(
            d(2024, 1, 1),
            5,
            &EndCondition::AfterOccurrences(2),
            None,
            d(2024, 12, 31),
        )
        .unwrap();
        assert_eq!(due, vec![d(2024, 1, 5), d(2024, 2, 5)]);
    }

    #[test]
    fn after_occurrences_counts_from_schedule_start() {
        // Two of three occurrences already generated: only one remains.
        let due = due_occurrences(
            d(2024, 1, 1),
            5,
            &EndCondition::AfterOccurrences(3),
            Some(d(2024, 2, 5)),
            d(2024, 12, 31),
        )
        .unwrap();
        assert_eq!(due, vec![d(2024, 3, 5)]);
    }

    #[test]
    fn on_date_stops_after_date() {
        let due = due_occurrences(
            d(2024, 1, 1),
            20,
            &EndCondition::OnDate(d(2024, 2, 29)),
            None,
            d(2024, 12, 31),
        )
        .unwrap();
        assert_eq!(due, vec![d(2024, 1, 20), d(2024, 2, 20)]);
    }

    #[test]
    fn clamped_occurrences_in_catch_up() {
        // A template on the 31st crossing February.
        let due = due_occurrences(d(2024, 1, 1), 31, &EndCondition::NoEnd, None, d(2024, 4, 30))
            .unwrap();
        assert_eq!(
            due,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );
    }

    #[test]
    fn nothing_due_before_first_occurrence() {
        let due = due_occurrences(d(2024, 5, 1), 10, &EndCondition::NoEnd, None, d(2024, 4, 30))
            .unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn invalid_day_of_month_rejected() {
        assert!(due_occurrences(d(2024, 1, 1), 0, &EndCondition::NoEnd, None, d(2024, 3, 31))
            .is_err());
    }
}
