//! Inclusive date ranges and week helpers.
//!
//! This module contains the [`DateRange`] type used to bound rotation and
//! coverage queries, plus helpers for Monday-based overtime weeks.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RosterResult};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use crew_roster::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(range.days().count(), 3);
/// assert!(range.contains_date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date of the range (inclusive).
    pub start: NaiveDate,
    /// The last date of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end date before the start date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> RosterResult<Self> {
        if end < start {
            return Err(RosterError::validation(
                "date_range",
                format!("end date {} is before start date {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// A range covering `days` consecutive dates starting at `start`.
    pub fn starting_at(start: NaiveDate, days: u32) -> RosterResult<Self> {
        if days == 0 {
            return Err(RosterError::validation("days", "must be at least 1"));
        }
        let end = start
            .checked_add_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| RosterError::validation("days", "range leaves the calendar"))?;
        Self::new(start, end)
    }

    /// Checks if a given date falls within this range (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true when the two ranges share at least one date.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of dates in the range.
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Iterates the dates of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Returns the Monday that starts the week containing `date`.
///
/// ```
/// use crew_roster::models::week_start_of;
/// use chrono::NaiveDate;
///
/// let thursday = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
/// assert_eq!(week_start_of(thursday), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
/// ```
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Fails with [`RosterError::NotAMonday`] unless `date` is a Monday.
pub fn ensure_monday(date: NaiveDate) -> RosterResult<()> {
    if date.weekday() == Weekday::Mon {
        Ok(())
    } else {
        Err(RosterError::NotAMonday { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = DateRange::new(date(2025, 1, 5), date(2025, 1, 4)).unwrap_err();
        assert!(matches!(err, RosterError::Validation { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2025, 1, 5), date(2025, 1, 5)).unwrap();
        assert_eq!(range.len_days(), 1);
        assert_eq!(range.days().collect::<Vec<_>>(), vec![date(2025, 1, 5)]);
    }

    #[test]
    fn test_days_cross_month_boundary() {
        let range = DateRange::new(date(2025, 1, 30), date(2025, 2, 2)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date(2025, 1, 30),
                date(2025, 1, 31),
                date(2025, 2, 1),
                date(2025, 2, 2)
            ]
        );
    }

    #[test]
    fn test_starting_at_covers_requested_days() {
        let range = DateRange::starting_at(date(2025, 3, 1), 7).unwrap();
        assert_eq!(range.end, date(2025, 3, 7));
        assert!(DateRange::starting_at(date(2025, 3, 1), 0).is_err());
    }

    #[test]
    fn test_overlaps() {
        let a = DateRange::new(date(2025, 3, 1), date(2025, 3, 5)).unwrap();
        let b = DateRange::new(date(2025, 3, 5), date(2025, 3, 9)).unwrap();
        let c = DateRange::new(date(2025, 3, 6), date(2025, 3, 9)).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_week_start_of_monday_is_itself() {
        assert_eq!(week_start_of(date(2025, 3, 3)), date(2025, 3, 3));
        assert_eq!(week_start_of(date(2025, 3, 9)), date(2025, 3, 3));
    }

    #[test]
    fn test_ensure_monday() {
        assert!(ensure_monday(date(2025, 3, 3)).is_ok());
        assert!(matches!(
            ensure_monday(date(2025, 3, 4)),
            Err(RosterError::NotAMonday { .. })
        ));
    }
}
