//! Rolling 13-week overtime summary.
//!
//! A summary is derived from the most recent imported weeks at or before
//! the as-of week. Fewer than 13 rows is reported as partial data, never
//! padded with zeros.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::OvertimeSettings;
use crate::error::RosterResult;
use crate::models::{OvertimeAlert, OvertimeSummary, OvertimeWeek, Trend, ensure_monday};

/// Number of weekly rows in a complete rolling window.
pub const ROLLING_WINDOW_WEEKS: usize = 13;

/// Relative change between the two halves of the window that counts as a
/// trend (10%).
pub const TREND_THRESHOLD: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Summarizes `employee_id`'s overtime for the window ending at
/// `as_of_week`.
///
/// Rows for other employees or later weeks are ignored, so `rows` may be a
/// superset.
///
/// # Errors
///
/// Returns [`crate::error::RosterError::NotAMonday`] if `as_of_week` is not
/// a Monday.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use crew_roster::config::OvertimeSettings;
/// use crew_roster::models::{OvertimeWeek, Trend};
/// use crew_roster::overtime::summarize;
/// use rust_decimal::Decimal;
///
/// let week = |d: u32, ot: i64| OvertimeWeek {
///     employee_id: "emp_001".to_string(),
///     week_start: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
///     regular_hours: Decimal::from(40),
///     overtime_hours: Decimal::from(ot),
/// };
/// let rows = vec![week(3, 4), week(10, 6), week(17, 8), week(24, 10), week(31, 12)];
/// let as_of = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
///
/// let summary = summarize(&rows, "emp_001", as_of, &OvertimeSettings::default()).unwrap();
/// assert!(summary.partial_data);
/// assert_eq!(summary.weeks_used, 5);
/// assert_eq!(summary.last_13_weeks_total, Decimal::from(40));
/// assert_eq!(summary.weekly_average, Decimal::from(8));
/// assert_eq!(summary.trend, Trend::Increasing);
/// ```
pub fn summarize(
    rows: &[OvertimeWeek],
    employee_id: &str,
    as_of_week: NaiveDate,
    settings: &OvertimeSettings,
) -> RosterResult<OvertimeSummary> {
    ensure_monday(as_of_week)?;

    let mut window: Vec<&OvertimeWeek> = rows
        .iter()
        .filter(|r| r.employee_id == employee_id && r.week_start <= as_of_week)
        .collect();
    window.sort_by(|a, b| b.week_start.cmp(&a.week_start));
    window.dedup_by_key(|r| r.week_start);
    window.truncate(ROLLING_WINDOW_WEEKS);

    let hours: Vec<Decimal> = window.iter().map(|r| r.overtime_hours).collect();
    let total: Decimal = hours.iter().sum();
    let weeks_used = window.len();
    let current = window.first().filter(|r| r.week_start == as_of_week);

    Ok(OvertimeSummary {
        employee_id: employee_id.to_string(),
        as_of_week,
        current_week_overtime: current.map(|r| r.overtime_hours),
        last_13_weeks_total: total,
        weekly_average: average(&hours).round_dp(2),
        trend: classify_trend(&hours),
        weeks_used: weeks_used as u32,
        partial_data: weeks_used < ROLLING_WINDOW_WEEKS,
        missing_weeks: missing_weeks(&window),
        alert: current.map(|r| check_alert(r, settings)),
    })
}

/// Classifies overtime hours ordered newest first.
///
/// The window is split by count; with an odd count the extra row belongs to
/// the recent half. Fewer than two rows is always [`Trend::Stable`].
///
/// ```
/// use crew_roster::models::Trend;
/// use crew_roster::overtime::classify_trend;
/// use rust_decimal::Decimal;
///
/// let newest_first = [Decimal::from(10), Decimal::from(12)];
/// assert_eq!(classify_trend(&newest_first), Trend::Decreasing);
/// ```
pub fn classify_trend(newest_first: &[Decimal]) -> Trend {
    if newest_first.len() < 2 {
        return Trend::Stable;
    }
    let recent_len = newest_first.len().div_ceil(2);
    let (recent, earlier) = newest_first.split_at(recent_len);
    let recent = average(recent);
    let earlier = average(earlier);

    if earlier.is_zero() {
        return if recent > Decimal::ZERO {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }
    let change = (recent - earlier) / earlier;
    if change > TREND_THRESHOLD {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// High-overtime check for one week.
pub fn check_alert(week: &OvertimeWeek, settings: &OvertimeSettings) -> OvertimeAlert {
    let total_hours = week.total_hours();
    let exceeds_limit = total_hours >= settings.hard_weekly_limit;
    OvertimeAlert {
        flagged: week.overtime_hours >= settings.weekly_ceiling || exceeds_limit,
        total_hours,
        hours_to_limit: (settings.hard_weekly_limit - total_hours).max(Decimal::ZERO),
        exceeds_limit,
    }
}

fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Mondays without a row between the oldest and newest row of the window.
fn missing_weeks(newest_first: &[&OvertimeWeek]) -> u32 {
    match (newest_first.first(), newest_first.last()) {
        (Some(newest), Some(oldest)) => {
            let span = (newest.week_start - oldest.week_start).num_weeks() + 1;
            (span - newest_first.len() as i64).max(0) as u32
        }
        _ => 0,
    }
}
