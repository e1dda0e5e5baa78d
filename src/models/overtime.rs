//! Overtime models.
//!
//! [`OvertimeWeek`] rows are imported once and never mutated. Summaries and
//! report rows are derived from them on demand.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Crew, ensure_monday};
use crate::error::{RosterError, RosterResult};

/// Hours recorded for one employee in one Monday-based week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeWeek {
    /// The employee.
    pub employee_id: String,
    /// Monday starting the week.
    pub week_start: NaiveDate,
    /// Regular hours worked.
    pub regular_hours: Decimal,
    /// Overtime hours worked.
    pub overtime_hours: Decimal,
}

impl OvertimeWeek {
    /// Checks the row is well formed: a Monday week start and no negative hours.
    pub fn validate(&self) -> RosterResult<()> {
        ensure_monday(self.week_start)?;
        if self.regular_hours.is_sign_negative() {
            return Err(RosterError::validation(
                "regular_hours",
                format!("negative hours for {} in week {}", self.employee_id, self.week_start),
            ));
        }
        if self.overtime_hours.is_sign_negative() {
            return Err(RosterError::validation(
                "overtime_hours",
                format!("negative hours for {} in week {}", self.employee_id, self.week_start),
            ));
        }
        Ok(())
    }

    /// Regular plus overtime hours.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours
    }
}

/// Direction of overtime across the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Recent weeks average noticeably less overtime.
    Decreasing,
    /// No meaningful change.
    Stable,
    /// Recent weeks average noticeably more overtime.
    Increasing,
}

/// High-overtime check for the as-of week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeAlert {
    /// True when overtime reached the ceiling or total hours reached the limit.
    pub flagged: bool,
    /// Regular plus overtime hours for the week.
    pub total_hours: Decimal,
    /// Hours left before the hard weekly limit (zero once reached).
    pub hours_to_limit: Decimal,
    /// True once total hours reached the hard weekly limit.
    pub exceeds_limit: bool,
}

/// Rolling-window overtime summary for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSummary {
    /// The employee.
    pub employee_id: String,
    /// The week the window ends at.
    pub as_of_week: NaiveDate,
    /// Overtime for the as-of week, absent if no row was imported for it.
    pub current_week_overtime: Option<Decimal>,
    /// Sum of overtime across the window.
    pub last_13_weeks_total: Decimal,
    /// Total divided by the number of rows used.
    pub weekly_average: Decimal,
    /// Trend across the window.
    pub trend: Trend,
    /// Rows used (at most 13).
    pub weeks_used: u32,
    /// True when fewer than 13 rows were available.
    pub partial_data: bool,
    /// Mondays without a row between the oldest and newest row used.
    pub missing_weeks: u32,
    /// Present when the as-of week has a row.
    pub alert: Option<OvertimeAlert>,
}

/// One row of the overtime report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOvertimeRow {
    /// The employee.
    pub employee_id: String,
    /// Display name.
    pub name: String,
    /// Crew.
    pub crew: Crew,
    /// Position.
    pub position: String,
    /// The rolling summary.
    pub summary: OvertimeSummary,
}

/// Aggregates over every row that passed the report filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeTotals {
    /// Sum of 13-week totals.
    pub total_overtime_hours: Decimal,
    /// Employees with any overtime in their window.
    pub employees_with_overtime: u32,
    /// Total divided by the number of employees considered.
    pub avg_overtime: Decimal,
    /// Employees whose as-of week is flagged.
    pub high_overtime_count: u32,
}

/// A page of the overtime report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeReport {
    /// Rows on this page.
    pub rows: Vec<EmployeeOvertimeRow>,
    /// Aggregates across all filtered rows.
    pub totals: OvertimeTotals,
    /// The page returned (1-based).
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
    /// Rows across all pages.
    pub total_rows: u32,
    /// Number of pages.
    pub total_pages: u32,
}
