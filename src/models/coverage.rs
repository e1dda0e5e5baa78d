//! Coverage result models.
//!
//! These are derived, never persisted: every coverage query recomputes them
//! from the current schedule, absence, and requirement data.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Crew, ShiftLabel};

/// Staffing for one (date, shift, position), optionally for one crew.
///
/// `available` is `on_roster - absent` floored at zero and `gap` is
/// `required - available` floored at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageResult {
    /// The date evaluated.
    pub date: NaiveDate,
    /// The shift evaluated.
    pub shift: ShiftLabel,
    /// The position evaluated.
    pub position: String,
    /// The crew evaluated, or `None` for a shift-wide total.
    pub crew: Option<Crew>,
    /// Crews whose staff were counted.
    pub crews_on_duty: Vec<Crew>,
    /// Minimum staff required.
    pub required: u32,
    /// Staff scheduled for the slot.
    pub on_roster: u32,
    /// Scheduled staff on approved absence.
    pub absent: u32,
    /// Scheduled staff actually available.
    pub available: u32,
    /// Shortfall against the requirement.
    pub gap: u32,
}

impl CoverageResult {
    /// Builds a row from raw counts, applying both floors.
    #[allow(clippy::too_many_arguments)]
    pub fn from_counts(
        date: NaiveDate,
        shift: ShiftLabel,
        position: impl Into<String>,
        crew: Option<Crew>,
        crews_on_duty: Vec<Crew>,
        required: u32,
        on_roster: u32,
        absent: u32,
    ) -> Self {
        let available = on_roster.saturating_sub(absent);
        let gap = required.saturating_sub(available);
        Self {
            date,
            shift,
            position: position.into(),
            crew,
            crews_on_duty,
            required,
            on_roster,
            absent,
            available,
            gap,
        }
    }

    /// Returns true when the gap reaches the critical threshold.
    pub fn is_critical(&self, threshold: u32) -> bool {
        self.gap > 0 && self.gap >= threshold
    }
}

/// All positions a crew is evaluated for on one on-duty shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewCoverage {
    /// The crew.
    pub crew: Crew,
    /// The date.
    pub date: NaiveDate,
    /// The crew's on-duty shift that date.
    pub shift: ShiftLabel,
    /// One row per required position.
    pub positions: Vec<CoverageResult>,
    /// Sum of required staff across positions.
    pub total_required: u32,
    /// Sum of available staff across positions.
    pub total_available: u32,
    /// Sum of gaps across positions.
    pub total_gap: u32,
}

/// Headline counts for a coverage query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Rows with a non-zero gap.
    pub total_gaps: u32,
    /// Sum of all gaps, in staff.
    pub total_shortfall: u32,
    /// Rows whose gap reaches the critical threshold.
    pub critical_gaps: u32,
    /// Approved absences covering the reference date.
    pub total_absences_today: u32,
    /// Distinct crews with at least one gap.
    pub crews_affected: u32,
}

/// Approved absences on one upcoming date, counted by crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAbsences {
    /// The date.
    pub date: NaiveDate,
    /// Absent employees per crew.
    pub by_crew: BTreeMap<Crew, u32>,
    /// Absent employees across all crews.
    pub total: u32,
}

/// The complete answer to a coverage query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// The reference date the query was evaluated against.
    pub today: NaiveDate,
    /// One row per evaluated (date, shift, position[, crew]).
    pub results: Vec<CoverageResult>,
    /// Rows grouped under each crew's on-duty shift.
    pub by_crew: Vec<CrewCoverage>,
    /// Headline counts.
    pub summary: CoverageSummary,
    /// Approved absences over the lookahead window.
    pub upcoming_absences: Vec<DailyAbsences>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_from_counts_computes_gap() {
        let row = CoverageResult::from_counts(
            date(),
            ShiftLabel::Day,
            "operator",
            Some(Crew::new("A")),
            vec![Crew::new("A")],
            3,
            4,
            2,
        );
        assert_eq!(row.available, 2);
        assert_eq!(row.gap, 1);
        assert!(!row.is_critical(2));
    }

    #[test]
    fn test_from_counts_floors_inconsistent_absence() {
        let row = CoverageResult::from_counts(
            date(),
            ShiftLabel::Night,
            "lead",
            None,
            vec![],
            1,
            1,
            3,
        );
        assert_eq!(row.available, 0);
        assert_eq!(row.gap, 1);
    }

    #[test]
    fn test_surplus_is_not_negative_gap() {
        let row = CoverageResult::from_counts(
            date(),
            ShiftLabel::Day,
            "operator",
            None,
            vec![],
            2,
            5,
            0,
        );
        assert_eq!(row.gap, 0);
    }

    #[test]
    fn test_zero_gap_is_never_critical() {
        let row = CoverageResult::from_counts(
            date(),
            ShiftLabel::Day,
            "operator",
            None,
            vec![],
            2,
            2,
            0,
        );
        assert!(!row.is_critical(0));
    }
}
