//! Staffing requirements and absence records.
//!
//! Both are supplied by external collaborators and are read-only to the
//! coverage engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Crew, DateRange, ShiftLabel};

/// Which crews a staffing requirement applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewScope {
    /// Applies to whichever crews are on duty for the shift.
    #[default]
    AllCrews,
    /// Applies only when the named crew is on duty.
    Crew(Crew),
}

/// Minimum staffing for a position on a shift.
///
/// # Example
///
/// ```
/// use crew_roster::models::{CrewScope, ShiftLabel, StaffingRequirement};
///
/// let requirement = StaffingRequirement {
///     position: "operator".to_string(),
///     shift: ShiftLabel::Day,
///     scope: CrewScope::AllCrews,
///     minimum: 3,
/// };
/// assert_eq!(requirement.minimum, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    /// The position to staff.
    pub position: String,
    /// The shift the requirement applies to.
    pub shift: ShiftLabel,
    /// The crews the requirement applies to.
    #[serde(default)]
    pub scope: CrewScope,
    /// Minimum number of available staff.
    pub minimum: u32,
}

/// The kind of leave an absence represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid vacation.
    Vacation,
    /// Sick leave.
    Sick,
    /// Personal leave.
    Personal,
    /// Off-site training.
    Training,
    /// Any other leave.
    Other,
}

/// Approval state of an absence request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; the employee is unavailable.
    Approved,
    /// Denied; the employee is expected at work.
    Denied,
}

/// An employee's absence over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// The absent employee.
    pub employee_id: String,
    /// First day of absence (inclusive).
    pub start_date: NaiveDate,
    /// Last day of absence (inclusive).
    pub end_date: NaiveDate,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// Approval state.
    pub status: AbsenceStatus,
}

impl AbsenceRecord {
    /// Returns true if this is an approved absence that covers `date`.
    ///
    /// Pending and denied records never reduce availability.
    pub fn removes_availability_on(&self, date: NaiveDate) -> bool {
        self.status == AbsenceStatus::Approved && date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this approved absence touches any date of `range`.
    pub fn approved_within(&self, range: &DateRange) -> bool {
        self.status == AbsenceStatus::Approved
            && DateRange {
                start: self.start_date,
                end: self.end_date,
            }
            .overlaps(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn absence(status: AbsenceStatus) -> AbsenceRecord {
        AbsenceRecord {
            employee_id: "emp_001".to_string(),
            start_date: date(3),
            end_date: date(5),
            leave_type: LeaveType::Vacation,
            status,
        }
    }

    #[test]
    fn test_approved_absence_covers_inclusive_range() {
        let record = absence(AbsenceStatus::Approved);
        assert!(!record.removes_availability_on(date(2)));
        assert!(record.removes_availability_on(date(3)));
        assert!(record.removes_availability_on(date(5)));
        assert!(!record.removes_availability_on(date(6)));
    }

    #[test]
    fn test_pending_and_denied_absences_are_ignored() {
        assert!(!absence(AbsenceStatus::Pending).removes_availability_on(date(4)));
        assert!(!absence(AbsenceStatus::Denied).removes_availability_on(date(4)));
    }

    #[test]
    fn test_requirement_scope_defaults_to_all_crews() {
        let json = r#"{"position": "operator", "shift": "day", "minimum": 3}"#;
        let requirement: StaffingRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(requirement.scope, CrewScope::AllCrews);
    }

    #[test]
    fn test_crew_scoped_requirement_deserializes() {
        let json =
            r#"{"position": "lead", "shift": "night", "scope": {"crew": "C"}, "minimum": 1}"#;
        let requirement: StaffingRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(requirement.scope, CrewScope::Crew(Crew::new("C")));
    }

    #[test]
    fn test_approved_within_range() {
        let record = absence(AbsenceStatus::Approved);
        let range = DateRange::new(date(5), date(9)).unwrap();
        assert!(record.approved_within(&range));
        let later = DateRange::new(date(6), date(9)).unwrap();
        assert!(!record.approved_within(&later));
    }
}
