//! Rotation assignments and schedule entries.
//!
//! An [`Assignment`] is the crew-level output of the rotation engine; a
//! [`ScheduleEntry`] is a persisted, employee-level row derived from it or
//! entered manually.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Crew, ShiftLabel};

/// One (crew, date) cell of a generated rotation table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// The crew.
    pub crew: Crew,
    /// The calendar date.
    pub date: NaiveDate,
    /// The shift the crew works on that date.
    pub shift: ShiftLabel,
}

/// Lifecycle state of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// The employee is expected to work the shift.
    #[default]
    Active,
    /// The entry was given away or withdrawn; it no longer counts.
    Cancelled,
}

/// An employee's assignment to a shift on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The employee working the shift.
    pub employee_id: String,
    /// The date of the shift.
    pub date: NaiveDate,
    /// The shift worked.
    pub shift: ShiftLabel,
    /// The position staffed.
    pub position: String,
    /// The crew the shift belongs to.
    pub crew: Crew,
    /// Whether the shift is worked as overtime.
    #[serde(default)]
    pub overtime: bool,
    /// Whether the entry still counts toward staffing.
    #[serde(default)]
    pub status: EntryStatus,
}

impl ScheduleEntry {
    /// Creates an active, non-overtime entry with a fresh identifier.
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift: ShiftLabel,
        position: impl Into<String>,
        crew: Crew,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            shift,
            position: position.into(),
            crew,
            overtime: false,
            status: EntryStatus::Active,
        }
    }

    /// Returns true while the entry counts toward staffing.
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    /// The (employee, date, shift) key used for insert-if-absent.
    pub fn slot(&self) -> (String, NaiveDate, ShiftLabel) {
        (self.employee_id.clone(), self.date, self.shift)
    }
}
