//! Core data models for the crew roster engine.
//!
//! This module contains all the domain models used throughout the engine.

mod coverage;
mod crew;
mod date_range;
mod employee;
mod overtime;
mod schedule;
mod staffing;
mod swap;

pub use coverage::{CoverageReport, CoverageResult, CoverageSummary, CrewCoverage, DailyAbsences};
pub use crew::{Crew, ShiftLabel};
pub use date_range::{DateRange, ensure_monday, week_start_of};
pub use employee::{Employee, Supervisor};
pub use overtime::{
    EmployeeOvertimeRow, OvertimeAlert, OvertimeReport, OvertimeSummary, OvertimeTotals,
    OvertimeWeek, Trend,
};
pub use schedule::{Assignment, EntryStatus, ScheduleEntry};
pub use staffing::{AbsenceRecord, AbsenceStatus, CrewScope, LeaveType, StaffingRequirement};
pub use swap::{
    Approval, Denial, SkillWarning, SwapEvent, SwapEventKind, SwapRequest, SwapSide, SwapStatus,
};
