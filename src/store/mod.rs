//! In-memory roster store.
//!
//! All roster data lives behind a single `RwLock`. Engines read consistent
//! snapshots; mutations run under the write lock and are planned before
//! they are applied, so a failed mutation leaves nothing half-written.

mod overtime;
mod schedule;

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::{RosterError, RosterResult};
use crate::models::{
    AbsenceRecord, AbsenceStatus, DateRange, Employee, OvertimeWeek, ScheduleEntry, ShiftLabel,
    StaffingRequirement, Supervisor, SwapRequest,
};

pub use overtime::SummaryCache;
pub use schedule::{MaterializeMode, MaterializeReport};

/// Key of an active schedule slot: (employee, date, shift).
pub(crate) type SlotKey = (String, NaiveDate, ShiftLabel);

/// Everything the store holds.
#[derive(Debug, Default)]
pub(crate) struct RosterData {
    pub(crate) employees: BTreeMap<String, Employee>,
    pub(crate) supervisors: BTreeMap<String, Supervisor>,
    pub(crate) entries: HashMap<Uuid, ScheduleEntry>,
    /// Active entries only.
    pub(crate) slots: HashMap<SlotKey, Uuid>,
    pub(crate) absences: Vec<AbsenceRecord>,
    pub(crate) requirements: Vec<StaffingRequirement>,
    pub(crate) swaps: HashMap<Uuid, SwapRequest>,
    pub(crate) overtime: BTreeMap<(String, NaiveDate), OvertimeWeek>,
}

/// The data a coverage query reads, copied out under one read lock.
#[derive(Debug, Clone, Default)]
pub struct CoverageSnapshot {
    /// Active entries dated within the queried range.
    pub entries: Vec<ScheduleEntry>,
    /// Approved absences.
    pub absences: Vec<AbsenceRecord>,
    /// Staffing requirements.
    pub requirements: Vec<StaffingRequirement>,
    /// The employee directory.
    pub employees: Vec<Employee>,
}

/// Shared in-memory storage for roster data.
///
/// # Example
///
/// ```
/// use crew_roster::models::{Crew, Employee};
/// use crew_roster::store::RosterStore;
///
/// let store = RosterStore::new();
/// store
///     .upsert_employee(Employee {
///         id: "emp_001".to_string(),
///         name: "Ada Park".to_string(),
///         crew: Crew::new("A"),
///         position: "operator".to_string(),
///         skills: vec![],
///     })
///     .unwrap();
/// assert_eq!(store.employee("emp_001").unwrap().crew, Crew::new("A"));
/// ```
#[derive(Debug, Default)]
pub struct RosterStore {
    data: RwLock<RosterData>,
    summaries: SummaryCache,
}

impl RosterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> RosterResult<RwLockReadGuard<'_, RosterData>> {
        self.data
            .read()
            .map_err(|_| RosterError::consistency("roster store lock poisoned"))
    }

    /// Runs `f` with exclusive access to the data.
    ///
    /// `f` must check everything before it writes anything: an `Err` is
    /// returned to the caller as-is and is expected to leave `data` untouched.
    pub(crate) fn transact<T>(
        &self,
        f: impl FnOnce(&mut RosterData) -> RosterResult<T>,
    ) -> RosterResult<T> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| RosterError::consistency("roster store lock poisoned"))?;
        f(&mut guard)
    }

    pub(crate) fn summaries(&self) -> &SummaryCache {
        &self.summaries
    }

    // ── Directory ─────────────────────────────────────────────────

    /// Inserts or replaces an employee record.
    pub fn upsert_employee(&self, employee: Employee) -> RosterResult<()> {
        if employee.id.trim().is_empty() {
            return Err(RosterError::validation("employee.id", "must not be empty"));
        }
        self.transact(|data| {
            data.employees.insert(employee.id.clone(), employee);
            Ok(())
        })
    }

    /// Inserts or replaces a supervisor record.
    pub fn upsert_supervisor(&self, supervisor: Supervisor) -> RosterResult<()> {
        if supervisor.id.trim().is_empty() {
            return Err(RosterError::validation("supervisor.id", "must not be empty"));
        }
        self.transact(|data| {
            data.supervisors.insert(supervisor.id.clone(), supervisor);
            Ok(())
        })
    }

    /// Looks up an employee.
    pub fn employee(&self, id: &str) -> RosterResult<Employee> {
        self.read()?
            .employees
            .get(id)
            .cloned()
            .ok_or_else(|| RosterError::not_found("employee", id))
    }

    /// All employees, ordered by id.
    pub fn employees(&self) -> RosterResult<Vec<Employee>> {
        Ok(self.read()?.employees.values().cloned().collect())
    }

    // ── Absences & requirements ───────────────────────────────────

    /// Records an absence supplied by the leave system.
    pub fn record_absence(&self, absence: AbsenceRecord) -> RosterResult<()> {
        DateRange::new(absence.start_date, absence.end_date)?;
        self.transact(|data| {
            if !data.employees.contains_key(&absence.employee_id) {
                return Err(RosterError::not_found("employee", &absence.employee_id));
            }
            data.absences.push(absence);
            Ok(())
        })
    }

    /// Replaces the staffing requirements.
    pub fn set_requirements(&self, requirements: Vec<StaffingRequirement>) -> RosterResult<()> {
        let count = requirements.len();
        self.transact(|data| {
            data.requirements = requirements;
            Ok(())
        })?;
        info!(requirements = count, "Staffing requirements replaced");
        Ok(())
    }

    /// Copies out what a coverage query over `range` needs.
    pub fn coverage_snapshot(&self, range: &DateRange) -> RosterResult<CoverageSnapshot> {
        let data = self.read()?;
        let mut entries: Vec<ScheduleEntry> = data
            .entries
            .values()
            .filter(|e| e.is_active() && range.contains_date(e.date))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            (a.date, a.shift, &a.employee_id).cmp(&(b.date, b.shift, &b.employee_id))
        });
        Ok(CoverageSnapshot {
            entries,
            absences: data
                .absences
                .iter()
                .filter(|a| a.status == AbsenceStatus::Approved)
                .cloned()
                .collect(),
            requirements: data.requirements.clone(),
            employees: data.employees.values().cloned().collect(),
        })
    }

    // ── Swaps ─────────────────────────────────────────────────────

    /// Looks up a swap request.
    pub fn swap(&self, id: Uuid) -> RosterResult<SwapRequest> {
        self.read()?
            .swaps
            .get(&id)
            .cloned()
            .ok_or_else(|| RosterError::not_found("swap request", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crew, LeaveType};

    fn employee(id: &str, crew: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_uppercase(),
            crew: Crew::new(crew),
            position: "operator".to_string(),
            skills: vec![],
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_unknown_employee_is_not_found() {
        let store = RosterStore::new();
        assert!(matches!(
            store.employee("ghost"),
            Err(RosterError::NotFound { .. })
        ));
    }

    #[test]
    fn test_blank_employee_id_is_rejected() {
        let store = RosterStore::new();
        assert!(store.upsert_employee(employee(" ", "A")).is_err());
    }

    #[test]
    fn test_absence_for_unknown_employee_is_rejected() {
        let store = RosterStore::new();
        let absence = AbsenceRecord {
            employee_id: "ghost".to_string(),
            start_date: date(1),
            end_date: date(2),
            leave_type: LeaveType::Sick,
            status: AbsenceStatus::Approved,
        };
        assert!(store.record_absence(absence).is_err());
    }

    #[test]
    fn test_absence_with_inverted_dates_is_rejected() {
        let store = RosterStore::new();
        store.upsert_employee(employee("a1", "A")).unwrap();
        let absence = AbsenceRecord {
            employee_id: "a1".to_string(),
            start_date: date(5),
            end_date: date(2),
            leave_type: LeaveType::Sick,
            status: AbsenceStatus::Approved,
        };
        assert!(matches!(
            store.record_absence(absence),
            Err(RosterError::Validation { .. })
        ));
    }

    #[test]
    fn test_snapshot_keeps_only_approved_absences() {
        let store = RosterStore::new();
        store.upsert_employee(employee("a1", "A")).unwrap();
        for status in [
            AbsenceStatus::Approved,
            AbsenceStatus::Pending,
            AbsenceStatus::Denied,
        ] {
            store
                .record_absence(AbsenceRecord {
                    employee_id: "a1".to_string(),
                    start_date: date(1),
                    end_date: date(2),
                    leave_type: LeaveType::Vacation,
                    status,
                })
                .unwrap();
        }
        let range = DateRange::new(date(1), date(3)).unwrap();
        let snapshot = store.coverage_snapshot(&range).unwrap();
        assert_eq!(snapshot.absences.len(), 1);
        assert_eq!(snapshot.employees.len(), 1);
    }
}
