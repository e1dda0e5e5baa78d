//! Turning crew-level assignments into employee schedule entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::RosterResult;
use crate::models::{Assignment, Crew, Employee, ScheduleEntry};
use crate::store::{MaterializeMode, MaterializeReport, RosterStore};

/// Plans one entry per member of each on-duty crew.
///
/// Off labels plan nothing. Every entry uses the employee's own position
/// and is regular time.
pub fn plan_entries(assignments: &[Assignment], employees: &[Employee]) -> Vec<ScheduleEntry> {
    let mut by_crew: BTreeMap<&Crew, Vec<&Employee>> = BTreeMap::new();
    for employee in employees {
        by_crew.entry(&employee.crew).or_default().push(employee);
    }

    let mut planned = Vec::new();
    for assignment in assignments.iter().filter(|a| a.shift.is_working()) {
        let Some(members) = by_crew.get(&assignment.crew) else {
            debug!(crew = %assignment.crew, "No employees on crew; nothing to materialize");
            continue;
        };
        for employee in members {
            planned.push(ScheduleEntry::new(
                employee.id.clone(),
                assignment.date,
                assignment.shift,
                employee.position.clone(),
                assignment.crew.clone(),
            ));
        }
    }
    planned
}

/// Persists a rotation table as schedule entries.
///
/// Dates before `today` are counted as `skipped_past` and never written.
/// See [`MaterializeMode`] for how existing entries are treated.
pub fn materialize(
    store: &RosterStore,
    assignments: &[Assignment],
    today: NaiveDate,
    mode: MaterializeMode,
) -> RosterResult<MaterializeReport> {
    let employees = store.employees()?;
    let planned = plan_entries(assignments, &employees);
    store.apply_materialization(planned, today, mode)
}
