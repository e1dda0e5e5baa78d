//! Upcoming-absence projection for display.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::RosterResult;
use crate::models::{AbsenceRecord, Crew, DailyAbsences, DateRange, Employee};

/// Counts employees on approved leave per crew for each of the `days` dates
/// starting at `today`.
///
/// Every date in the window is present, even with no absences. Absences
/// for employees missing from `employees` cannot be attributed to a crew
/// and are skipped.
pub fn upcoming_absences(
    absences: &[AbsenceRecord],
    employees: &[Employee],
    today: NaiveDate,
    days: u32,
    crews: Option<&[Crew]>,
) -> RosterResult<Vec<DailyAbsences>> {
    if days == 0 {
        return Ok(Vec::new());
    }
    let window = DateRange::starting_at(today, days)?;
    let crew_of: HashMap<&str, &Crew> =
        employees.iter().map(|e| (e.id.as_str(), &e.crew)).collect();

    let mut away: BTreeMap<NaiveDate, BTreeMap<Crew, BTreeSet<&str>>> = window
        .days()
        .map(|date| (date, BTreeMap::new()))
        .collect();
    for absence in absences.iter().filter(|a| a.approved_within(&window)) {
        let Some(crew) = crew_of.get(absence.employee_id.as_str()) else {
            debug!(employee_id = %absence.employee_id, "Absence for unknown employee skipped");
            continue;
        };
        if crews.is_some_and(|filter| !filter.contains(crew)) {
            continue;
        }
        for (date, by_crew) in away.iter_mut() {
            if absence.removes_availability_on(*date) {
                by_crew
                    .entry((*crew).clone())
                    .or_default()
                    .insert(absence.employee_id.as_str());
            }
        }
    }

    Ok(away
        .into_iter()
        .map(|(date, by_crew)| {
            let by_crew: BTreeMap<Crew, u32> = by_crew
                .into_iter()
                .map(|(crew, ids)| (crew, ids.len() as u32))
                .collect();
            DailyAbsences {
                date,
                total: by_crew.values().sum(),
                by_crew,
            }
        })
        .collect())
}

/// Distinct employees on approved leave on `date`, within the crew filter.
pub fn absent_on(
    absences: &[AbsenceRecord],
    employees: &[Employee],
    date: NaiveDate,
    crews: Option<&[Crew]>,
) -> u32 {
    let crew_of: HashMap<&str, &Crew> =
        employees.iter().map(|e| (e.id.as_str(), &e.crew)).collect();
    absences
        .iter()
        .filter(|a| a.removes_availability_on(date))
        .filter(|a| {
            crew_of
                .get(a.employee_id.as_str())
                .is_some_and(|crew| crews.is_none_or(|filter| filter.contains(crew)))
        })
        .map(|a| a.employee_id.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u32
}
