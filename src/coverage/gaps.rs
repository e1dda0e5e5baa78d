//! Gap computation.
//!
//! For each date, working shift and position with a requirement, counts the
//! distinct employees on the roster, removes those on approved leave, and
//! reports `gap = max(0, required - available)`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{CoverageSettings, RequirementScope};
use crate::models::{
    AbsenceRecord, Assignment, CoverageResult, CoverageSummary, Crew, CrewCoverage, DateRange,
    ScheduleEntry, ShiftLabel,
};

use super::requirements::RequirementIndex;

/// A coverage query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageQuery {
    /// Dates to evaluate.
    pub range: DateRange,
    /// Restrict to these crews; `None` evaluates every crew.
    #[serde(default)]
    pub crews: Option<Vec<Crew>>,
    /// Reference date for "today" counts and the absence lookahead.
    pub today: NaiveDate,
}

impl CoverageQuery {
    /// Returns true if `crew` passes the crew filter.
    pub fn includes(&self, crew: &Crew) -> bool {
        self.crews.as_ref().is_none_or(|crews| crews.contains(crew))
    }
}

/// Approved absences per employee.
struct AbsenceLookup<'a> {
    by_employee: HashMap<&'a str, Vec<&'a AbsenceRecord>>,
}

impl<'a> AbsenceLookup<'a> {
    fn new(absences: &'a [AbsenceRecord]) -> Self {
        let mut by_employee: HashMap<&str, Vec<&AbsenceRecord>> = HashMap::new();
        for absence in absences {
            by_employee
                .entry(absence.employee_id.as_str())
                .or_default()
                .push(absence);
        }
        Self { by_employee }
    }

    fn is_absent(&self, employee_id: &str, date: NaiveDate) -> bool {
        self.by_employee
            .get(employee_id)
            .is_some_and(|records| records.iter().any(|a| a.removes_availability_on(date)))
    }
}

/// Computes coverage rows for every evaluated (date, shift, position).
///
/// On-duty crews for a shift are the crews of active entries on it plus the
/// crews `rotation` puts on it. Combinations without a requirement, or with
/// a zero minimum, produce no row. Output is ordered by date, shift, position, then crew with the
/// shift-wide row last.
pub fn compute_gaps(
    entries: &[ScheduleEntry],
    absences: &[AbsenceRecord],
    index: &RequirementIndex,
    rotation: &[Assignment],
    query: &CoverageQuery,
    settings: &CoverageSettings,
) -> Vec<CoverageResult> {
    let mut rostered: HashMap<(NaiveDate, ShiftLabel), Vec<&ScheduleEntry>> = HashMap::new();
    for entry in entries.iter().filter(|e| e.is_active()) {
        rostered.entry((entry.date, entry.shift)).or_default().push(entry);
    }
    let mut rotating: HashMap<(NaiveDate, ShiftLabel), BTreeSet<&Crew>> = HashMap::new();
    for assignment in rotation.iter().filter(|a| a.shift.is_working()) {
        rotating
            .entry((assignment.date, assignment.shift))
            .or_default()
            .insert(&assignment.crew);
    }
    let absent = AbsenceLookup::new(absences);

    let mut results = Vec::new();
    for date in query.range.days() {
        for shift in ShiftLabel::WORKING {
            let on_shift = rostered.get(&(date, shift)).map(Vec::as_slice).unwrap_or(&[]);
            let mut on_duty: BTreeSet<&Crew> = on_shift.iter().map(|e| &e.crew).collect();
            if let Some(crews) = rotating.get(&(date, shift)) {
                on_duty.extend(crews.iter().copied());
            }
            on_duty.retain(|crew| query.includes(crew));
            if on_duty.is_empty() {
                continue;
            }
            let crews_on_duty: Vec<Crew> = on_duty.iter().map(|c| (*c).clone()).collect();

            for position in index.positions_for(shift) {
                let count = |crews: &BTreeSet<&Crew>| {
                    let staff: BTreeSet<&str> = on_shift
                        .iter()
                        .filter(|e| e.position == position && crews.contains(&e.crew))
                        .map(|e| e.employee_id.as_str())
                        .collect();
                    let away = staff.iter().filter(|id| absent.is_absent(id, date)).count();
                    (staff.len() as u32, away as u32)
                };

                for crew in &on_duty {
                    let minimum = match settings.requirement_scope {
                        RequirementScope::PerCrew => index.lookup(position, shift, crew),
                        RequirementScope::ShiftTotal => index.crew_scoped(position, shift, crew),
                    };
                    let Some(required) = minimum.filter(|m| *m > 0) else {
                        continue;
                    };
                    let (on_roster, away) = count(&BTreeSet::from([*crew]));
                    results.push(CoverageResult::from_counts(
                        date,
                        shift,
                        position,
                        Some((*crew).clone()),
                        crews_on_duty.clone(),
                        required,
                        on_roster,
                        away,
                    ));
                }

                let shift_wide = match settings.requirement_scope {
                    RequirementScope::PerCrew => None,
                    RequirementScope::ShiftTotal => index.shift_wide(position, shift),
                }
                .filter(|m| *m > 0);
                if let Some(required) = shift_wide {
                    let (on_roster, away) = count(&on_duty);
                    results.push(CoverageResult::from_counts(
                        date,
                        shift,
                        position,
                        None,
                        crews_on_duty.clone(),
                        required,
                        on_roster,
                        away,
                    ));
                }
            }
        }
    }
    results
}

/// Groups rows under each crew's on-duty shift.
///
/// A shift-wide row appears in the group of every crew on duty for it.
/// Groups whose total requirement is zero are dropped.
pub fn group_by_crew(results: &[CoverageResult]) -> Vec<CrewCoverage> {
    let mut groups: BTreeMap<(NaiveDate, ShiftLabel, &Crew), Vec<&CoverageResult>> =
        BTreeMap::new();
    for row in results {
        match &row.crew {
            Some(crew) => groups.entry((row.date, row.shift, crew)).or_default().push(row),
            None => {
                for crew in &row.crews_on_duty {
                    groups.entry((row.date, row.shift, crew)).or_default().push(row);
                }
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|((date, shift, crew), rows)| {
            let total_required: u32 = rows.iter().map(|r| r.required).sum();
            if total_required == 0 {
                return None;
            }
            Some(CrewCoverage {
                crew: crew.clone(),
                date,
                shift,
                total_required,
                total_available: rows.iter().map(|r| r.available).sum(),
                total_gap: rows.iter().map(|r| r.gap).sum(),
                positions: rows.into_iter().cloned().collect(),
            })
        })
        .collect()
}

/// Summary counts over a set of rows.
///
/// `absences_today` is supplied by the caller since it does not depend on
/// the rows.
pub fn summarize(
    results: &[CoverageResult],
    critical_gap_threshold: u32,
    absences_today: u32,
) -> CoverageSummary {
    let mut affected: BTreeSet<&Crew> = BTreeSet::new();
    let mut summary = CoverageSummary {
        total_absences_today: absences_today,
        ..CoverageSummary::default()
    };
    for row in results.iter().filter(|r| r.gap > 0) {
        summary.total_gaps += 1;
        summary.total_shortfall += row.gap;
        if row.is_critical(critical_gap_threshold) {
            summary.critical_gaps += 1;
        }
        match &row.crew {
            Some(crew) => {
                affected.insert(crew);
            }
            None => affected.extend(row.crews_on_duty.iter()),
        }
    }
    summary.crews_affected = affected.len() as u32;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PositionCatalog, PositionDefinition};
    use crate::models::{AbsenceStatus, CrewScope, LeaveType, StaffingRequirement};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn positions() -> PositionCatalog {
        let mut catalog = PositionCatalog::default();
        for code in ["operator", "shift_lead"] {
            catalog.positions.insert(
                code.to_string(),
                PositionDefinition {
                    name: code.to_string(),
                    required_skills: vec![],
                },
            );
        }
        catalog
    }

    fn index(reqs: &[(&str, ShiftLabel, CrewScope, u32)]) -> RequirementIndex {
        let reqs: Vec<_> = reqs
            .iter()
            .map(|(position, shift, scope, minimum)| StaffingRequirement {
                position: position.to_string(),
                shift: *shift,
                scope: scope.clone(),
                minimum: *minimum,
            })
            .collect();
        RequirementIndex::build(&reqs, &positions()).unwrap()
    }

    fn entry(
        employee: &str,
        crew: &str,
        d: u32,
        shift: ShiftLabel,
        position: &str,
    ) -> ScheduleEntry {
        ScheduleEntry::new(employee, date(d), shift, position, Crew::new(crew))
    }

    fn absence(employee: &str, from: u32, to: u32, status: AbsenceStatus) -> AbsenceRecord {
        AbsenceRecord {
            employee_id: employee.to_string(),
            start_date: date(from),
            end_date: date(to),
            leave_type: LeaveType::Vacation,
            status,
        }
    }

    fn query(from: u32, to: u32) -> CoverageQuery {
        CoverageQuery {
            range: DateRange::new(date(from), date(to)).unwrap(),
            crews: None,
            today: date(from),
        }
    }

    fn four_operators() -> Vec<ScheduleEntry> {
        (1..=4)
            .map(|i| entry(&format!("op{}", i), "A", 1, ShiftLabel::Day, "operator"))
            .collect()
    }

    #[test]
    fn test_two_absent_of_four_leaves_gap_of_one() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 3)]);
        let absences = vec![
            absence("op1", 1, 1, AbsenceStatus::Approved),
            absence("op2", 1, 3, AbsenceStatus::Approved),
        ];
        let rows = compute_gaps(
            &four_operators(),
            &absences,
            &idx,
            &[],
            &query(1, 1),
            &CoverageSettings::default(),
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!((row.required, row.on_roster, row.absent), (3, 4, 2));
        assert_eq!(row.available, 2);
        assert_eq!(row.gap, 1);
        assert!(!row.is_critical(2));
    }

    #[test]
    fn test_pending_absence_does_not_reduce_availability() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 3)]);
        let absences = vec![absence("op1", 1, 1, AbsenceStatus::Pending)];
        let rows = compute_gaps(
            &four_operators(),
            &absences,
            &idx,
            &[],
            &query(1, 1),
            &CoverageSettings::default(),
        );
        assert_eq!(rows[0].available, 4);
        assert_eq!(rows[0].gap, 0);
    }

    #[test]
    fn test_combination_without_requirement_is_omitted() {
        let idx = index(&[("shift_lead", ShiftLabel::Night, CrewScope::AllCrews, 1)]);
        let rows = compute_gaps(
            &four_operators(),
            &[],
            &idx,
            &[],
            &query(1, 1),
            &CoverageSettings::default(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rotation_crew_with_no_entries_shows_full_gap() {
        let idx = index(&[("operator", ShiftLabel::Night, CrewScope::AllCrews, 2)]);
        let rotation = vec![Assignment {
            crew: Crew::new("B"),
            date: date(1),
            shift: ShiftLabel::Night,
        }];
        let settings = CoverageSettings::default();
        let rows = compute_gaps(&[], &[], &idx, &rotation, &query(1, 1), &settings);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crew, Some(Crew::new("B")));
        assert_eq!(rows[0].gap, 2);
        assert!(rows[0].is_critical(2));
    }

    #[test]
    fn test_per_crew_scope_evaluates_each_crew() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 2)]);
        let entries = vec![
            entry("a1", "A", 1, ShiftLabel::Day, "operator"),
            entry("a2", "A", 1, ShiftLabel::Day, "operator"),
            entry("b1", "B", 1, ShiftLabel::Day, "operator"),
        ];
        let settings = CoverageSettings::default();
        let rows = compute_gaps(&entries, &[], &idx, &[], &query(1, 1), &settings);
        let gaps: Vec<_> = rows.iter().map(|r| (r.crew.clone(), r.gap)).collect();
        assert_eq!(
            gaps,
            vec![(Some(Crew::new("A")), 0), (Some(Crew::new("B")), 1)]
        );
    }

    #[test]
    fn test_shift_total_scope_counts_across_crews() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 3)]);
        let entries = vec![
            entry("a1", "A", 1, ShiftLabel::Day, "operator"),
            entry("a2", "A", 1, ShiftLabel::Day, "operator"),
            entry("b1", "B", 1, ShiftLabel::Day, "operator"),
        ];
        let settings = CoverageSettings {
            requirement_scope: RequirementScope::ShiftTotal,
            ..CoverageSettings::default()
        };
        let rows = compute_gaps(&entries, &[], &idx, &[], &query(1, 1), &settings);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crew, None);
        assert_eq!(rows[0].on_roster, 3);
        assert_eq!(rows[0].gap, 0);
        assert_eq!(rows[0].crews_on_duty, vec![Crew::new("A"), Crew::new("B")]);
    }

    #[test]
    fn test_crew_filter_excludes_other_crews() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 2)]);
        let entries = vec![
            entry("a1", "A", 1, ShiftLabel::Day, "operator"),
            entry("b1", "B", 1, ShiftLabel::Day, "operator"),
        ];
        let mut q = query(1, 1);
        q.crews = Some(vec![Crew::new("B")]);
        let rows = compute_gaps(&entries, &[], &idx, &[], &q, &CoverageSettings::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crew, Some(Crew::new("B")));
    }

    #[test]
    fn test_cancelled_entries_are_ignored() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 1)]);
        let mut cancelled = entry("a1", "A", 1, ShiftLabel::Day, "operator");
        cancelled.status = crate::models::EntryStatus::Cancelled;
        let rows = compute_gaps(
            &[cancelled],
            &[],
            &idx,
            &[],
            &query(1, 1),
            &CoverageSettings::default(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_summary_and_grouping() {
        let idx = index(&[
            ("operator", ShiftLabel::Day, CrewScope::AllCrews, 3),
            ("shift_lead", ShiftLabel::Day, CrewScope::AllCrews, 1),
        ]);
        let entries = vec![
            entry("a1", "A", 1, ShiftLabel::Day, "operator"),
            entry("b1", "B", 1, ShiftLabel::Day, "operator"),
            entry("b2", "B", 1, ShiftLabel::Day, "operator"),
            entry("b3", "B", 1, ShiftLabel::Day, "shift_lead"),
        ];
        let settings = CoverageSettings::default();
        let rows = compute_gaps(&entries, &[], &idx, &[], &query(1, 1), &settings);
        // A: operator gap 2, lead gap 1. B: operator gap 1, lead gap 0.
        let summary = summarize(&rows, 2, 5);
        assert_eq!(summary.total_gaps, 3);
        assert_eq!(summary.total_shortfall, 4);
        assert_eq!(summary.critical_gaps, 1);
        assert_eq!(summary.crews_affected, 2);
        assert_eq!(summary.total_absences_today, 5);

        let groups = group_by_crew(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].crew, Crew::new("A"));
        assert_eq!(groups[0].total_required, 4);
        assert_eq!(groups[0].total_gap, 3);
        assert_eq!(groups[1].total_available, 3);
    }

    #[test]
    fn test_zero_minimum_produces_no_rows() {
        let idx = index(&[("operator", ShiftLabel::Day, CrewScope::AllCrews, 0)]);
        let entries = vec![entry("a1", "A", 1, ShiftLabel::Day, "operator")];
        for requirement_scope in [RequirementScope::PerCrew, RequirementScope::ShiftTotal] {
            let settings = CoverageSettings {
                requirement_scope,
                ..CoverageSettings::default()
            };
            let rows = compute_gaps(&entries, &[], &idx, &[], &query(1, 1), &settings);
            assert!(rows.is_empty(), "{:?}: {:?}", requirement_scope, rows);
        }
    }

    #[test]
    fn test_zero_crew_minimum_overrides_shared_requirement() {
        let idx = index(&[
            ("operator", ShiftLabel::Day, CrewScope::AllCrews, 2),
            ("operator", ShiftLabel::Day, CrewScope::Crew(Crew::new("A")), 0),
        ]);
        let entries = vec![
            entry("a1", "A", 1, ShiftLabel::Day, "operator"),
            entry("b1", "B", 1, ShiftLabel::Day, "operator"),
        ];
        let rows = compute_gaps(
            &entries,
            &[],
            &idx,
            &[],
            &query(1, 1),
            &CoverageSettings::default(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].crew, Some(Crew::new("B")));
        assert_eq!(rows[0].gap, 1);
    }
}
