//! The full coverage report assembled for a caller.

use tracing::info;

use crate::config::{CoverageSettings, FacilityConfig};
use crate::error::RosterResult;
use crate::models::{Assignment, CoverageReport};
use crate::store::{CoverageSnapshot, RosterStore};

use super::gaps::{CoverageQuery, compute_gaps, group_by_crew, summarize};
use super::lookahead::{absent_on, upcoming_absences};
use super::requirements::RequirementIndex;

/// Builds a coverage report from a snapshot.
///
/// This is a pure function of its inputs: nothing is cached between calls.
pub fn build_report(
    snapshot: &CoverageSnapshot,
    index: &RequirementIndex,
    rotation: &[Assignment],
    query: &CoverageQuery,
    settings: &CoverageSettings,
) -> RosterResult<CoverageReport> {
    let crews = query.crews.as_deref();
    let results = compute_gaps(
        &snapshot.entries,
        &snapshot.absences,
        index,
        rotation,
        query,
        settings,
    );
    let absences_today = absent_on(&snapshot.absences, &snapshot.employees, query.today, crews);
    let summary = summarize(&results, settings.critical_gap_threshold, absences_today);
    let upcoming_absences = upcoming_absences(
        &snapshot.absences,
        &snapshot.employees,
        query.today,
        settings.lookahead_days,
        crews,
    )?;
    Ok(CoverageReport {
        today: query.today,
        by_crew: group_by_crew(&results),
        results,
        summary,
        upcoming_absences,
    })
}

/// Computes coverage for `query` against the current store contents.
///
/// `rotation` adds crews the pattern puts on shift even where no entries
/// have been materialized yet; pass an empty slice to use entries only.
///
/// # Errors
///
/// Returns [`crate::error::RosterError::UnknownPosition`] if a stored
/// requirement names a position missing from the configuration.
pub fn coverage_report(
    store: &RosterStore,
    config: &FacilityConfig,
    query: &CoverageQuery,
    rotation: &[Assignment],
) -> RosterResult<CoverageReport> {
    let snapshot = store.coverage_snapshot(&query.range)?;
    let index = RequirementIndex::build(&snapshot.requirements, config.positions())?;
    let report = build_report(
        &snapshot,
        &index,
        rotation,
        query,
        &config.settings().coverage,
    )?;
    info!(
        start = %query.range.start,
        end = %query.range.end,
        rows = report.results.len(),
        gaps = report.summary.total_gaps,
        critical = report.summary.critical_gaps,
        "Coverage computed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FacilitySettings, PositionCatalog, PositionDefinition};
    use crate::models::{
        AbsenceRecord, AbsenceStatus, Crew, CrewScope, DateRange, Employee, LeaveType,
        ScheduleEntry, ShiftLabel, StaffingRequirement,
    };
    use crate::rotation::PatternCatalog;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn config() -> FacilityConfig {
        let mut positions = PositionCatalog::default();
        positions.positions.insert(
            "operator".to_string(),
            PositionDefinition {
                name: "Operator".to_string(),
                required_skills: vec![],
            },
        );
        let settings = FacilitySettings {
            name: "Test".to_string(),
            crews: vec![Crew::new("A"), Crew::new("B")],
            coverage: CoverageSettings::default(),
            overtime: Default::default(),
            swaps: Default::default(),
        };
        FacilityConfig::new(settings, PatternCatalog::new(), positions)
    }

    fn seeded_store() -> RosterStore {
        let store = RosterStore::new();
        for i in 1..=4 {
            let id = format!("op{}", i);
            store
                .upsert_employee(Employee {
                    id: id.clone(),
                    name: id.clone(),
                    crew: Crew::new("A"),
                    position: "operator".to_string(),
                    skills: vec![],
                })
                .unwrap();
            store
                .insert_if_absent(ScheduleEntry::new(
                    id,
                    date(1),
                    ShiftLabel::Day,
                    "operator",
                    Crew::new("A"),
                ))
                .unwrap();
        }
        for id in ["op1", "op2"] {
            store
                .record_absence(AbsenceRecord {
                    employee_id: id.to_string(),
                    start_date: date(1),
                    end_date: date(2),
                    leave_type: LeaveType::Sick,
                    status: AbsenceStatus::Approved,
                })
                .unwrap();
        }
        store
            .set_requirements(vec![StaffingRequirement {
                position: "operator".to_string(),
                shift: ShiftLabel::Day,
                scope: CrewScope::AllCrews,
                minimum: 3,
            }])
            .unwrap();
        store
    }

    #[test]
    fn test_report_from_store() {
        let store = seeded_store();
        let query = CoverageQuery {
            range: DateRange::new(date(1), date(1)).unwrap(),
            crews: None,
            today: date(1),
        };
        let report = coverage_report(&store, &config(), &query, &[]).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].gap, 1);
        assert_eq!(report.summary.total_gaps, 1);
        assert_eq!(report.summary.critical_gaps, 0);
        assert_eq!(report.summary.total_absences_today, 2);
        assert_eq!(report.summary.crews_affected, 1);
        assert_eq!(report.by_crew.len(), 1);
        assert_eq!(report.upcoming_absences.len(), 7);
        assert_eq!(report.upcoming_absences[1].total, 2);
        assert_eq!(report.upcoming_absences[2].total, 0);
    }

    #[test]
    fn test_report_reflects_new_absence_immediately() {
        let store = seeded_store();
        let query = CoverageQuery {
            range: DateRange::new(date(1), date(1)).unwrap(),
            crews: None,
            today: date(1),
        };
        let before = coverage_report(&store, &config(), &query, &[]).unwrap();
        store
            .record_absence(AbsenceRecord {
                employee_id: "op3".to_string(),
                start_date: date(1),
                end_date: date(1),
                leave_type: LeaveType::Personal,
                status: AbsenceStatus::Approved,
            })
            .unwrap();
        let after = coverage_report(&store, &config(), &query, &[]).unwrap();
        assert_eq!(before.results[0].gap, 1);
        assert_eq!(after.results[0].gap, 2);
        assert_eq!(after.summary.critical_gaps, 1);
    }

    #[test]
    fn test_unknown_requirement_position_is_configuration_error() {
        let store = seeded_store();
        store
            .set_requirements(vec![StaffingRequirement {
                position: "welder".to_string(),
                shift: ShiftLabel::Day,
                scope: CrewScope::AllCrews,
                minimum: 1,
            }])
            .unwrap();
        let query = CoverageQuery {
            range: DateRange::new(date(1), date(1)).unwrap(),
            crews: None,
            today: date(1),
        };
        let err = coverage_report(&store, &config(), &query, &[]).unwrap_err();
        assert_eq!(err.class(), crate::error::ErrorClass::Configuration);
    }
}
