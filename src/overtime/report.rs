//! Per-employee overtime report with filtering, sorting and pagination.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OvertimeSettings;
use crate::error::{RosterError, RosterResult};
use crate::models::{
    Crew, Employee, EmployeeOvertimeRow, OvertimeReport, OvertimeSummary, OvertimeTotals,
    ensure_monday, week_start_of,
};
use crate::store::RosterStore;

use super::summary::summarize;

/// Maximum number of sort keys in one query.
pub const MAX_SORT_KEYS: usize = 4;

/// Rows per page when the caller does not say.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 200;

/// A column the report can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Employee display name.
    Name,
    /// Employee identifier.
    EmployeeId,
    /// Crew.
    Crew,
    /// Position.
    Position,
    /// Overtime in the as-of week; weeks without a row sort lowest.
    CurrentWeek,
    /// Rolling 13-week total.
    Total,
    /// Rolling weekly average.
    Average,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// One sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column to compare.
    pub field: SortField,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    fn compare(&self, a: &EmployeeOvertimeRow, b: &EmployeeOvertimeRow) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::EmployeeId => a.employee_id.cmp(&b.employee_id),
            SortField::Crew => a.crew.cmp(&b.crew),
            SortField::Position => a.position.cmp(&b.position),
            SortField::CurrentWeek => a
                .summary
                .current_week_overtime
                .cmp(&b.summary.current_week_overtime),
            SortField::Total => a
                .summary
                .last_13_weeks_total
                .cmp(&b.summary.last_13_weeks_total),
            SortField::Average => a.summary.weekly_average.cmp(&b.summary.weekly_average),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Filters, sort order and page for an overtime report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeReportQuery {
    /// Window end; defaults to the week containing today.
    #[serde(default)]
    pub as_of_week: Option<NaiveDate>,
    /// Only this crew.
    #[serde(default)]
    pub crew: Option<Crew>,
    /// Only this position.
    #[serde(default)]
    pub position: Option<String>,
    /// Case-insensitive match on employee id or name.
    #[serde(default)]
    pub search: Option<String>,
    /// Up to four sort keys, most significant first. Empty sorts by total,
    /// largest first.
    #[serde(default)]
    pub sort: Vec<SortKey>,
    /// Page number from 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Rows per page, 1 to 200.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for OvertimeReportQuery {
    fn default() -> Self {
        Self {
            as_of_week: None,
            crew: None,
            position: None,
            search: None,
            sort: Vec::new(),
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl OvertimeReportQuery {
    /// Checks sort and paging parameters.
    pub fn validate(&self) -> RosterResult<()> {
        if self.sort.len() > MAX_SORT_KEYS {
            return Err(RosterError::validation(
                "sort",
                format!("at most {} sort keys are allowed", MAX_SORT_KEYS),
            ));
        }
        if self.page == 0 {
            return Err(RosterError::validation("page", "pages start at 1"));
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(RosterError::validation(
                "per_page",
                format!("must be between 1 and {}", MAX_PER_PAGE),
            ));
        }
        if let Some(as_of) = self.as_of_week {
            ensure_monday(as_of)?;
        }
        Ok(())
    }

    fn matches(&self, row: &EmployeeOvertimeRow) -> bool {
        if self.crew.as_ref().is_some_and(|crew| *crew != row.crew) {
            return false;
        }
        if self.position.as_ref().is_some_and(|p| *p != row.position) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                row.employee_id.to_lowercase().contains(&needle)
                    || row.name.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    fn sort_keys(&self) -> Vec<SortKey> {
        if self.sort.is_empty() {
            vec![SortKey {
                field: SortField::Total,
                direction: SortDirection::Desc,
            }]
        } else {
            self.sort.clone()
        }
    }
}

/// Filters, sorts and paginates summary rows.
///
/// Totals cover every row that passed the filters, not just the returned
/// page. Ties on every sort key fall back to employee id. A page past the
/// end is empty.
pub fn build_report(
    rows: Vec<EmployeeOvertimeRow>,
    query: &OvertimeReportQuery,
) -> RosterResult<OvertimeReport> {
    query.validate()?;

    let mut rows: Vec<EmployeeOvertimeRow> =
        rows.into_iter().filter(|r| query.matches(r)).collect();
    let keys = query.sort_keys();
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.employee_id.cmp(&b.employee_id))
    });

    let totals = totals(&rows);
    let total_rows = rows.len() as u32;
    let total_pages = total_rows.div_ceil(query.per_page);
    let skip = ((query.page - 1) as usize).saturating_mul(query.per_page as usize);
    let page_rows: Vec<EmployeeOvertimeRow> = rows
        .into_iter()
        .skip(skip)
        .take(query.per_page as usize)
        .collect();

    Ok(OvertimeReport {
        rows: page_rows,
        totals,
        page: query.page,
        per_page: query.per_page,
        total_rows,
        total_pages,
    })
}

fn totals(rows: &[EmployeeOvertimeRow]) -> OvertimeTotals {
    let total_overtime_hours: Decimal = rows.iter().map(|r| r.summary.last_13_weeks_total).sum();
    let avg_overtime = if rows.is_empty() {
        Decimal::ZERO
    } else {
        (total_overtime_hours / Decimal::from(rows.len())).round_dp(2)
    };
    OvertimeTotals {
        total_overtime_hours,
        employees_with_overtime: rows
            .iter()
            .filter(|r| r.summary.last_13_weeks_total > Decimal::ZERO)
            .count() as u32,
        avg_overtime,
        high_overtime_count: rows
            .iter()
            .filter(|r| r.summary.alert.as_ref().is_some_and(|a| a.flagged))
            .count() as u32,
    }
}

/// Summary for one employee, served from the store's cache when possible.
///
/// `as_of_week` defaults to the week containing `today`.
pub fn employee_summary(
    store: &RosterStore,
    settings: &OvertimeSettings,
    employee_id: &str,
    as_of_week: Option<NaiveDate>,
    today: NaiveDate,
) -> RosterResult<OvertimeSummary> {
    let employee = store.employee(employee_id)?;
    let as_of = as_of_week.unwrap_or_else(|| week_start_of(today));
    cached_summary(store, settings, &employee, as_of)
}

fn cached_summary(
    store: &RosterStore,
    settings: &OvertimeSettings,
    employee: &Employee,
    as_of: NaiveDate,
) -> RosterResult<OvertimeSummary> {
    if let Some(summary) = store.summaries().get(&employee.id, as_of) {
        debug!(employee_id = %employee.id, as_of = %as_of, "Overtime summary cache hit");
        return Ok(summary);
    }
    let generation = store.summaries().generation();
    let rows = store.overtime_rows_for(&employee.id)?;
    let summary = summarize(&rows, &employee.id, as_of, settings)?;
    store.summaries().insert(generation, summary.clone());
    Ok(summary)
}

/// Builds the overtime report across the employee directory.
pub fn overtime_report(
    store: &RosterStore,
    settings: &OvertimeSettings,
    query: &OvertimeReportQuery,
    today: NaiveDate,
) -> RosterResult<OvertimeReport> {
    query.validate()?;
    let as_of = query.as_of_week.unwrap_or_else(|| week_start_of(today));

    let rows = store
        .employees()?
        .into_iter()
        .map(|employee| {
            let summary = cached_summary(store, settings, &employee, as_of)?;
            Ok(EmployeeOvertimeRow {
                employee_id: employee.id,
                name: employee.name,
                crew: employee.crew,
                position: employee.position,
                summary,
            })
        })
        .collect::<RosterResult<Vec<_>>>()?;

    let report = build_report(rows, query)?;
    info!(
        as_of = %as_of,
        total_rows = report.total_rows,
        page = report.page,
        high_overtime = report.totals.high_overtime_count,
        "Overtime report built"
    );
    Ok(report)
}
