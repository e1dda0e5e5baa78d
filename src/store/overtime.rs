use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::RosterStore;
use crate::error::{RosterError, RosterResult};
use crate::models::{OvertimeSummary, OvertimeWeek};

type SummaryKey = (String, NaiveDate);

/// Memoized overtime summaries keyed by (employee, as-of week).
///
/// Every overtime import clears the cache and advances its generation. A
/// summary computed from rows read under an older generation is never
/// stored.
#[derive(Debug, Default)]
pub struct SummaryCache {
    inner: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<SummaryKey, OvertimeSummary>,
}

impl SummaryCache {
    /// A cached summary, if any.
    pub fn get(&self, employee_id: &str, as_of_week: NaiveDate) -> Option<OvertimeSummary> {
        self.inner
            .read()
            .ok()?
            .entries
            .get(&(employee_id.to_string(), as_of_week))
            .cloned()
    }

    /// The current generation. Capture it before reading overtime rows and
    /// pass it back to [`SummaryCache::insert`].
    pub fn generation(&self) -> u64 {
        self.inner.read().map(|state| state.generation).unwrap_or(u64::MAX)
    }

    /// Stores a summary computed under `generation`. The summary is dropped
    /// if an import has run since; a poisoned lock skips caching.
    pub fn insert(&self, generation: u64, summary: OvertimeSummary) {
        let Ok(mut state) = self.inner.write() else {
            return;
        };
        if state.generation != generation {
            debug!(
                employee_id = %summary.employee_id,
                as_of = %summary.as_of_week,
                "Stale overtime summary not cached"
            );
            return;
        }
        state
            .entries
            .insert((summary.employee_id.clone(), summary.as_of_week), summary);
    }

    /// Drops every cached summary and advances the generation.
    pub fn invalidate_all(&self) {
        if let Ok(mut state) = self.inner.write() {
            state.generation = state.generation.wrapping_add(1);
            state.entries.clear();
        }
    }

    /// Number of cached summaries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RosterStore {
    // ── Overtime ──────────────────────────────────────────────────

    /// Imports weekly overtime rows from the payroll feed.
    ///
    /// The whole batch is validated before anything is written. Re-importing
    /// an identical row is a no-op; a row that conflicts with one already
    /// stored for the same (employee, week) is a
    /// [`RosterError::Consistency`]. Returns the number of new rows.
    pub fn import_overtime(&self, rows: Vec<OvertimeWeek>) -> RosterResult<usize> {
        let mut batch: BTreeMap<(String, NaiveDate), OvertimeWeek> = BTreeMap::new();
        for row in rows {
            row.validate()?;
            let key = (row.employee_id.clone(), row.week_start);
            if batch.get(&key).is_some_and(|previous| *previous != row) {
                return Err(RosterError::consistency(format!(
                    "conflicting rows for {} in week {}",
                    row.employee_id, row.week_start
                )));
            }
            batch.insert(key, row);
        }

        let imported = self.transact(|data| {
            for (key, row) in &batch {
                if !data.employees.contains_key(&row.employee_id) {
                    return Err(RosterError::not_found("employee", &row.employee_id));
                }
                if data.overtime.get(key).is_some_and(|existing| existing != row) {
                    return Err(RosterError::consistency(format!(
                        "week {} for {} is already recorded with different hours",
                        row.week_start, row.employee_id
                    )));
                }
            }
            let mut imported = 0;
            for (key, row) in batch {
                if data.overtime.contains_key(&key) {
                    debug!(
                        employee_id = %key.0,
                        week_start = %key.1,
                        "Overtime row already imported"
                    );
                    continue;
                }
                data.overtime.insert(key, row);
                imported += 1;
            }
            // Must run before the write lock is released.
            self.summaries.invalidate_all();
            Ok(imported)
        })?;

        info!(imported, "Overtime rows imported");
        Ok(imported)
    }

    /// Every overtime row for `employee_id`, oldest week first.
    pub fn overtime_rows_for(&self, employee_id: &str) -> RosterResult<Vec<OvertimeWeek>> {
        let first = (employee_id.to_string(), NaiveDate::MIN);
        let last = (employee_id.to_string(), NaiveDate::MAX);
        Ok(self
            .read()?
            .overtime
            .range(first..=last)
            .map(|(_, row)| row.clone())
            .collect())
    }
}
