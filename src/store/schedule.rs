use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{RosterData, RosterStore};
use crate::error::{RosterError, RosterResult};
use crate::models::{DateRange, EntryStatus, ScheduleEntry};

/// How materialization treats slots that already hold an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializeMode {
    /// Leave existing entries alone.
    #[default]
    SkipExisting,
    /// Cancel the employee's active entries on the date and write the new one.
    Overwrite,
}

/// Counts from a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeReport {
    /// New entries written.
    pub created: u32,
    /// Existing entries cancelled by an overwrite.
    pub replaced: u32,
    /// Planned entries skipped because the slot was taken.
    pub skipped_existing: u32,
    /// Planned entries skipped because the date has passed.
    pub skipped_past: u32,
}

impl RosterData {
    /// Inserts an active entry whose slot is known to be free.
    pub(crate) fn insert_entry(&mut self, entry: ScheduleEntry) {
        if entry.is_active() {
            self.slots.insert(entry.slot(), entry.id);
        }
        self.entries.insert(entry.id, entry);
    }

    /// Writes a new version of an existing entry, keeping the slot index in
    /// step. A slot is only released if it still points at this entry.
    pub(crate) fn replace_entry(&mut self, entry: ScheduleEntry) {
        if let Some(old) = self.entries.get(&entry.id) {
            let old_slot = old.slot();
            if old.is_active() && self.slots.get(&old_slot) == Some(&entry.id) {
                self.slots.remove(&old_slot);
            }
        }
        if entry.is_active() {
            self.slots.insert(entry.slot(), entry.id);
        }
        self.entries.insert(entry.id, entry);
    }

    /// Active entries of `employee_id` on `date`.
    fn active_entries_on(&self, employee_id: &str, date: NaiveDate) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .entries
            .values()
            .filter(|e| e.is_active() && e.employee_id == employee_id && e.date == date)
            .map(|e| e.id)
            .collect();
        ids.sort();
        ids
    }
}

impl RosterStore {
    // ── Schedule entries ──────────────────────────────────────────

    /// Looks up a schedule entry.
    pub fn entry(&self, id: Uuid) -> RosterResult<ScheduleEntry> {
        self.read()?
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| RosterError::not_found("schedule entry", id))
    }

    /// Active entries dated within `range`, ordered by date, shift, employee.
    pub fn entries_in(&self, range: &DateRange) -> RosterResult<Vec<ScheduleEntry>> {
        Ok(self.coverage_snapshot(range)?.entries)
    }

    /// Inserts `entry` unless its (employee, date, shift) slot is taken.
    ///
    /// Returns `true` if the entry was written. Concurrent callers racing on
    /// the same slot see exactly one `true`.
    pub fn insert_if_absent(&self, entry: ScheduleEntry) -> RosterResult<bool> {
        self.transact(|data| {
            if data.slots.contains_key(&entry.slot()) {
                return Ok(false);
            }
            data.insert_entry(entry);
            Ok(true)
        })
    }

    /// Adds a manually assigned entry.
    ///
    /// The employee must exist and the slot must be free; a taken slot is a
    /// [`RosterError::Consistency`].
    pub fn assign_manual(&self, entry: ScheduleEntry) -> RosterResult<ScheduleEntry> {
        let stored = self.transact(|data| {
            if !data.employees.contains_key(&entry.employee_id) {
                return Err(RosterError::not_found("employee", &entry.employee_id));
            }
            if let Some(existing) = data.slots.get(&entry.slot()) {
                return Err(RosterError::consistency(format!(
                    "{} is already scheduled for the {} shift on {} (entry {})",
                    entry.employee_id, entry.shift, entry.date, existing
                )));
            }
            let mut entry = entry;
            entry.status = EntryStatus::Active;
            data.insert_entry(entry.clone());
            Ok(entry)
        })?;
        info!(
            entry_id = %stored.id,
            employee_id = %stored.employee_id,
            date = %stored.date,
            shift = %stored.shift,
            "Manual schedule entry added"
        );
        Ok(stored)
    }

    /// Supervisor edit: hands an active entry to another employee.
    pub fn reassign_entry(&self, entry_id: Uuid, employee_id: &str) -> RosterResult<ScheduleEntry> {
        self.transact(|data| {
            if !data.employees.contains_key(employee_id) {
                return Err(RosterError::not_found("employee", employee_id));
            }
            let entry = data
                .entries
                .get(&entry_id)
                .ok_or_else(|| RosterError::not_found("schedule entry", entry_id))?;
            if !entry.is_active() {
                return Err(RosterError::consistency(format!(
                    "entry {} is cancelled",
                    entry_id
                )));
            }
            let mut updated = entry.clone();
            updated.employee_id = employee_id.to_string();
            if data
                .slots
                .get(&updated.slot())
                .is_some_and(|existing| *existing != entry_id)
            {
                return Err(RosterError::consistency(format!(
                    "{} is already scheduled for the {} shift on {}",
                    employee_id, updated.shift, updated.date
                )));
            }
            data.replace_entry(updated.clone());
            Ok(updated)
        })
    }

    /// Writes planned rotation entries.
    ///
    /// Entries dated before `today` are never written. With
    /// [`MaterializeMode::SkipExisting`] a taken slot is left alone; with
    /// [`MaterializeMode::Overwrite`] the employee's active entries on that
    /// date are cancelled first.
    pub fn apply_materialization(
        &self,
        planned: Vec<ScheduleEntry>,
        today: NaiveDate,
        mode: MaterializeMode,
    ) -> RosterResult<MaterializeReport> {
        let report = self.transact(|data| {
            let mut report = MaterializeReport::default();
            for entry in planned {
                if entry.date < today {
                    report.skipped_past += 1;
                    continue;
                }
                match mode {
                    MaterializeMode::SkipExisting => {
                        if data.slots.contains_key(&entry.slot()) {
                            report.skipped_existing += 1;
                            continue;
                        }
                    }
                    MaterializeMode::Overwrite => {
                        for id in data.active_entries_on(&entry.employee_id, entry.date) {
                            if let Some(existing) = data.entries.get(&id) {
                                let mut cancelled = existing.clone();
                                cancelled.status = EntryStatus::Cancelled;
                                data.replace_entry(cancelled);
                                report.replaced += 1;
                            }
                        }
                    }
                }
                data.insert_entry(entry);
                report.created += 1;
            }
            Ok(report)
        })?;
        info!(
            created = report.created,
            replaced = report.replaced,
            skipped_existing = report.skipped_existing,
            skipped_past = report.skipped_past,
            "Schedule materialized"
        );
        Ok(report)
    }
}
