//! The swap request state machine.
//!
//! A request is created `pending` and leaves that state exactly once. Every
//! transition runs inside a single store transaction: the status check, the
//! approval flags, and the schedule exchange are decided against the same
//! data and written together, so two concurrent approvals can never both
//! execute the exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{FacilityConfig, SkillMismatchPolicy};
use crate::error::{ErrorClass, RosterError, RosterResult};
use crate::models::{
    Approval, Denial, EntryStatus, ScheduleEntry, SkillWarning, SwapEvent, SwapEventKind,
    SwapRequest, SwapSide, SwapStatus,
};
use crate::store::{RosterData, RosterStore};

use super::skills::SkillCompatibility;

/// A swap submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapProposal {
    /// The employee giving up a shift.
    pub requester_id: String,
    /// The requester's schedule entry.
    pub requester_entry_id: Uuid,
    /// The employee taking the shift, if already known.
    #[serde(default)]
    pub target_id: Option<String>,
    /// The target's entry for an exchange; absent for a give-away.
    #[serde(default)]
    pub target_entry_id: Option<Uuid>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
}

/// Result of an approval action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// The swap after the action.
    pub swap: SwapRequest,
    /// Skill mismatches found for this approval.
    pub warnings: Vec<SkillWarning>,
    /// True if this action executed the schedule change.
    pub executed: bool,
    /// False when the action was a repeat and nothing was recorded.
    pub changed: bool,
}

impl ApprovalOutcome {
    fn unchanged(swap: SwapRequest) -> Self {
        Self {
            swap,
            warnings: Vec::new(),
            executed: false,
            changed: false,
        }
    }
}

/// Drives swap requests through their lifecycle.
///
/// # Example
///
/// ```
/// use crew_roster::config::{PositionCatalog, SkillMismatchPolicy};
/// use crew_roster::store::RosterStore;
/// use crew_roster::swap::SwapWorkflow;
///
/// let store = RosterStore::new();
/// let positions = PositionCatalog::default();
/// let workflow = SwapWorkflow::new(&store, &positions, SkillMismatchPolicy::Warn);
/// assert!(workflow.get(uuid::Uuid::new_v4()).is_err());
/// ```
pub struct SwapWorkflow<'a> {
    store: &'a RosterStore,
    skills: &'a dyn SkillCompatibility,
    policy: SkillMismatchPolicy,
}

impl<'a> SwapWorkflow<'a> {
    /// Creates a workflow over `store`.
    pub fn new(
        store: &'a RosterStore,
        skills: &'a dyn SkillCompatibility,
        policy: SkillMismatchPolicy,
    ) -> Self {
        Self {
            store,
            skills,
            policy,
        }
    }

    /// Creates a workflow using the configured positions and policy.
    pub fn from_config(store: &'a RosterStore, config: &'a FacilityConfig) -> Self {
        Self::new(store, config.positions(), config.settings().swaps.skill_mismatch)
    }

    /// Looks up a swap request.
    pub fn get(&self, swap_id: Uuid) -> RosterResult<SwapRequest> {
        self.store.swap(swap_id)
    }

    /// Submits a new swap request in `pending`.
    ///
    /// # Errors
    ///
    /// - [`RosterError::NotFound`] for an unknown employee or entry
    /// - [`RosterError::Validation`] if an entry belongs to someone else, is
    ///   cancelled, or the proposal names the requester as the target
    /// - [`RosterError::Consistency`] if either entry already has a pending
    ///   swap
    pub fn create(&self, proposal: SwapProposal, at: DateTime<Utc>) -> RosterResult<SwapRequest> {
        let swap = self.store.transact(|data| {
            let requester = data
                .employees
                .get(&proposal.requester_id)
                .ok_or_else(|| RosterError::not_found("employee", &proposal.requester_id))?;
            check_owned_entry(data, proposal.requester_entry_id, &requester.id)?;

            let target = match &proposal.target_id {
                Some(target_id) => {
                    if *target_id == requester.id {
                        return Err(RosterError::validation(
                            "target_id",
                            "a swap needs two different employees",
                        ));
                    }
                    Some(
                        data.employees
                            .get(target_id)
                            .ok_or_else(|| RosterError::not_found("employee", target_id))?,
                    )
                }
                None => None,
            };
            match (proposal.target_entry_id, target) {
                (Some(entry_id), Some(target)) => check_owned_entry(data, entry_id, &target.id)?,
                (Some(_), None) => {
                    return Err(RosterError::validation(
                        "target_entry_id",
                        "a target entry needs a target employee",
                    ));
                }
                (None, _) => {}
            }

            let entry_ids: Vec<Uuid> = std::iter::once(proposal.requester_entry_id)
                .chain(proposal.target_entry_id)
                .collect();
            if let Some(open) = data.swaps.values().find(|s| {
                s.status == SwapStatus::Pending
                    && std::iter::once(s.requester_entry_id)
                        .chain(s.target_entry_id)
                        .any(|id| entry_ids.contains(&id))
            }) {
                return Err(RosterError::consistency(format!(
                    "entry already has pending swap {}",
                    open.id
                )));
            }

            let swap = SwapRequest {
                id: Uuid::new_v4(),
                requester_id: requester.id.clone(),
                requester_crew: requester.crew.clone(),
                requester_entry_id: proposal.requester_entry_id,
                target_id: target.map(|t| t.id.clone()),
                target_crew: target.map(|t| t.crew.clone()),
                target_entry_id: proposal.target_entry_id,
                reason: proposal.reason.clone(),
                status: SwapStatus::Pending,
                requester_approval: Approval::default(),
                target_approval: Approval::default(),
                denial: None,
                created_at: at,
                resolved_at: None,
                history: vec![SwapEvent {
                    at,
                    actor: requester.id.clone(),
                    kind: SwapEventKind::Created,
                }],
            };
            data.swaps.insert(swap.id, swap.clone());
            Ok(swap)
        })?;
        info!(
            swap_id = %swap.id,
            requester_id = %swap.requester_id,
            target_id = swap.target_id.as_deref().unwrap_or("-"),
            cross_crew = swap.is_cross_crew(),
            "Swap request created"
        );
        Ok(swap)
    }

    /// Skill mismatches an approver of `swap_id` would be shown.
    pub fn review(&self, swap_id: Uuid) -> RosterResult<Vec<SkillWarning>> {
        let data = self.store.read()?;
        let swap = data
            .swaps
            .get(&swap_id)
            .ok_or_else(|| RosterError::not_found("swap request", swap_id))?;
        self.skill_warnings(&data, swap)
    }

    /// Records a supervisor's approval.
    ///
    /// The supervisor sets every still-pending flag for a party whose crew
    /// they supervise. Once every required flag is set the swap becomes
    /// `approved` and the schedule change is applied in the same
    /// transaction. Repeating an approval that is already recorded changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`RosterError::PermissionDenied`] if the supervisor has authority
    ///   over no party that needs approval
    /// - [`RosterError::Validation`] if the swap has no target, or a skill
    ///   mismatch is found under the `block` policy
    /// - [`RosterError::Consistency`] if the swap was denied or cancelled,
    ///   or the schedule no longer matches the request
    pub fn approve(
        &self,
        swap_id: Uuid,
        supervisor_id: &str,
        at: DateTime<Utc>,
    ) -> RosterResult<ApprovalOutcome> {
        let result = self
            .store
            .transact(|data| self.record_approval(data, swap_id, supervisor_id, at));
        match &result {
            Ok(outcome) if outcome.changed => {
                for warning in &outcome.warnings {
                    warn!(
                        swap_id = %swap_id,
                        supervisor_id,
                        mismatch = %warning.message(),
                        "Swap approved despite skill mismatch"
                    );
                }
                info!(
                    swap_id = %swap_id,
                    supervisor_id,
                    status = ?outcome.swap.status,
                    executed = outcome.executed,
                    "Swap approval recorded"
                );
            }
            Ok(_) => info!(swap_id = %swap_id, supervisor_id, "Repeated swap approval ignored"),
            Err(err) => log_rejection(swap_id, supervisor_id, "approve", err),
        }
        result
    }

    /// Denies a pending swap. No schedule entry changes.
    ///
    /// The supervisor must have authority over either party's crew.
    /// Denying an already denied swap changes nothing.
    pub fn deny(
        &self,
        swap_id: Uuid,
        supervisor_id: &str,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RosterResult<SwapRequest> {
        let result = self.store.transact(|data| {
            let swap = data
                .swaps
                .get(&swap_id)
                .ok_or_else(|| RosterError::not_found("swap request", swap_id))?;
            let supervisor = data
                .supervisors
                .get(supervisor_id)
                .ok_or_else(|| RosterError::not_found("supervisor", supervisor_id))?;
            let authorized = [SwapSide::Requester, SwapSide::Target]
                .into_iter()
                .filter_map(|side| swap.crew_for(side))
                .any(|crew| supervisor.supervises(crew));
            if !authorized {
                return Err(permission_denied(supervisor_id, swap));
            }
            if !still_open(swap, SwapStatus::Denied)? {
                return Ok(swap.clone());
            }

            let mut updated = swap.clone();
            updated.status = SwapStatus::Denied;
            updated.resolved_at = Some(at);
            updated.denial = Some(Denial {
                supervisor_id: supervisor_id.to_string(),
                denied_at: at,
                notes,
            });
            updated.history.push(SwapEvent {
                at,
                actor: supervisor_id.to_string(),
                kind: SwapEventKind::Denied,
            });
            data.swaps.insert(swap_id, updated.clone());
            Ok(updated)
        });
        match &result {
            Ok(swap) => info!(
                swap_id = %swap_id,
                supervisor_id,
                status = ?swap.status,
                "Swap denied"
            ),
            Err(err) => log_rejection(swap_id, supervisor_id, "deny", err),
        }
        result
    }

    /// Withdraws a pending swap. Only the requester may cancel.
    pub fn cancel(
        &self,
        swap_id: Uuid,
        employee_id: &str,
        at: DateTime<Utc>,
    ) -> RosterResult<SwapRequest> {
        let result = self.store.transact(|data| {
            let swap = data
                .swaps
                .get(&swap_id)
                .ok_or_else(|| RosterError::not_found("swap request", swap_id))?;
            if swap.requester_id != employee_id {
                return Err(permission_denied(employee_id, swap));
            }
            if !still_open(swap, SwapStatus::Cancelled)? {
                return Ok(swap.clone());
            }

            let mut updated = swap.clone();
            updated.status = SwapStatus::Cancelled;
            updated.resolved_at = Some(at);
            updated.history.push(SwapEvent {
                at,
                actor: employee_id.to_string(),
                kind: SwapEventKind::Cancelled,
            });
            data.swaps.insert(swap_id, updated.clone());
            Ok(updated)
        });
        match &result {
            Ok(_) => info!(swap_id = %swap_id, employee_id, "Swap cancelled"),
            Err(err) => log_rejection(swap_id, employee_id, "cancel", err),
        }
        result
    }

    /// The single approval transition.
    fn record_approval(
        &self,
        data: &mut RosterData,
        swap_id: Uuid,
        supervisor_id: &str,
        at: DateTime<Utc>,
    ) -> RosterResult<ApprovalOutcome> {
        let swap = data
            .swaps
            .get(&swap_id)
            .ok_or_else(|| RosterError::not_found("swap request", swap_id))?;
        let supervisor = data
            .supervisors
            .get(supervisor_id)
            .ok_or_else(|| RosterError::not_found("supervisor", supervisor_id))?;

        let authorized: Vec<SwapSide> = swap
            .required_sides()
            .into_iter()
            .filter(|side| swap.crew_for(*side).is_some_and(|c| supervisor.supervises(c)))
            .collect();
        if authorized.is_empty() {
            return Err(permission_denied(supervisor_id, swap));
        }
        if !still_open(swap, SwapStatus::Approved)? {
            return Ok(ApprovalOutcome::unchanged(swap.clone()));
        }
        if swap.target_id.is_none() {
            return Err(RosterError::validation(
                "target_id",
                "an open offer must name a taker before it can be approved",
            ));
        }
        let pending: Vec<SwapSide> = authorized
            .into_iter()
            .filter(|side| !swap.approval(*side).approved)
            .collect();
        if pending.is_empty() {
            return Ok(ApprovalOutcome::unchanged(swap.clone()));
        }

        let warnings = self.skill_warnings(data, swap)?;
        if !warnings.is_empty() && self.policy == SkillMismatchPolicy::Block {
            let detail: Vec<String> = warnings.iter().map(SkillWarning::message).collect();
            return Err(RosterError::validation("skills", detail.join("; ")));
        }

        let mut updated = swap.clone();
        for side in pending {
            *updated.approval_mut(side) = Approval {
                approved: true,
                supervisor_id: Some(supervisor_id.to_string()),
                approved_at: Some(at),
                despite_skill_mismatch: !warnings.is_empty(),
            };
            updated.history.push(SwapEvent {
                at,
                actor: supervisor_id.to_string(),
                kind: SwapEventKind::Approved {
                    side,
                    warnings: warnings.clone(),
                },
            });
        }

        let mut executed = false;
        if updated.fully_approved() {
            let writes = plan_exchange(data, &updated)?;
            for entry in writes {
                data.replace_entry(entry);
            }
            updated.status = SwapStatus::Approved;
            updated.resolved_at = Some(at);
            updated.history.push(SwapEvent {
                at,
                actor: supervisor_id.to_string(),
                kind: SwapEventKind::Executed,
            });
            executed = true;
        }
        data.swaps.insert(swap_id, updated.clone());

        Ok(ApprovalOutcome {
            swap: updated,
            warnings,
            executed,
            changed: true,
        })
    }

    /// Skills each party lacks for the position they would take over.
    fn skill_warnings(
        &self,
        data: &RosterData,
        swap: &SwapRequest,
    ) -> RosterResult<Vec<SkillWarning>> {
        let mut takeovers: Vec<(&str, &ScheduleEntry)> = Vec::new();
        if let Some(entry_id) = swap.target_entry_id {
            takeovers.push((swap.requester_id.as_str(), entry_in(data, entry_id)?));
        }
        if let Some(target_id) = &swap.target_id {
            takeovers.push((target_id.as_str(), entry_in(data, swap.requester_entry_id)?));
        }

        let mut warnings = Vec::new();
        for (employee_id, entry) in takeovers {
            let employee = data
                .employees
                .get(employee_id)
                .ok_or_else(|| RosterError::not_found("employee", employee_id))?;
            let missing = self.skills.missing_skills(employee, &entry.position)?;
            if !missing.is_empty() {
                warnings.push(SkillWarning {
                    employee_id: employee_id.to_string(),
                    position: entry.position.clone(),
                    missing_skills: missing,
                });
            }
        }
        Ok(warnings)
    }
}

fn entry_in(data: &RosterData, entry_id: Uuid) -> RosterResult<&ScheduleEntry> {
    data.entries
        .get(&entry_id)
        .ok_or_else(|| RosterError::not_found("schedule entry", entry_id))
}

fn check_owned_entry(data: &RosterData, entry_id: Uuid, employee_id: &str) -> RosterResult<()> {
    let entry = entry_in(data, entry_id)?;
    if entry.employee_id != employee_id {
        return Err(RosterError::validation(
            "entry_id",
            format!("entry {} does not belong to {}", entry_id, employee_id),
        ));
    }
    if !entry.is_active() {
        return Err(RosterError::validation(
            "entry_id",
            format!("entry {} is cancelled", entry_id),
        ));
    }
    Ok(())
}

/// Active entry `entry_id`, still held by `employee_id`.
fn current_entry<'d>(
    data: &'d RosterData,
    entry_id: Uuid,
    employee_id: &str,
) -> RosterResult<&'d ScheduleEntry> {
    let entry = entry_in(data, entry_id)?;
    if !entry.is_active() || entry.employee_id != employee_id {
        return Err(RosterError::consistency(format!(
            "entry {} changed since the swap was requested",
            entry_id
        )));
    }
    Ok(entry)
}

/// Checks that `entry` can take its slot, which may currently be held by
/// the entry `vacating` it in the same change.
fn check_slot_free(
    data: &RosterData,
    entry: &ScheduleEntry,
    vacating: Option<Uuid>,
) -> RosterResult<()> {
    match data.slots.get(&entry.slot()) {
        Some(holder) if Some(*holder) != vacating => Err(RosterError::consistency(format!(
            "{} already works the {} shift on {}",
            entry.employee_id, entry.shift, entry.date
        ))),
        _ => Ok(()),
    }
}

/// The entry writes that execute a fully approved swap.
///
/// Nothing is written here; the caller applies the returned entries only
/// after every check has passed.
fn plan_exchange(data: &RosterData, swap: &SwapRequest) -> RosterResult<Vec<ScheduleEntry>> {
    let target_id = swap.target_id.as_deref().ok_or_else(|| {
        RosterError::validation(
            "target_id",
            "an open offer must name a taker before it can be approved",
        )
    })?;
    let requester_entry = current_entry(data, swap.requester_entry_id, &swap.requester_id)?;

    match swap.target_entry_id {
        Some(target_entry_id) => {
            let target_entry = current_entry(data, target_entry_id, target_id)?;
            let mut to_target = requester_entry.clone();
            to_target.employee_id = target_id.to_string();
            let mut to_requester = target_entry.clone();
            to_requester.employee_id = swap.requester_id.clone();
            check_slot_free(data, &to_target, Some(target_entry.id))?;
            check_slot_free(data, &to_requester, Some(requester_entry.id))?;
            Ok(vec![to_target, to_requester])
        }
        None => {
            let mut given = ScheduleEntry::new(
                target_id,
                requester_entry.date,
                requester_entry.shift,
                requester_entry.position.clone(),
                requester_entry.crew.clone(),
            );
            given.overtime = true;
            check_slot_free(data, &given, None)?;
            let mut released = requester_entry.clone();
            released.status = EntryStatus::Cancelled;
            Ok(vec![released, given])
        }
    }
}

/// `Ok(true)` while the swap is pending and `Ok(false)` when it already
/// holds `repeated`, so a repeated action is a no-op. Any other terminal
/// status is a consistency error.
fn still_open(swap: &SwapRequest, repeated: SwapStatus) -> RosterResult<bool> {
    if !swap.status.is_terminal() {
        return Ok(true);
    }
    if swap.status == repeated {
        return Ok(false);
    }
    Err(RosterError::consistency(format!(
        "swap {} is already {:?}",
        swap.id, swap.status
    )))
}

fn permission_denied(actor: &str, swap: &SwapRequest) -> RosterError {
    RosterError::PermissionDenied {
        actor: actor.to_string(),
        scope: format!("swap {}", swap.id),
    }
}

fn log_rejection(swap_id: Uuid, actor: &str, action: &str, err: &RosterError) {
    match err.class() {
        ErrorClass::Permission | ErrorClass::Consistency | ErrorClass::Validation => {
            warn!(swap_id = %swap_id, actor, action, error = %err, "Swap action rejected")
        }
        _ => info!(swap_id = %swap_id, actor, action, error = %err, "Swap action failed"),
    }
}
