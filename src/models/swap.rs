//! Shift swap request models.
//!
//! A [`SwapRequest`] moves through a small state machine: it is created
//! `pending`, and leaves that state exactly once, to `approved`, `denied`,
//! or `cancelled`. Approval is tracked per party with two independent
//! [`Approval`] flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Crew;

/// Status of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Awaiting supervisor decisions.
    Pending,
    /// All required approvals recorded; entries exchanged.
    Approved,
    /// Refused by a supervisor.
    Denied,
    /// Withdrawn by the requester.
    Cancelled,
}

impl SwapStatus {
    /// Returns true once the request can no longer change.
    pub fn is_terminal(self) -> bool {
        self != SwapStatus::Pending
    }
}

/// One party of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapSide {
    /// The employee who asked for the swap.
    Requester,
    /// The employee taking the requester's shift.
    Target,
}

/// A supervisor's sign-off for one side of a swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Whether this side has been approved.
    pub approved: bool,
    /// The approving supervisor.
    pub supervisor_id: Option<String>,
    /// When the approval was recorded.
    pub approved_at: Option<DateTime<Utc>>,
    /// Set when the supervisor approved despite a skill mismatch.
    pub despite_skill_mismatch: bool,
}

/// A skill gap found while reviewing a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillWarning {
    /// The employee who would take over the shift.
    pub employee_id: String,
    /// The position of the shift they would take over.
    pub position: String,
    /// Required skills the employee does not hold.
    pub missing_skills: Vec<String>,
}

impl SkillWarning {
    /// A one-line description suitable for display to a supervisor.
    pub fn message(&self) -> String {
        format!(
            "{} lacks {} required for {}",
            self.employee_id,
            self.missing_skills.join(", "),
            self.position
        )
    }
}

/// What happened at one point in a swap's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwapEventKind {
    /// The request was submitted.
    Created,
    /// One side was approved.
    Approved {
        /// The side approved.
        side: SwapSide,
        /// Skill gaps the approver was shown.
        warnings: Vec<SkillWarning>,
    },
    /// The schedule entries were exchanged.
    Executed,
    /// The request was denied.
    Denied,
    /// The request was withdrawn.
    Cancelled,
}

/// An audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Who did it.
    pub actor: String,
    /// What happened.
    #[serde(flatten)]
    pub kind: SwapEventKind,
}

/// Details recorded when a swap is denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// The denying supervisor.
    pub supervisor_id: String,
    /// When the denial was recorded.
    pub denied_at: DateTime<Utc>,
    /// Optional explanation.
    pub notes: Option<String>,
}

/// An employee-initiated request to exchange or give away a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The employee asking for the swap.
    pub requester_id: String,
    /// The requester's crew at submission.
    pub requester_crew: Crew,
    /// The schedule entry the requester wants to hand over.
    pub requester_entry_id: Uuid,
    /// The employee taking the shift, if named.
    pub target_id: Option<String>,
    /// The target's crew at submission.
    pub target_crew: Option<Crew>,
    /// The target's entry handed back to the requester, if this is an exchange.
    pub target_entry_id: Option<Uuid>,
    /// Why the swap is requested.
    pub reason: String,
    /// Current status.
    pub status: SwapStatus,
    /// Sign-off by a supervisor of the requester's crew.
    pub requester_approval: Approval,
    /// Sign-off by a supervisor of the target's crew.
    pub target_approval: Approval,
    /// Present once denied.
    pub denial: Option<Denial>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the request reached a terminal status.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Audit log, oldest first.
    pub history: Vec<SwapEvent>,
}

impl SwapRequest {
    /// Returns true when the two parties belong to different crews.
    pub fn is_cross_crew(&self) -> bool {
        self.target_crew
            .as_ref()
            .is_some_and(|crew| *crew != self.requester_crew)
    }

    /// The sides whose approval is needed before the swap can execute.
    pub fn required_sides(&self) -> Vec<SwapSide> {
        if self.is_cross_crew() {
            vec![SwapSide::Requester, SwapSide::Target]
        } else {
            vec![SwapSide::Requester]
        }
    }

    /// The crew whose supervisor signs off for `side`.
    pub fn crew_for(&self, side: SwapSide) -> Option<&Crew> {
        match side {
            SwapSide::Requester => Some(&self.requester_crew),
            SwapSide::Target => self.target_crew.as_ref(),
        }
    }

    /// The approval flag for `side`.
    pub fn approval(&self, side: SwapSide) -> &Approval {
        match side {
            SwapSide::Requester => &self.requester_approval,
            SwapSide::Target => &self.target_approval,
        }
    }

    /// Mutable access to the approval flag for `side`.
    pub fn approval_mut(&mut self, side: SwapSide) -> &mut Approval {
        match side {
            SwapSide::Requester => &mut self.requester_approval,
            SwapSide::Target => &mut self.target_approval,
        }
    }

    /// Returns true once every required side has been approved.
    pub fn fully_approved(&self) -> bool {
        self.required_sides()
            .into_iter()
            .all(|side| self.approval(side).approved)
    }
}
