//! Shift swap workflow.
//!
//! Swaps need approval from the supervisor of each affected crew. Skill
//! compatibility is checked through the [`SkillCompatibility`] trait and
//! surfaced to approvers as warnings.

mod skills;
mod workflow;

pub use skills::SkillCompatibility;
pub use workflow::{ApprovalOutcome, SwapProposal, SwapWorkflow};
