//! Coverage engine.
//!
//! Layers approved absences and staffing requirements over the schedule and
//! reports per (date, shift, position) gaps. Every function here is a read:
//! nothing in this module mutates schedule, absence, or requirement data.

mod gaps;
mod lookahead;
mod report;
mod requirements;

pub use gaps::{CoverageQuery, compute_gaps, group_by_crew, summarize};
pub use lookahead::{absent_on, upcoming_absences};
pub use report::{build_report, coverage_report};
pub use requirements::RequirementIndex;
