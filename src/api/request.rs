//! Request types for the crew roster API.
//!
//! Rotation generation and swap creation take the engine's own input types
//! ([`crate::rotation::RotationRequest`], [`crate::swap::SwapProposal`]);
//! the rest are defined here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Crew, OvertimeWeek};
use crate::rotation::RotationRequest;
use crate::store::MaterializeMode;

/// Request body for `POST /rotation/materialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeRequest {
    /// The rotation to generate and persist.
    #[serde(flatten)]
    pub rotation: RotationRequest,
    /// Dates before this are not written. Defaults to the server date and
    /// may not be earlier than it.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// How existing entries are treated.
    #[serde(default)]
    pub mode: MaterializeMode,
}

/// A rotation overlaid on a coverage query, so crews the pattern puts on
/// shift count as on duty before entries are materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationOverlay {
    /// Pattern name.
    pub pattern: String,
    /// The date at cycle offset zero.
    pub anchor_date: NaiveDate,
}

/// Request body for `POST /coverage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRequest {
    /// First date (inclusive).
    pub start_date: NaiveDate,
    /// Last date (inclusive).
    pub end_date: NaiveDate,
    /// Restrict to these crews.
    #[serde(default)]
    pub crews: Option<Vec<Crew>>,
    /// Reference date for today's absences and the lookahead. Defaults to
    /// the current UTC date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// Optional rotation overlay.
    #[serde(default)]
    pub rotation: Option<RotationOverlay>,
}

/// Request body for `POST /swaps/{id}/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveSwapRequest {
    /// The approving supervisor.
    pub supervisor_id: String,
}

/// Request body for `POST /swaps/{id}/deny`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenySwapRequest {
    /// The denying supervisor.
    pub supervisor_id: String,
    /// Optional reason shown to the employees.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `POST /swaps/{id}/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSwapRequest {
    /// The requester withdrawing the swap.
    pub employee_id: String,
}

/// Query string for `GET /overtime/{employee_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvertimeParams {
    /// Window end; defaults to the current week.
    #[serde(default)]
    pub as_of_week: Option<NaiveDate>,
}

/// Request body for `POST /overtime/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeImportRequest {
    /// Weekly rows from the payroll feed.
    pub rows: Vec<OvertimeWeek>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_request_flattens_rotation() {
        let json = r#"{
            "pattern": "4-on-4-off",
            "crews": ["A", "B"],
            "start_date": "2025-01-06",
            "end_date": "2025-01-19",
            "anchor_date": "2025-01-06",
            "mode": "overwrite"
        }"#;
        let request: MaterializeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.rotation.pattern, "4-on-4-off");
        assert_eq!(request.rotation.crews.len(), 2);
        assert_eq!(request.mode, MaterializeMode::Overwrite);
        assert!(request.today.is_none());
    }

    #[test]
    fn test_coverage_request_optional_fields() {
        let json = r#"{"start_date": "2025-01-06", "end_date": "2025-01-06"}"#;
        let request: CoverageRequest = serde_json::from_str(json).unwrap();
        assert!(request.crews.is_none());
        assert!(request.rotation.is_none());
    }

    #[test]
    fn test_overtime_import_parses_string_hours() {
        let json = r#"{"rows": [{
            "employee_id": "emp_001",
            "week_start": "2025-03-31",
            "regular_hours": "40",
            "overtime_hours": "6.5"
        }]}"#;
        let request: OvertimeImportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.rows[0].overtime_hours.to_string(), "6.5");
    }
}
