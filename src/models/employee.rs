//! Employee and supervisor models.
//!
//! This module defines the directory records the engines read to resolve
//! an employee's crew, position, and skills, and a supervisor's authority.

use serde::{Deserialize, Serialize};

use super::Crew;

/// Represents an employee assigned to a crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The crew the employee rotates with.
    pub crew: Crew,
    /// The position the employee normally staffs (e.g. "operator").
    pub position: String,
    /// Skills and qualifications held (e.g. "forklift", "boiler_license").
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Employee {
    /// Returns true if the employee holds the named skill.
    ///
    /// # Examples
    ///
    /// ```
    /// use crew_roster::models::{Crew, Employee};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Ada Park".to_string(),
    ///     crew: Crew::new("A"),
    ///     position: "operator".to_string(),
    ///     skills: vec!["control_room".to_string()],
    /// };
    /// assert!(employee.has_skill("control_room"));
    /// assert!(!employee.has_skill("boiler_license"));
    /// ```
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// A supervisor and the crews they have authority over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supervisor {
    /// Unique identifier for the supervisor.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Crews this supervisor may approve or deny for.
    pub crews: Vec<Crew>,
}

impl Supervisor {
    /// Returns true if the supervisor has authority over `crew`.
    pub fn supervises(&self, crew: &Crew) -> bool {
        self.crews.contains(crew)
    }
}
