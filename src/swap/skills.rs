//! Skill compatibility checks for swaps.

use crate::config::PositionCatalog;
use crate::error::{RosterError, RosterResult};
use crate::models::Employee;

/// Decides which skills an employee lacks for a position.
///
/// The workflow only consults this; it never decides compatibility itself.
pub trait SkillCompatibility: Send + Sync {
    /// Skills `position` requires that `employee` does not hold, ascending.
    fn missing_skills(&self, employee: &Employee, position: &str) -> RosterResult<Vec<String>>;
}

impl SkillCompatibility for PositionCatalog {
    fn missing_skills(&self, employee: &Employee, position: &str) -> RosterResult<Vec<String>> {
        let definition = self
            .positions
            .get(position)
            .ok_or_else(|| RosterError::UnknownPosition {
                position: position.to_string(),
            })?;
        let mut missing: Vec<String> = definition
            .required_skills
            .iter()
            .filter(|skill| !employee.has_skill(skill))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositionDefinition;
    use crate::models::Crew;

    fn catalog() -> PositionCatalog {
        let mut catalog = PositionCatalog::default();
        catalog.skills.extend(["boiler_ticket".to_string(), "dcs".to_string()]);
        catalog.positions.insert(
            "control_room_operator".to_string(),
            PositionDefinition {
                name: "Control Room Operator".to_string(),
                required_skills: vec!["dcs".to_string(), "boiler_ticket".to_string()],
            },
        );
        catalog
    }

    fn employee(skills: &[&str]) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            name: "Ada".to_string(),
            crew: Crew::new("A"),
            position: "operator".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_skills_are_listed_sorted() {
        let missing = catalog()
            .missing_skills(&employee(&[]), "control_room_operator")
            .unwrap();
        assert_eq!(missing, vec!["boiler_ticket", "dcs"]);
    }

    #[test]
    fn test_qualified_employee_has_nothing_missing() {
        let missing = catalog()
            .missing_skills(&employee(&["dcs", "boiler_ticket"]), "control_room_operator")
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unknown_position_is_configuration_error() {
        assert!(matches!(
            catalog().missing_skills(&employee(&[]), "welder"),
            Err(RosterError::UnknownPosition { .. })
        ));
    }
}
