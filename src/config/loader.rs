//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a facility
//! configuration from YAML files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{RosterError, RosterResult};
use crate::rotation::{PatternCatalog, RotationPattern};

use super::types::{
    FacilityConfig, FacilitySettings, PatternsConfig, PositionCatalog, PositionDefinition,
};

/// Loads and provides access to a facility configuration.
///
/// # Directory Structure
///
/// ```text
/// config/facility/
/// ├── facility.yaml   # Name, crews, coverage/overtime/swap settings
/// ├── patterns.yaml   # Rotation pattern catalog
/// └── positions.yaml  # Skills and per-position requirements
/// ```
///
/// # Example
///
/// ```no_run
/// use crew_roster::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/facility").unwrap();
/// let pattern = loader.pattern("4-on-4-off").unwrap();
/// println!("{} has a {} day cycle", pattern.name(), pattern.cycle_length());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: FacilityConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// - [`RosterError::ConfigNotFound`] if a file is missing
    /// - [`RosterError::ConfigParseError`] if a file is not valid YAML or
    ///   fails validation (bad pattern rows, unknown crews, undeclared
    ///   skills)
    pub fn load<P: AsRef<Path>>(path: P) -> RosterResult<Self> {
        let path = path.as_ref();

        let facility_path = path.join("facility.yaml");
        let settings = Self::load_yaml::<FacilitySettings>(&facility_path)?;
        Self::validate_crews(&settings)
            .map_err(|message| parse_error(&facility_path, message))?;

        let positions_path = path.join("positions.yaml");
        let positions = Self::load_yaml::<PositionCatalog>(&positions_path)?;
        Self::validate_positions(&positions)
            .map_err(|message| parse_error(&positions_path, message))?;

        let patterns_path = path.join("patterns.yaml");
        let patterns_config = Self::load_yaml::<PatternsConfig>(&patterns_path)?;
        let patterns = PatternCatalog::from_definitions(&patterns_config.patterns, &settings.crews)
            .map_err(|e| parse_error(&patterns_path, e.to_string()))?;

        Ok(Self {
            config: FacilityConfig::new(settings, patterns, positions),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> RosterResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| RosterError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| RosterError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_crews(settings: &FacilitySettings) -> Result<(), String> {
        if settings.crews.is_empty() {
            return Err("at least one crew must be configured".to_string());
        }
        let mut seen = BTreeSet::new();
        for crew in &settings.crews {
            if crew.as_str().trim().is_empty() {
                return Err("crew identifiers must not be empty".to_string());
            }
            if !seen.insert(crew) {
                return Err(format!("crew {} is listed twice", crew));
            }
        }
        Ok(())
    }

    fn validate_positions(positions: &PositionCatalog) -> Result<(), String> {
        for (code, definition) in &positions.positions {
            if let Some(skill) = definition
                .required_skills
                .iter()
                .find(|s| !positions.skills.contains(*s))
            {
                let error = RosterError::UnknownSkill {
                    skill: skill.clone(),
                };
                return Err(format!("{} (required by position '{}')", error, code));
            }
        }
        Ok(())
    }

    /// Returns the underlying facility configuration.
    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Returns the facility settings.
    pub fn settings(&self) -> &FacilitySettings {
        self.config.settings()
    }

    /// Returns the position catalog.
    pub fn positions(&self) -> &PositionCatalog {
        self.config.positions()
    }

    /// Gets a rotation pattern by name.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use crew_roster::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/facility")?;
    /// let pattern = loader.pattern("dupont")?;
    /// assert_eq!(pattern.cycle_length(), 28);
    /// # Ok::<(), crew_roster::error::RosterError>(())
    /// ```
    pub fn pattern(&self, name: &str) -> RosterResult<&RotationPattern> {
        self.config.patterns().get(name)
    }

    /// Gets a position definition by code.
    pub fn position(&self, code: &str) -> RosterResult<&PositionDefinition> {
        self.positions()
            .positions
            .get(code)
            .ok_or_else(|| RosterError::UnknownPosition {
                position: code.to_string(),
            })
    }
}

fn parse_error(path: &Path, message: impl Into<String>) -> RosterError {
    RosterError::ConfigParseError {
        path: path.display().to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RequirementScope, SkillMismatchPolicy};
    use crate::models::{Crew, ShiftLabel};
    use std::path::PathBuf;

    fn config_path() -> &'static str {
        "./config/facility"
    }

    /// Writes a config directory under the system temp dir.
    fn scratch_dir(name: &str, facility: &str, patterns: &str, positions: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crew-roster-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("facility.yaml"), facility).unwrap();
        fs::write(dir.join("patterns.yaml"), patterns).unwrap();
        fs::write(dir.join("positions.yaml"), positions).unwrap();
        dir
    }

    const FACILITY: &str = "name: Test Plant\ncrews: [A, B]\n";
    const PATTERNS: &str = "\
patterns:
  - name: alternate
    cycle_length: 2
    crews:
      A: DO
      B: OD
";
    const POSITIONS: &str = "skills: [dcs]\npositions:\n  operator:\n    name: Operator\n";

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().crews.len(), 4);
        assert_eq!(loader.config().patterns().len(), 4);
        assert_eq!(loader.settings().coverage.critical_gap_threshold, 2);
        assert_eq!(
            loader.settings().coverage.requirement_scope,
            RequirementScope::PerCrew
        );
        assert_eq!(loader.settings().swaps.skill_mismatch, SkillMismatchPolicy::Warn);
    }

    #[test]
    fn test_shipped_patterns_have_expected_cycles() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        for (name, cycle) in [
            ("4-on-4-off", 8),
            ("2-2-3", 14),
            ("dupont", 28),
            ("southern-swing", 28),
        ] {
            assert_eq!(loader.pattern(name).unwrap().cycle_length(), cycle, "{}", name);
        }
        let southern = loader.pattern("southern-swing").unwrap();
        assert_eq!(southern.label_at(&Crew::new("A"), 9), Some(ShiftLabel::Evening));
    }

    #[test]
    fn test_shipped_positions_declare_skills() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let position = loader.position("control_room_operator").unwrap();
        assert!(position.required_skills.contains(&"dcs".to_string()));
        assert!(matches!(
            loader.position("astronaut"),
            Err(RosterError::UnknownPosition { .. })
        ));
    }

    #[test]
    fn test_unknown_pattern_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        match loader.pattern("5-on-2-off") {
            Err(RosterError::PatternNotFound { name }) => assert_eq!(name, "5-on-2-off"),
            other => panic!("Expected PatternNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(RosterError::ConfigNotFound { path }) => {
                assert!(path.contains("facility.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_directory_loads() {
        let dir = scratch_dir("minimal", FACILITY, PATTERNS, POSITIONS);
        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.pattern("alternate").unwrap().cycle_length(), 2);
    }

    #[test]
    fn test_short_pattern_row_names_patterns_file() {
        let patterns = "\
patterns:
  - name: broken
    cycle_length: 3
    crews:
      A: DO
      B: ODD
";
        let dir = scratch_dir("short-row", FACILITY, patterns, POSITIONS);
        match ConfigLoader::load(&dir) {
            Err(RosterError::ConfigParseError { path, message }) => {
                assert!(path.ends_with("patterns.yaml"));
                assert!(message.contains("broken"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_pattern_crew_must_be_configured() {
        let patterns = "patterns:\n  - name: stray\n    cycle_length: 1\n    crews:\n      Z: D\n";
        let dir = scratch_dir("stray-crew", FACILITY, patterns, POSITIONS);
        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(RosterError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_undeclared_skill_is_rejected() {
        let positions = "\
skills: []
positions:
  operator:
    name: Operator
    required_skills: [dcs]
";
        let dir = scratch_dir("undeclared-skill", FACILITY, PATTERNS, positions);
        match ConfigLoader::load(&dir) {
            Err(RosterError::ConfigParseError { path, message }) => {
                assert!(path.ends_with("positions.yaml"));
                assert!(message.contains("dcs"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_crew_is_rejected() {
        let dir = scratch_dir("dup-crew", "name: X\ncrews: [A, A]\n", PATTERNS, POSITIONS);
        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(RosterError::ConfigParseError { .. })
        ));
    }
}
