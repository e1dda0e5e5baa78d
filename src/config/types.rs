//! Configuration types for the facility.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Crew;
use crate::rotation::PatternCatalog;

/// How all-crews staffing requirements are counted when several crews work
/// the same shift on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementScope {
    /// The minimum applies to each on-duty crew separately.
    #[default]
    PerCrew,
    /// The minimum applies once to the combined staff of all on-duty crews.
    ShiftTotal,
}

/// What happens when an approver reviews a swap with a skill mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillMismatchPolicy {
    /// Show the mismatch and record it if the approval goes ahead.
    #[default]
    Warn,
    /// Refuse the approval.
    Block,
}

fn default_critical_gap_threshold() -> u32 {
    2
}

fn default_lookahead_days() -> u32 {
    7
}

fn default_weekly_ceiling() -> Decimal {
    Decimal::from(20)
}

fn default_hard_weekly_limit() -> Decimal {
    Decimal::from(60)
}

/// Coverage engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSettings {
    /// A single gap at or above this many staff is critical.
    #[serde(default = "default_critical_gap_threshold")]
    pub critical_gap_threshold: u32,
    /// How all-crews requirements are counted.
    #[serde(default)]
    pub requirement_scope: RequirementScope,
    /// Days covered by the upcoming-absence projection.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
}

impl Default for CoverageSettings {
    fn default() -> Self {
        Self {
            critical_gap_threshold: default_critical_gap_threshold(),
            requirement_scope: RequirementScope::default(),
            lookahead_days: default_lookahead_days(),
        }
    }
}

/// Overtime alert settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSettings {
    /// Weekly overtime hours at which an employee is flagged.
    #[serde(default = "default_weekly_ceiling")]
    pub weekly_ceiling: Decimal,
    /// Hard limit on total weekly hours.
    #[serde(default = "default_hard_weekly_limit")]
    pub hard_weekly_limit: Decimal,
}

impl Default for OvertimeSettings {
    fn default() -> Self {
        Self {
            weekly_ceiling: default_weekly_ceiling(),
            hard_weekly_limit: default_hard_weekly_limit(),
        }
    }
}

/// Swap workflow settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSettings {
    /// Behaviour on skill mismatch.
    #[serde(default)]
    pub skill_mismatch: SkillMismatchPolicy,
}

/// Facility settings from `facility.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitySettings {
    /// The facility's display name.
    pub name: String,
    /// The crews that rotate through shifts.
    pub crews: Vec<Crew>,
    /// Coverage engine settings.
    #[serde(default)]
    pub coverage: CoverageSettings,
    /// Overtime alert settings.
    #[serde(default)]
    pub overtime: OvertimeSettings,
    /// Swap workflow settings.
    #[serde(default)]
    pub swaps: SwapSettings,
}

/// A rotation pattern as written in `patterns.yaml`.
///
/// Each crew row is a code string with one character per cycle day:
/// `D` day, `E` evening, `N` night, `O` off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternDefinition {
    /// Unique pattern name (e.g. "4-on-4-off").
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Length of the cycle in days.
    pub cycle_length: u32,
    /// Per-crew shift codes.
    pub crews: BTreeMap<Crew, String>,
}

/// Patterns file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternsConfig {
    /// The pattern definitions.
    pub patterns: Vec<PatternDefinition>,
}

/// A position and the skills required to staff it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDefinition {
    /// Human-readable name.
    pub name: String,
    /// Skills an employee must hold to take a shift in this position.
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Positions file structure from `positions.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PositionCatalog {
    /// Every skill the facility tracks.
    pub skills: BTreeSet<String>,
    /// Map of position code to definition.
    pub positions: BTreeMap<String, PositionDefinition>,
}

impl PositionCatalog {
    /// Returns true if `position` is configured.
    pub fn contains(&self, position: &str) -> bool {
        self.positions.contains_key(position)
    }
}

/// The complete facility configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct FacilityConfig {
    settings: FacilitySettings,
    patterns: PatternCatalog,
    positions: PositionCatalog,
}

impl FacilityConfig {
    /// Creates a FacilityConfig from its component parts.
    pub fn new(
        settings: FacilitySettings,
        patterns: PatternCatalog,
        positions: PositionCatalog,
    ) -> Self {
        Self {
            settings,
            patterns,
            positions,
        }
    }

    /// Returns the facility settings.
    pub fn settings(&self) -> &FacilitySettings {
        &self.settings
    }

    /// Returns the pattern catalog.
    pub fn patterns(&self) -> &PatternCatalog {
        &self.patterns
    }

    /// Returns the position catalog.
    pub fn positions(&self) -> &PositionCatalog {
        &self.positions
    }
}
