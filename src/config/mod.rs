//! Configuration loading and management for the crew roster engine.
//!
//! This module loads a facility configuration from YAML files: the crews
//! and engine settings, the rotation pattern catalog, and the skills each
//! position requires.
//!
//! # Example
//!
//! ```no_run
//! use crew_roster::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/facility").unwrap();
//! println!("Loaded facility: {}", config.settings().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CoverageSettings, FacilityConfig, FacilitySettings, OvertimeSettings, PatternDefinition,
    PatternsConfig, PositionCatalog, PositionDefinition, RequirementScope, SkillMismatchPolicy,
    SwapSettings,
};
