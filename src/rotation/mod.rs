//! Rotation engine.
//!
//! This module contains the pattern catalog, the pure rotation generator,
//! and materialization of generated tables into schedule entries.

mod catalog;
mod generator;
mod materialize;

pub use catalog::{PatternCatalog, RotationPattern, cycle_offset};
pub use generator::{RotationRequest, generate_for_pattern, generate_rotation};
pub use materialize::{materialize, plan_entries};
