//! Keyed staffing-requirement lookup.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::PositionCatalog;
use crate::error::{RosterError, RosterResult};
use crate::models::{Crew, CrewScope, ShiftLabel, StaffingRequirement};

type RequirementKey = (String, ShiftLabel, CrewScope);

/// Staffing requirements keyed by (position, shift, crew scope).
///
/// A missing key means "no requirement": the combination is skipped, never
/// reported as a zero requirement.
#[derive(Debug, Clone, Default)]
pub struct RequirementIndex {
    by_key: BTreeMap<RequirementKey, u32>,
}

impl RequirementIndex {
    /// Builds the index, checking every position against the catalog.
    ///
    /// # Errors
    ///
    /// - [`RosterError::UnknownPosition`] for a position not in `positions`
    /// - [`RosterError::Validation`] for two requirements with the same key
    ///   or one on the off label
    pub fn build(
        requirements: &[StaffingRequirement],
        positions: &PositionCatalog,
    ) -> RosterResult<Self> {
        let mut by_key = BTreeMap::new();
        for requirement in requirements {
            if !positions.contains(&requirement.position) {
                return Err(RosterError::UnknownPosition {
                    position: requirement.position.clone(),
                });
            }
            if !requirement.shift.is_working() {
                return Err(RosterError::validation(
                    "requirement.shift",
                    format!("{} has a requirement on the off label", requirement.position),
                ));
            }
            let key = (
                requirement.position.clone(),
                requirement.shift,
                requirement.scope.clone(),
            );
            if by_key.insert(key, requirement.minimum).is_some() {
                return Err(RosterError::validation(
                    "requirement",
                    format!(
                        "duplicate requirement for {} on the {} shift",
                        requirement.position, requirement.shift
                    ),
                ));
            }
        }
        Ok(Self { by_key })
    }

    /// The minimum for `position` on `shift` worked by `crew`.
    ///
    /// A requirement scoped to `crew` wins over the all-crews one.
    pub fn lookup(&self, position: &str, shift: ShiftLabel, crew: &Crew) -> Option<u32> {
        self.crew_scoped(position, shift, crew)
            .or_else(|| self.shift_wide(position, shift))
    }

    /// The all-crews minimum for `position` on `shift`.
    pub fn shift_wide(&self, position: &str, shift: ShiftLabel) -> Option<u32> {
        self.by_key
            .get(&(position.to_string(), shift, CrewScope::AllCrews))
            .copied()
    }

    /// The minimum scoped to `crew` for `position` on `shift`.
    pub fn crew_scoped(&self, position: &str, shift: ShiftLabel, crew: &Crew) -> Option<u32> {
        self.by_key
            .get(&(position.to_string(), shift, CrewScope::Crew(crew.clone())))
            .copied()
    }

    /// Positions with any requirement on `shift`, ascending.
    pub fn positions_for(&self, shift: ShiftLabel) -> BTreeSet<&str> {
        self.by_key
            .keys()
            .filter(|(_, s, _)| *s == shift)
            .map(|(position, _, _)| position.as_str())
            .collect()
    }

    /// Returns true if the index holds no requirements.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
