//! Rotation patterns and the pattern catalog.
//!
//! A [`RotationPattern`] maps every (crew, offset-within-cycle) pair to
//! exactly one [`ShiftLabel`]. Patterns are immutable once built; the
//! [`PatternCatalog`] looks them up by name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PatternDefinition;
use crate::error::{RosterError, RosterResult};
use crate::models::{Crew, ShiftLabel};

/// A named, cyclic shift rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPattern {
    name: String,
    description: String,
    cycle_length: u32,
    table: BTreeMap<Crew, Vec<ShiftLabel>>,
}

impl RotationPattern {
    /// Builds a pattern, checking that every crew has exactly one label per
    /// cycle day.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use crew_roster::models::{Crew, ShiftLabel};
    /// use crew_roster::rotation::RotationPattern;
    ///
    /// let mut table = BTreeMap::new();
    /// table.insert(Crew::new("A"), vec![ShiftLabel::Day, ShiftLabel::Off]);
    /// table.insert(Crew::new("B"), vec![ShiftLabel::Off, ShiftLabel::Day]);
    ///
    /// let pattern = RotationPattern::new("alternate", "", 2, table).unwrap();
    /// assert_eq!(pattern.label_at(&Crew::new("B"), 1), Some(ShiftLabel::Day));
    /// ```
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        cycle_length: u32,
        table: BTreeMap<Crew, Vec<ShiftLabel>>,
    ) -> RosterResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RosterError::validation("pattern.name", "must not be empty"));
        }
        if cycle_length == 0 {
            return Err(RosterError::validation(
                "pattern.cycle_length",
                format!("pattern '{}' has a zero-length cycle", name),
            ));
        }
        if table.is_empty() {
            return Err(RosterError::validation(
                "pattern.crews",
                format!("pattern '{}' defines no crews", name),
            ));
        }
        for (crew, labels) in &table {
            if labels.len() != cycle_length as usize {
                return Err(RosterError::validation(
                    "pattern.crews",
                    format!(
                        "pattern '{}' crew {} has {} days, expected {}",
                        name,
                        crew,
                        labels.len(),
                        cycle_length
                    ),
                ));
            }
        }
        Ok(Self {
            name,
            description: description.into(),
            cycle_length,
            table,
        })
    }

    /// Builds a pattern from its YAML definition.
    pub fn from_definition(definition: &PatternDefinition) -> RosterResult<Self> {
        let mut table = BTreeMap::new();
        for (crew, codes) in &definition.crews {
            let labels = codes
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| {
                    ShiftLabel::from_code(c).ok_or_else(|| {
                        RosterError::validation(
                            "pattern.crews",
                            format!(
                                "pattern '{}' crew {} has unknown shift code '{}'",
                                definition.name, crew, c
                            ),
                        )
                    })
                })
                .collect::<RosterResult<Vec<_>>>()?;
            table.insert(crew.clone(), labels);
        }
        Self::new(
            definition.name.clone(),
            definition.description.clone(),
            definition.cycle_length,
            table,
        )
    }

    /// The pattern name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Length of the cycle in days.
    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Crews covered by the pattern, ascending.
    pub fn crews(&self) -> impl Iterator<Item = &Crew> {
        self.table.keys()
    }

    /// Returns true if the pattern defines a row for `crew`.
    pub fn covers(&self, crew: &Crew) -> bool {
        self.table.contains_key(crew)
    }

    /// The label for `crew` at `offset` within the cycle.
    pub fn label_at(&self, crew: &Crew, offset: u32) -> Option<ShiftLabel> {
        self.table
            .get(crew)
            .and_then(|labels| labels.get(offset as usize))
            .copied()
    }

    /// The position of `date` within the cycle anchored at `anchor`.
    ///
    /// Dates before the anchor wrap backwards into the cycle, so the offset
    /// is always in `0..cycle_length`.
    pub fn offset_for(&self, anchor: NaiveDate, date: NaiveDate) -> u32 {
        cycle_offset(anchor, date, self.cycle_length)
    }
}

/// Non-negative offset of `date` within a cycle of `cycle_length` days that
/// starts at `anchor`.
///
/// ```
/// use crew_roster::rotation::cycle_offset;
/// use chrono::NaiveDate;
///
/// let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let before = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
/// assert_eq!(cycle_offset(anchor, before, 8), 7);
/// ```
pub fn cycle_offset(anchor: NaiveDate, date: NaiveDate, cycle_length: u32) -> u32 {
    let days = (date - anchor).num_days();
    days.rem_euclid(i64::from(cycle_length.max(1))) as u32
}

/// The named rotation patterns available to a facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternCatalog {
    patterns: BTreeMap<String, RotationPattern>,
}

impl PatternCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from YAML definitions.
    ///
    /// Every crew a pattern names must be one of `crews`, and pattern names
    /// must be unique.
    pub fn from_definitions(
        definitions: &[PatternDefinition],
        crews: &[Crew],
    ) -> RosterResult<Self> {
        let mut catalog = Self::new();
        for definition in definitions {
            let pattern = RotationPattern::from_definition(definition)?;
            if let Some(unknown) = pattern.crews().find(|c| !crews.contains(c)) {
                return Err(RosterError::UnknownCrew {
                    crew: unknown.to_string(),
                    message: format!(
                        "pattern '{}' names a crew that is not configured",
                        pattern.name()
                    ),
                });
            }
            catalog.insert(pattern)?;
        }
        Ok(catalog)
    }

    /// Adds a pattern, rejecting a duplicate name.
    pub fn insert(&mut self, pattern: RotationPattern) -> RosterResult<()> {
        if self.patterns.contains_key(pattern.name()) {
            return Err(RosterError::validation(
                "pattern.name",
                format!("duplicate pattern '{}'", pattern.name()),
            ));
        }
        self.patterns.insert(pattern.name().to_string(), pattern);
        Ok(())
    }

    /// Looks up a pattern by name.
    pub fn get(&self, name: &str) -> RosterResult<&RotationPattern> {
        self.patterns
            .get(name)
            .ok_or_else(|| RosterError::PatternNotFound {
                name: name.to_string(),
            })
    }

    /// Pattern names, ascending.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the catalog holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
