//! Crew identifiers and shift labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one of the facility's rotating crews (e.g. "A").
///
/// Crews order by their identifier, which is the crew-ascending order used
/// by every generated table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crew(String);

impl Crew {
    /// Creates a crew identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Crew {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The category of work period a crew is assigned on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLabel {
    /// Day shift.
    Day,
    /// Evening (swing) shift.
    Evening,
    /// Night shift.
    Night,
    /// Rest day.
    Off,
}

impl ShiftLabel {
    /// The labels that represent time on duty, in display order.
    pub const WORKING: [ShiftLabel; 3] = [ShiftLabel::Day, ShiftLabel::Evening, ShiftLabel::Night];

    /// Returns true for every label except [`ShiftLabel::Off`].
    pub fn is_working(self) -> bool {
        self != ShiftLabel::Off
    }

    /// Parses the single-character code used in pattern definitions.
    ///
    /// ```
    /// use crew_roster::models::ShiftLabel;
    ///
    /// assert_eq!(ShiftLabel::from_code('N'), Some(ShiftLabel::Night));
    /// assert_eq!(ShiftLabel::from_code('x'), None);
    /// ```
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'D' => Some(ShiftLabel::Day),
            'E' => Some(ShiftLabel::Evening),
            'N' => Some(ShiftLabel::Night),
            'O' => Some(ShiftLabel::Off),
            _ => None,
        }
    }

    /// Returns the single-character pattern code for this label.
    pub fn code(self) -> char {
        match self {
            ShiftLabel::Day => 'D',
            ShiftLabel::Evening => 'E',
            ShiftLabel::Night => 'N',
            ShiftLabel::Off => 'O',
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftLabel::Day => "day",
            ShiftLabel::Evening => "evening",
            ShiftLabel::Night => "night",
            ShiftLabel::Off => "off",
        };
        f.write_str(name)
    }
}
