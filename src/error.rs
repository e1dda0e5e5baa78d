//! Error types for the crew roster engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while generating rotations,
//! computing coverage, running the swap workflow, or aggregating overtime.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// The broad class an error belongs to.
///
/// Callers use the class to decide how to present a failure: validation
/// errors are fixed by correcting input, configuration errors point at the
/// facility setup, permission errors are authorization problems, and
/// consistency errors mean a mutation was refused and nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed input.
    Validation,
    /// Reference to something the configuration does not define.
    Configuration,
    /// The actor lacks authority for the action.
    Permission,
    /// The mutation would break an invariant and was aborted.
    Consistency,
    /// A referenced record does not exist.
    NotFound,
}

/// The main error type for the crew roster engine.
///
/// # Example
///
/// ```
/// use crew_roster::error::{ErrorClass, RosterError};
///
/// let error = RosterError::PatternNotFound {
///     name: "5-on-2-off".to_string(),
/// };
/// assert_eq!(error.to_string(), "Rotation pattern not found: 5-on-2-off");
/// assert_eq!(error.class(), ErrorClass::Configuration);
/// ```
#[derive(Debug, Error)]
pub enum RosterError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The named rotation pattern is not in the catalog.
    #[error("Rotation pattern not found: {name}")]
    PatternNotFound {
        /// The pattern name that was requested.
        name: String,
    },

    /// A crew is not configured, or not covered by the selected pattern.
    #[error("Unknown crew '{crew}': {message}")]
    UnknownCrew {
        /// The crew identifier.
        crew: String,
        /// Where the crew was expected.
        message: String,
    },

    /// A position has no configured skill requirements.
    #[error("Unknown position: {position}")]
    UnknownPosition {
        /// The position name.
        position: String,
    },

    /// A skill is referenced that the configuration does not declare.
    #[error("Unknown skill: {skill}")]
    UnknownSkill {
        /// The skill name.
        skill: String,
    },

    /// An input field was malformed.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A week-start date was not a Monday.
    #[error("Week start {date} is not a Monday")]
    NotAMonday {
        /// The offending date.
        date: NaiveDate,
    },

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The record kind (e.g. "swap request").
        kind: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The actor lacks authority for the action (e.g. a supervisor
    /// approving for a crew they do not supervise).
    #[error("'{actor}' has no authority over {scope}")]
    PermissionDenied {
        /// The acting supervisor or employee.
        actor: String,
        /// What the action concerned (e.g. "crew A").
        scope: String,
    },

    /// The requested mutation would violate an invariant and was aborted.
    #[error("Consistency violation: {message}")]
    Consistency {
        /// A description of the violated invariant.
        message: String,
    },
}

impl RosterError {
    /// Shorthand for a [`RosterError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`RosterError::NotFound`].
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`RosterError::Consistency`].
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// Returns the class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation { .. } | Self::NotAMonday { .. } => ErrorClass::Validation,
            Self::ConfigNotFound { .. }
            | Self::ConfigParseError { .. }
            | Self::PatternNotFound { .. }
            | Self::UnknownCrew { .. }
            | Self::UnknownPosition { .. }
            | Self::UnknownSkill { .. } => ErrorClass::Configuration,
            Self::PermissionDenied { .. } => ErrorClass::Permission,
            Self::Consistency { .. } => ErrorClass::Consistency,
            Self::NotFound { .. } => ErrorClass::NotFound,
        }
    }
}

/// A type alias for Results that return RosterError.
pub type RosterResult<T> = Result<T, RosterError>;
