//! Crew Roster Engine for 24/7 facilities
//!
//! This crate generates crew rotations from named shift patterns, reports
//! staffing gaps against minimum requirements, runs shift swaps through a
//! dual-supervisor approval workflow, and aggregates rolling 13-week
//! overtime.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod coverage;
pub mod error;
pub mod models;
pub mod overtime;
pub mod rotation;
pub mod store;
pub mod swap;
