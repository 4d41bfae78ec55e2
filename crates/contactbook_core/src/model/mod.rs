//! Domain model for contacts, notes and groups.
//!
//! # Responsibility
//! - Define the persisted record shapes and their storage field names.
//! - Fill creation defaults once, so downstream code never sees optional
//!   reminder fields.
//! - Provide the pure derived computations (days since contact, status tier).
//!
//! # Invariants
//! - Identifiers are opaque strings, generated once and never reused.
//! - `Reminder::frequency` is never zero for records created by this crate.

pub mod contact;
pub mod group;
pub mod id;
pub mod status;

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wall-clock instant stored on contacts and notes.
pub type Timestamp = DateTime<Utc>;

/// Input validation failure for model values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Reminder frequency must be a positive number.
    ZeroFrequency,
    /// Reminder unit is not one of `days|weeks|months`.
    UnknownReminderUnit(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroFrequency => write!(f, "reminder frequency must be greater than zero"),
            Self::UnknownReminderUnit(value) => write!(
                f,
                "unknown reminder unit `{value}`; expected days|weeks|months"
            ),
        }
    }
}

impl Error for ModelValidationError {}
