//! Contact, note and reminder records.
//!
//! # Invariants
//! - `notes` only grows; insertion order is creation order.
//! - `last_contacted` is set at creation and moves on touch or new note.
//! - Stored records missing `reminder`/`notes` load with creation defaults.

use super::id::{ContactId, NoteId};
use super::{ModelValidationError, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Frequency used when a draft omits it (or passes zero).
pub const DEFAULT_REMINDER_FREQUENCY: u32 = 7;
/// Unit used when a draft omits it.
pub const DEFAULT_REMINDER_UNIT: ReminderUnit = ReminderUnit::Days;

/// Calendar unit a reminder frequency is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderUnit {
    Days,
    Weeks,
    Months,
}

impl ReminderUnit {
    /// Days represented by one unit. Months are fixed at 30 days.
    pub fn days(self) -> u64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
            Self::Months => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl Display for ReminderUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderUnit {
    type Err = ModelValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            other => Err(ModelValidationError::UnknownReminderUnit(other.to_string())),
        }
    }
}

/// How often a contact should be re-engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReminderDraft")]
pub struct Reminder {
    frequency: u32,
    unit: ReminderUnit,
}

impl Reminder {
    /// Creates a validated reminder.
    ///
    /// # Errors
    /// - `ModelValidationError::ZeroFrequency` when `frequency == 0`.
    pub fn new(frequency: u32, unit: ReminderUnit) -> Result<Self, ModelValidationError> {
        if frequency == 0 {
            return Err(ModelValidationError::ZeroFrequency);
        }
        Ok(Self { frequency, unit })
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn unit(&self) -> ReminderUnit {
        self.unit
    }

    /// Frequency normalized to days (`weeks * 7`, `months * 30`).
    pub fn days(&self) -> u64 {
        u64::from(self.frequency) * self.unit.days()
    }
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_REMINDER_FREQUENCY,
            unit: DEFAULT_REMINDER_UNIT,
        }
    }
}

impl Display for Reminder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Every {} {}", self.frequency, self.unit)
    }
}

/// Partially specified reminder; missing fields default one by one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    #[serde(default, deserialize_with = "deserialize_lenient_frequency")]
    pub frequency: Option<u32>,
    #[serde(default)]
    pub unit: Option<ReminderUnit>,
}

impl ReminderDraft {
    /// Fills absent fields. A zero frequency counts as absent.
    pub fn fill(self) -> Reminder {
        Reminder {
            frequency: self
                .frequency
                .filter(|frequency| *frequency > 0)
                .unwrap_or(DEFAULT_REMINDER_FREQUENCY),
            unit: self.unit.unwrap_or(DEFAULT_REMINDER_UNIT),
        }
    }
}

/// Stored frequencies may be negative, fractional or numeric strings when
/// they came from a free-form number input. Anything that is not a positive
/// whole `u32` decodes as absent instead of failing the whole collection.
fn deserialize_lenient_frequency<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(frequency_from_value))
}

fn frequency_from_value(value: &Value) -> Option<u32> {
    let frequency = match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|whole| u32::try_from(whole).ok())
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && *float <= f64::from(u32::MAX))
                    .filter(|float| *float >= 0.0)
                    .map(|float| float as u32)
            }),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    frequency.filter(|frequency| *frequency > 0)
}

impl From<ReminderDraft> for Reminder {
    fn from(value: ReminderDraft) -> Self {
        value.fill()
    }
}

impl From<Reminder> for ReminderDraft {
    fn from(value: Reminder) -> Self {
        Self {
            frequency: Some(value.frequency),
            unit: Some(value.unit),
        }
    }
}

/// Dated free-text entry owned by one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub date: Timestamp,
}

/// Caller-supplied note fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub content: String,
}

impl NoteDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub(crate) fn into_note(self, now: Timestamp) -> Note {
        Note {
            id: NoteId::generate(),
            content: self.content,
            date: now,
        }
    }
}

/// Person record with reminder policy and note history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub last_contacted: Timestamp,
    #[serde(default)]
    pub reminder: Reminder,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Caller-supplied contact fields. Name presence is a UI concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub reminder: Option<ReminderDraft>,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn reminder(mut self, reminder: impl Into<ReminderDraft>) -> Self {
        self.reminder = Some(reminder.into());
        self
    }

    /// Produces a fully populated contact with a fresh id and no notes.
    pub(crate) fn into_contact(self, now: Timestamp) -> Contact {
        Contact {
            id: ContactId::generate(),
            name: self.name,
            phone: self.phone,
            email: self.email,
            last_contacted: now,
            reminder: self.reminder.unwrap_or_default().fill(),
            notes: Vec::new(),
        }
    }
}
