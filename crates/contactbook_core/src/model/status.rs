//! Derived staleness computations.
//!
//! Pure functions of the current time and stored state; callers recompute
//! them on every read instead of caching.

use super::contact::Reminder;
use super::Timestamp;
use serde::Serialize;

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;
const FRESH_MAX_RATIO: f64 = 0.5;
const DUE_SOON_MAX_RATIO: f64 = 0.8;

/// Three-tier staleness indicator for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    /// At most half of the reminder period has elapsed.
    Fresh,
    /// More than half, at most 80% of the period has elapsed.
    DueSoon,
    /// More than 80% of the period has elapsed.
    Overdue,
}

impl StatusTier {
    /// Indicator colour shown by the contacts view.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::Fresh => "#4caf50",
            Self::DueSoon => "#ffeb3b",
            Self::Overdue => "#f44336",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::DueSoon => "due_soon",
            Self::Overdue => "overdue",
        }
    }
}

/// Whole days between `last_contacted` and `now`, rounded up.
///
/// Returns `0` when `last_contacted` is absent. The difference is absolute,
/// so a future timestamp also yields a non-negative count.
pub fn days_since_last_contact(last_contacted: Option<Timestamp>, now: Timestamp) -> u64 {
    let Some(last_contacted) = last_contacted else {
        return 0;
    };
    let elapsed_ms = (now - last_contacted).num_milliseconds().unsigned_abs();
    elapsed_ms.div_ceil(MILLIS_PER_DAY)
}

/// Classifies `days_since` against the reminder period.
///
/// A zero-day period classifies as `Overdue`.
pub fn status_tier(days_since: u64, reminder: &Reminder) -> StatusTier {
    let period_days = reminder.days();
    if period_days == 0 {
        return StatusTier::Overdue;
    }
    let ratio = days_since as f64 / period_days as f64;
    if ratio <= FRESH_MAX_RATIO {
        StatusTier::Fresh
    } else if ratio <= DUE_SOON_MAX_RATIO {
        StatusTier::DueSoon
    } else {
        StatusTier::Overdue
    }
}
