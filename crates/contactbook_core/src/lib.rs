//! Core domain logic for the contact book.
//! This crate is the single source of truth for contacts, notes and groups.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LoadPolicy, StoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::contact::{
    Contact, ContactDraft, Note, NoteDraft, Reminder, ReminderDraft, ReminderUnit,
    DEFAULT_REMINDER_FREQUENCY, DEFAULT_REMINDER_UNIT,
};
pub use model::group::{Group, GroupDraft};
pub use model::id::{ContactId, GroupId, NoteId};
pub use model::status::{days_since_last_contact, status_tier, StatusTier};
pub use model::{ModelValidationError, Timestamp};
pub use service::contact_store::{
    ContactOverview, ContactStatus, ContactStore, StoreError, StoreResult,
};
pub use storage::{
    KeyValueStorage, MemoryKeyValueStorage, SqliteKeyValueStorage, StorageError, StorageResult,
    CONTACTS_KEY, GROUPS_KEY,
};
