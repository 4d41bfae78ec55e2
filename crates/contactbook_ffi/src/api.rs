//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the contact store operations to Dart via FRB.
//! - Validate form input the UI owns (required name, reminder values).
//! - Flatten records into plain envelopes with precomputed status values.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store access is serialized per process; each call loads, mutates and
//!   persists before the next one starts.

use contactbook_core::db::open_db;
use contactbook_core::{
    init_logging as init_logging_inner, Contact, ContactDraft, ContactId, ContactStore,
    GroupDraft, GroupId, Note, NoteDraft, Reminder, ReminderDraft, ReminderUnit,
    SqliteKeyValueStorage, StoreConfig,
};
use log::warn;
use std::sync::{Mutex, OnceLock};

static STORE_CONFIG: OnceLock<Result<StoreConfig, String>> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

type SqliteContactStore<'conn> = ContactStore<SqliteKeyValueStorage<'conn>>;

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note row shown under a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub note_id: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub date_epoch_ms: i64,
}

/// Contact row with derived staleness values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactItem {
    pub contact_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub last_contacted_epoch_ms: i64,
    pub days_since_last_contact: u64,
    pub reminder_frequency: u32,
    /// `days|weeks|months`.
    pub reminder_unit: String,
    /// Human-readable reminder, e.g. `Every 2 weeks`.
    pub reminder_label: String,
    /// `fresh|due_soon|overdue`.
    pub status: String,
    /// Indicator colour as `#rrggbb`.
    pub status_color: String,
    /// Notes in creation order.
    pub notes: Vec<NoteItem>,
}

/// Group row with references resolved against current contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupItem {
    pub group_id: String,
    pub name: String,
    /// Raw references, including ones that no longer resolve.
    pub member_ids: Vec<String>,
    /// Names of resolvable members, in reference order.
    pub member_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListResponse {
    pub items: Vec<ContactItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListResponse {
    pub items: Vec<GroupItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created or updated record.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Lists all contacts in insertion order with status values.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return an empty list and a message.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_list() -> ContactListResponse {
    match with_store(|store| {
        Ok(store
            .contacts()
            .iter()
            .map(|contact| to_contact_item(store, contact))
            .collect::<Vec<_>>())
    }) {
        Ok(items) => ContactListResponse {
            message: format!("{} contact(s).", items.len()),
            items,
        },
        Err(err) => ContactListResponse {
            items: Vec::new(),
            message: format!("contacts_list failed: {err}"),
        },
    }
}

/// Creates a contact from the add-contact form.
///
/// Missing reminder fields (or a zero frequency) fall back to `7 days`.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_add(
    name: String,
    phone: String,
    email: String,
    reminder_frequency: Option<u32>,
    reminder_unit: Option<String>,
) -> ActionResponse {
    let name = name.trim().to_string();
    if name.is_empty() {
        return ActionResponse::failure("contact_add failed: name is required");
    }
    let unit = match reminder_unit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<ReminderUnit>() {
            Ok(unit) => Some(unit),
            Err(err) => return ActionResponse::failure(format!("contact_add failed: {err}")),
        },
    };
    let draft = ContactDraft::new(name)
        .phone(phone.trim())
        .email(email.trim())
        .reminder(ReminderDraft {
            frequency: reminder_frequency,
            unit,
        });

    match with_store(|store| store.add_contact(draft).map_err(|err| err.to_string())) {
        Ok(contact) => ActionResponse::success("Contact added.", contact.id.to_string()),
        Err(err) => ActionResponse::failure(format!("contact_add failed: {err}")),
    }
}

/// Replaces a contact's reminder. Zero frequency is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_update_reminder(contact_id: String, frequency: u32, unit: String) -> ActionResponse {
    let reminder = match unit
        .parse::<ReminderUnit>()
        .and_then(|unit| Reminder::new(frequency, unit))
    {
        Ok(reminder) => reminder,
        Err(err) => {
            return ActionResponse::failure(format!("contact_update_reminder failed: {err}"))
        }
    };
    let id = ContactId::from(contact_id.trim());
    contact_action("contact_update_reminder", "Reminder updated.", id, |store, id| {
        store
            .update_contact_reminder(id, reminder)
            .map_err(|err| err.to_string())
    })
}

/// Records that the contact was reached now.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_touch(contact_id: String) -> ActionResponse {
    let id = ContactId::from(contact_id.trim());
    contact_action("contact_touch", "Marked as contacted.", id, |store, id| {
        store.update_last_contacted(id).map_err(|err| err.to_string())
    })
}

/// Adds a note to a contact; also marks the contact as reached now.
#[flutter_rust_bridge::frb(sync)]
pub fn note_add(contact_id: String, content: String) -> ActionResponse {
    let content = content.trim().to_string();
    if content.is_empty() {
        return ActionResponse::failure("note_add failed: content is required");
    }
    let id = ContactId::from(contact_id.trim());
    let draft = NoteDraft::new(content);
    match with_store(|store| store.add_note(&id, draft).map_err(|err| err.to_string())) {
        Ok(Some(note)) => ActionResponse::success("Note added.", note.id.to_string()),
        Ok(None) => ActionResponse::failure(format!("note_add failed: contact not found: {id}")),
        Err(err) => ActionResponse::failure(format!("note_add failed: {err}")),
    }
}

/// Lists all groups with resolved member names.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_list() -> GroupListResponse {
    let result = with_store(|store| {
        Ok(store
            .groups()
            .iter()
            .map(|group| GroupItem {
                group_id: group.id.to_string(),
                name: group.name.clone(),
                member_ids: group.contacts.iter().map(ToString::to_string).collect(),
                member_names: store
                    .group_members(&group.id)
                    .into_iter()
                    .map(|contact| contact.name.clone())
                    .collect(),
            })
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => GroupListResponse {
            message: format!("{} group(s).", items.len()),
            items,
        },
        Err(err) => GroupListResponse {
            items: Vec::new(),
            message: format!("groups_list failed: {err}"),
        },
    }
}

/// Creates an empty group.
#[flutter_rust_bridge::frb(sync)]
pub fn group_add(name: String) -> ActionResponse {
    let name = name.trim().to_string();
    if name.is_empty() {
        return ActionResponse::failure("group_add failed: name is required");
    }
    match with_store(|store| {
        store
            .add_group(GroupDraft::new(name))
            .map_err(|err| err.to_string())
    }) {
        Ok(group) => ActionResponse::success("Group created.", group.id.to_string()),
        Err(err) => ActionResponse::failure(format!("group_add failed: {err}")),
    }
}

/// Appends a contact reference to a group.
///
/// The contact id is stored even when it does not resolve.
#[flutter_rust_bridge::frb(sync)]
pub fn group_add_contact(contact_id: String, group_id: String) -> ActionResponse {
    let contact_id = ContactId::from(contact_id.trim());
    let group_id = GroupId::from(group_id.trim());
    match with_store(|store| {
        store
            .add_contact_to_group(&contact_id, &group_id)
            .map_err(|err| err.to_string())
    }) {
        Ok(true) => ActionResponse::success("Contact added to group.", group_id.to_string()),
        Ok(false) => ActionResponse::failure(format!(
            "group_add_contact failed: group not found: {group_id}"
        )),
        Err(err) => ActionResponse::failure(format!("group_add_contact failed: {err}")),
    }
}

fn contact_action(
    operation: &str,
    success_message: &str,
    contact_id: ContactId,
    f: impl FnOnce(&mut SqliteContactStore<'_>, &ContactId) -> Result<bool, String>,
) -> ActionResponse {
    match with_store(|store| f(store, &contact_id)) {
        Ok(true) => ActionResponse::success(success_message, contact_id.to_string()),
        Ok(false) => {
            ActionResponse::failure(format!("{operation} failed: contact not found: {contact_id}"))
        }
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn resolve_store_config() -> Result<&'static StoreConfig, String> {
    STORE_CONFIG
        .get_or_init(|| StoreConfig::from_env().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

fn with_store<T>(
    f: impl FnOnce(&mut SqliteContactStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = resolve_store_config()?;
    let conn = open_db(&config.db_path).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error={err}");
        format!("store DB open failed: {err}")
    })?;
    let storage = SqliteKeyValueStorage::try_new(&conn)
        .map_err(|err| format!("store storage init failed: {err}"))?;
    let mut store = ContactStore::open(storage, config.load_policy)
        .map_err(|err| format!("store load failed: {err}"))?;
    f(&mut store)
}

fn to_contact_item(store: &SqliteContactStore<'_>, contact: &Contact) -> ContactItem {
    let status = store.contact_status(contact);
    ContactItem {
        contact_id: contact.id.to_string(),
        name: contact.name.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        last_contacted_epoch_ms: contact.last_contacted.timestamp_millis(),
        days_since_last_contact: status.days_since,
        reminder_frequency: contact.reminder.frequency(),
        reminder_unit: contact.reminder.unit().as_str().to_string(),
        reminder_label: contact.reminder.to_string(),
        status: status.tier.as_str().to_string(),
        status_color: status.tier.color_hex().to_string(),
        notes: contact.notes.iter().map(to_note_item).collect(),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        note_id: note.id.to_string(),
        content: note.content.clone(),
        date_epoch_ms: note.date.timestamp_millis(),
    }
}
