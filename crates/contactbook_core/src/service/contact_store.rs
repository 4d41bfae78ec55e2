//! Contact store: single source of truth for contacts and groups.
//!
//! # Responsibility
//! - Load both collections once at construction.
//! - Assign identifiers and timestamps, fill creation defaults.
//! - Persist the full affected collection after every mutation.
//! - Expose derived staleness values computed from the injected clock.
//!
//! # Invariants
//! - Mutations build the next snapshot, write it, then swap it in. A failed
//!   write leaves the in-memory snapshot untouched.
//! - Contacts and groups are written independently; there is no transaction
//!   spanning both keys.
//! - Id-keyed updates on an unknown id are no-ops: nothing is written and the
//!   call reports `false`/`None` instead of an error.

use crate::clock::{Clock, SystemClock};
use crate::config::LoadPolicy;
use crate::model::contact::{Contact, ContactDraft, Note, NoteDraft, Reminder};
use crate::model::group::{Group, GroupDraft};
use crate::model::id::{ContactId, GroupId};
use crate::model::status::{days_since_last_contact, status_tier, StatusTier};
use crate::model::Timestamp;
use crate::storage::{
    read_collection, write_collection, KeyValueStorage, StorageError, CONTACTS_KEY, GROUPS_KEY,
};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Contact store failure.
#[derive(Debug)]
pub enum StoreError {
    /// Stored collection could not be decoded under `LoadPolicy::Strict`.
    CorruptCollection {
        key: &'static str,
        source: StorageError,
    },
    /// Backend read/write failure.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptCollection { key, source } => {
                write!(f, "refusing to load corrupt `{key}` collection: {source}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptCollection { source, .. } => Some(source),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Days since last contact and the resulting tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStatus {
    pub days_since: u64,
    pub tier: StatusTier,
}

/// One row of the contacts view: the record plus its derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactOverview<'a> {
    pub contact: &'a Contact,
    pub status: ContactStatus,
}

/// In-memory contacts and groups mirrored to key-value storage.
pub struct ContactStore<S: KeyValueStorage, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    contacts: Vec<Contact>,
    groups: Vec<Group>,
}

impl<S: KeyValueStorage> ContactStore<S, SystemClock> {
    /// Loads both collections from `storage` using the system clock.
    pub fn open(storage: S, policy: LoadPolicy) -> StoreResult<Self> {
        Self::open_with_clock(storage, SystemClock, policy)
    }
}

impl<S: KeyValueStorage, C: Clock> ContactStore<S, C> {
    /// Loads both collections from `storage`.
    ///
    /// Absent keys start empty. Undecodable keys follow `policy`.
    ///
    /// # Errors
    /// - `StoreError::CorruptCollection` under `LoadPolicy::Strict`.
    /// - `StoreError::Storage` when the backend itself fails.
    pub fn open_with_clock(storage: S, clock: C, policy: LoadPolicy) -> StoreResult<Self> {
        let contacts = load_collection(&storage, CONTACTS_KEY, policy)?;
        let groups = load_collection(&storage, GROUPS_KEY, policy)?;
        info!(
            "event=store_open module=store status=ok contacts={} groups={}",
            contacts.len(),
            groups.len()
        );
        Ok(Self {
            storage,
            clock,
            contacts,
            groups,
        })
    }

    /// Current contacts snapshot in insertion order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Current groups snapshot in insertion order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Releases the backend, e.g. to reopen a fresh store over it.
    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn find_contact(&self, contact_id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|contact| &contact.id == contact_id)
    }

    pub fn find_group(&self, group_id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == group_id)
    }

    /// Resolves a group's references in order, skipping dangling ids.
    ///
    /// Returns an empty list for an unknown group.
    pub fn group_members(&self, group_id: &GroupId) -> Vec<&Contact> {
        self.find_group(group_id)
            .map(|group| {
                group
                    .contacts
                    .iter()
                    .filter_map(|contact_id| self.find_contact(contact_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Creates a contact with a fresh id, current `last_contacted`, filled
    /// reminder and no notes, appended at the end.
    ///
    /// Duplicate names/phones/emails are allowed.
    pub fn add_contact(&mut self, draft: ContactDraft) -> StoreResult<Contact> {
        let contact = draft.into_contact(self.clock.now());
        let mut next = self.contacts.clone();
        next.push(contact.clone());
        self.commit_contacts(next)?;
        info!(
            "event=contact_add module=store status=ok contact_id={}",
            contact.id
        );
        Ok(contact)
    }

    /// Replaces the reminder of one contact. Returns `false` when not found.
    pub fn update_contact_reminder(
        &mut self,
        contact_id: &ContactId,
        reminder: Reminder,
    ) -> StoreResult<bool> {
        self.update_contact("contact_reminder_update", contact_id, |contact| {
            contact.reminder = reminder;
        })
    }

    /// Marks one contact as contacted now. Returns `false` when not found.
    pub fn update_last_contacted(&mut self, contact_id: &ContactId) -> StoreResult<bool> {
        let now = self.clock.now();
        self.update_contact("contact_touch", contact_id, |contact| {
            contact.last_contacted = now;
        })
    }

    /// Appends a note to one contact and marks it contacted now.
    ///
    /// Returns the stored note, or `None` when the contact is not found.
    pub fn add_note(
        &mut self,
        contact_id: &ContactId,
        draft: NoteDraft,
    ) -> StoreResult<Option<Note>> {
        let now = self.clock.now();
        let note = draft.into_note(now);
        let stored = note.clone();
        let found = self.update_contact("note_add", contact_id, move |contact| {
            contact.notes.push(note);
            contact.last_contacted = now;
        })?;
        Ok(found.then_some(stored))
    }

    /// Creates an empty group with a fresh id, appended at the end.
    pub fn add_group(&mut self, draft: GroupDraft) -> StoreResult<Group> {
        let group = draft.into_group();
        let mut next = self.groups.clone();
        next.push(group.clone());
        self.commit_groups(next)?;
        info!("event=group_add module=store status=ok group_id={}", group.id);
        Ok(group)
    }

    /// Appends `contact_id` to one group's references.
    ///
    /// The contact id is not checked; dangling references are stored as-is.
    /// Returns `false` when the group is not found.
    pub fn add_contact_to_group(
        &mut self,
        contact_id: &ContactId,
        group_id: &GroupId,
    ) -> StoreResult<bool> {
        let Some(index) = self.groups.iter().position(|group| &group.id == group_id) else {
            debug!(
                "event=group_member_add module=store status=skipped reason=group_not_found group_id={}",
                group_id
            );
            return Ok(false);
        };

        let mut next = self.groups.clone();
        next[index].contacts.push(contact_id.clone());
        self.commit_groups(next)?;
        info!(
            "event=group_member_add module=store status=ok group_id={} contact_id={} dangling={}",
            group_id,
            contact_id,
            self.find_contact(contact_id).is_none()
        );
        Ok(true)
    }

    /// Whole days between `last_contacted` and now; `0` when absent.
    pub fn days_since_last_contact(&self, last_contacted: Option<Timestamp>) -> u64 {
        days_since_last_contact(last_contacted, self.clock.now())
    }

    pub fn contact_status(&self, contact: &Contact) -> ContactStatus {
        let days_since = self.days_since_last_contact(Some(contact.last_contacted));
        ContactStatus {
            days_since,
            tier: status_tier(days_since, &contact.reminder),
        }
    }

    /// Every contact with its derived status, in collection order.
    pub fn contact_overview(&self) -> Vec<ContactOverview<'_>> {
        self.contacts
            .iter()
            .map(|contact| ContactOverview {
                contact,
                status: self.contact_status(contact),
            })
            .collect()
    }

    fn update_contact(
        &mut self,
        event: &'static str,
        contact_id: &ContactId,
        apply: impl FnOnce(&mut Contact),
    ) -> StoreResult<bool> {
        let Some(index) = self
            .contacts
            .iter()
            .position(|contact| &contact.id == contact_id)
        else {
            debug!(
                "event={} module=store status=skipped reason=contact_not_found contact_id={}",
                event, contact_id
            );
            return Ok(false);
        };

        let mut next = self.contacts.clone();
        apply(&mut next[index]);
        self.commit_contacts(next)?;
        info!(
            "event={} module=store status=ok contact_id={}",
            event, contact_id
        );
        Ok(true)
    }

    fn commit_contacts(&mut self, next: Vec<Contact>) -> StoreResult<()> {
        persist(&self.storage, CONTACTS_KEY, &next)?;
        self.contacts = next;
        Ok(())
    }

    fn commit_groups(&mut self, next: Vec<Group>) -> StoreResult<()> {
        persist(&self.storage, GROUPS_KEY, &next)?;
        self.groups = next;
        Ok(())
    }
}

fn load_collection<T, S>(storage: &S, key: &'static str, policy: LoadPolicy) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStorage,
{
    match read_collection(storage, key) {
        Ok(items) => Ok(items),
        Err(err @ StorageError::Decode { .. }) => match policy {
            LoadPolicy::FallbackEmpty => {
                warn!(
                    "event=collection_load module=store status=fallback key={} error={}",
                    key, err
                );
                Ok(Vec::new())
            }
            LoadPolicy::Strict => Err(StoreError::CorruptCollection { key, source: err }),
        },
        Err(err) => Err(err.into()),
    }
}

fn persist<T, S>(storage: &S, key: &'static str, items: &[T]) -> StoreResult<()>
where
    T: Serialize,
    S: KeyValueStorage,
{
    if let Err(err) = write_collection(storage, key, items) {
        error!(
            "event=collection_write module=store status=error key={} items={} error={}",
            key,
            items.len(),
            err
        );
        return Err(err.into());
    }
    debug!(
        "event=collection_write module=store status=ok key={} items={}",
        key,
        items.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ContactStore;
    use crate::clock::ManualClock;
    use crate::config::LoadPolicy;
    use crate::model::contact::{ContactDraft, NoteDraft};
    use crate::model::group::GroupDraft;
    use crate::model::id::{ContactId, GroupId};
    use crate::storage::{KeyValueStorage, MemoryKeyValueStorage, CONTACTS_KEY};
    use chrono::{TimeZone, Utc};

    fn store() -> ContactStore<MemoryKeyValueStorage, ManualClock> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        ContactStore::open_with_clock(MemoryKeyValueStorage::new(), clock, LoadPolicy::Strict)
            .unwrap()
    }

    #[test]
    fn unknown_ids_are_soft_no_ops_without_writes() {
        let mut store = store();
        let ghost = ContactId::from("ghost");

        assert!(!store.update_last_contacted(&ghost).unwrap());
        assert!(store.add_note(&ghost, NoteDraft::new("hi")).unwrap().is_none());
        assert!(!store
            .add_contact_to_group(&ghost, &GroupId::from("nope"))
            .unwrap());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn each_collection_is_written_under_its_own_key() {
        let mut store = store();
        store.add_contact(ContactDraft::new("Ada")).unwrap();
        assert_eq!(store.storage().len(), 1);
        assert!(store.storage().get_item(CONTACTS_KEY).unwrap().is_some());

        store.add_group(GroupDraft::new("Family")).unwrap();
        assert_eq!(store.storage().len(), 2);
    }

    #[test]
    fn group_members_skip_dangling_references() {
        let mut store = store();
        let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
        let group = store.add_group(GroupDraft::new("Work")).unwrap();
        store
            .add_contact_to_group(&ContactId::from("missing"), &group.id)
            .unwrap();
        store.add_contact_to_group(&ada.id, &group.id).unwrap();

        let members = store.group_members(&group.id);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, ada.id);
        assert!(store.group_members(&GroupId::from("other")).is_empty());
    }
}
