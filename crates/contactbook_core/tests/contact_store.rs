use chrono::{Duration, TimeZone, Utc};
use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    Clock, ContactDraft, ContactId, ContactStore, GroupDraft, LoadPolicy, ManualClock,
    MemoryKeyValueStorage, NoteDraft, Reminder, ReminderDraft, ReminderUnit,
    SqliteKeyValueStorage, StatusTier,
};
use std::collections::HashSet;

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap())
}

fn memory_store() -> ContactStore<MemoryKeyValueStorage, ManualClock> {
    ContactStore::open_with_clock(MemoryKeyValueStorage::new(), clock(), LoadPolicy::Strict)
        .unwrap()
}

#[test]
fn add_contact_fills_defaults_and_appends() {
    let mut store = memory_store();
    let now = store.clock().now();

    let ada = store
        .add_contact(ContactDraft::new("Ada").phone("555-0100").email("ada@example.com"))
        .unwrap();
    let bob = store.add_contact(ContactDraft::new("Bob")).unwrap();

    assert_eq!(ada.last_contacted, now);
    assert_eq!(ada.reminder, Reminder::new(7, ReminderUnit::Days).unwrap());
    assert!(ada.notes.is_empty());
    assert_eq!(ada.phone, "555-0100");
    let ids: Vec<_> = store.contacts().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec![ada.id, bob.id]);
}

#[test]
fn add_contact_defaults_reminder_fields_independently() {
    let mut store = memory_store();

    let every_three = store
        .add_contact(ContactDraft::new("Cy").reminder(ReminderDraft {
            frequency: Some(3),
            unit: None,
        }))
        .unwrap();
    let monthly = store
        .add_contact(ContactDraft::new("Di").reminder(ReminderDraft {
            frequency: None,
            unit: Some(ReminderUnit::Months),
        }))
        .unwrap();

    assert_eq!(every_three.reminder, Reminder::new(3, ReminderUnit::Days).unwrap());
    assert_eq!(monthly.reminder, Reminder::new(7, ReminderUnit::Months).unwrap());
}

#[test]
fn contact_ids_are_unique_even_for_identical_drafts() {
    let mut store = memory_store();
    for _ in 0..50 {
        store
            .add_contact(ContactDraft::new("Same").phone("1").email("same@example.com"))
            .unwrap();
    }

    let ids: HashSet<_> = store.contacts().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn update_contact_reminder_only_touches_reminder() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
    let bob = store.add_contact(ContactDraft::new("Bob")).unwrap();
    store.clock().advance(Duration::days(2));

    let biweekly = Reminder::new(2, ReminderUnit::Weeks).unwrap();
    assert!(store.update_contact_reminder(&ada.id, biweekly).unwrap());

    let updated = store.find_contact(&ada.id).unwrap();
    assert_eq!(updated.reminder, biweekly);
    assert_eq!(updated.last_contacted, ada.last_contacted);
    assert_eq!(updated.name, "Ada");
    assert_eq!(store.find_contact(&bob.id).unwrap(), &bob);
}

#[test]
fn update_last_contacted_moves_timestamp_to_now() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
    store.clock().advance(Duration::days(4));

    assert!(store.update_last_contacted(&ada.id).unwrap());

    let touched = store.find_contact(&ada.id).unwrap();
    assert_eq!(touched.last_contacted, store.clock().now());
    assert_eq!(store.contact_status(touched).days_since, 0);
}

#[test]
fn add_note_appends_one_note_and_counts_as_contact() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();

    store.clock().advance(Duration::hours(30));
    let first = store
        .add_note(&ada.id, NoteDraft::new("coffee"))
        .unwrap()
        .unwrap();
    store.clock().advance(Duration::hours(1));
    let second = store
        .add_note(&ada.id, NoteDraft::new("call back"))
        .unwrap()
        .unwrap();

    let contact = store.find_contact(&ada.id).unwrap();
    assert_eq!(contact.notes, vec![first.clone(), second.clone()]);
    assert_ne!(first.id, second.id);
    assert_eq!(second.date, store.clock().now());
    assert!(contact.last_contacted >= ada.last_contacted);
    assert_eq!(contact.last_contacted, second.date);
}

#[test]
fn unknown_contact_ids_are_ignored() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
    let ghost = ContactId::from("does-not-exist");

    assert!(!store
        .update_contact_reminder(&ghost, Reminder::new(1, ReminderUnit::Days).unwrap())
        .unwrap());
    assert!(!store.update_last_contacted(&ghost).unwrap());
    assert!(store.add_note(&ghost, NoteDraft::new("x")).unwrap().is_none());
    assert_eq!(store.contacts(), &[ada]);
}

#[test]
fn group_membership_keeps_insertion_order() {
    let mut store = memory_store();
    let contact_a = store.add_contact(ContactDraft::new("A")).unwrap();
    let contact_b = store.add_contact(ContactDraft::new("B")).unwrap();
    let family = store.add_group(GroupDraft::new("Family")).unwrap();
    assert!(family.contacts.is_empty());

    assert!(store.add_contact_to_group(&contact_a.id, &family.id).unwrap());
    assert!(store.add_contact_to_group(&contact_b.id, &family.id).unwrap());

    let group = store.find_group(&family.id).unwrap();
    assert_eq!(group.contacts, vec![contact_a.id, contact_b.id]);
}

#[test]
fn dangling_group_reference_is_stored_but_resolves_to_nothing() {
    let mut store = memory_store();
    let group = store.add_group(GroupDraft::new("Ghosts")).unwrap();
    let ghost = ContactId::from("never-created");

    assert!(store.add_contact_to_group(&ghost, &group.id).unwrap());

    assert_eq!(store.find_group(&group.id).unwrap().contacts, vec![ghost.clone()]);
    assert!(store.find_contact(&ghost).is_none());
    assert!(store.group_members(&group.id).is_empty());
}

#[test]
fn days_since_last_contact_is_monotonic_as_time_advances() {
    let store = memory_store();
    let start = store.clock().now();

    assert_eq!(store.days_since_last_contact(None), 0);
    let mut previous = 0;
    for _ in 0..10 {
        store.clock().advance(Duration::hours(7));
        let days = store.days_since_last_contact(Some(start));
        assert!(days >= previous);
        previous = days;
    }
    assert_eq!(previous, 3);
}

#[test]
fn overview_reports_tiers_in_collection_order() {
    let mut store = memory_store();
    let weekly_days = store.add_contact(ContactDraft::new("Days")).unwrap();
    let one_week = store
        .add_contact(
            ContactDraft::new("Weeks").reminder(Reminder::new(1, ReminderUnit::Weeks).unwrap()),
        )
        .unwrap();
    let monthly = store
        .add_contact(
            ContactDraft::new("Months").reminder(Reminder::new(1, ReminderUnit::Months).unwrap()),
        )
        .unwrap();

    store.clock().advance(Duration::days(5));
    let overview = store.contact_overview();
    let tiers: Vec<_> = overview
        .iter()
        .map(|row| (row.contact.id.clone(), row.status.days_since, row.status.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            (weekly_days.id, 5, StatusTier::DueSoon),
            (one_week.id, 5, StatusTier::DueSoon),
            (monthly.id, 5, StatusTier::Fresh),
        ]
    );

    store.clock().advance(Duration::days(1));
    assert_eq!(store.contact_overview()[0].status.tier, StatusTier::Overdue);
}

#[test]
fn reopening_sqlite_store_restores_equal_collections() {
    let conn = open_db_in_memory().unwrap();
    let (contacts, groups) = {
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
        let mut store =
            ContactStore::open_with_clock(storage, clock(), LoadPolicy::Strict).unwrap();
        let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
        let every_three_weeks = Reminder::new(3, ReminderUnit::Weeks).unwrap();
        let bob = store
            .add_contact(ContactDraft::new("Bob").reminder(every_three_weeks))
            .unwrap();
        store.clock().advance(Duration::milliseconds(1_234));
        store.add_note(&ada.id, NoteDraft::new("lunch")).unwrap();
        store.update_last_contacted(&bob.id).unwrap();
        let group = store.add_group(GroupDraft::new("Friends")).unwrap();
        store.add_contact_to_group(&bob.id, &group.id).unwrap();
        store.add_contact_to_group(&ada.id, &group.id).unwrap();
        (store.contacts().to_vec(), store.groups().to_vec())
    };

    let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
    let reopened = ContactStore::open(storage, LoadPolicy::Strict).unwrap();
    assert_eq!(reopened.contacts(), contacts.as_slice());
    assert_eq!(reopened.groups(), groups.as_slice());
}

#[test]
fn released_storage_reopens_with_equal_collections() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();
    store.add_note(&ada.id, NoteDraft::new("tea")).unwrap();
    let group = store.add_group(GroupDraft::new("Club")).unwrap();
    store.add_contact_to_group(&ada.id, &group.id).unwrap();
    let contacts = store.contacts().to_vec();
    let groups = store.groups().to_vec();

    let storage = store.into_storage();
    let reopened = ContactStore::open_with_clock(storage, clock(), LoadPolicy::Strict).unwrap();
    assert_eq!(reopened.contacts(), contacts.as_slice());
    assert_eq!(reopened.groups(), groups.as_slice());
}

#[test]
fn last_contacted_in_the_future_counts_absolute_days() {
    let mut store = memory_store();
    let ada = store.add_contact(ContactDraft::new("Ada")).unwrap();

    store.clock().set(ada.last_contacted - Duration::hours(36));

    let contact = store.find_contact(&ada.id).unwrap();
    assert_eq!(store.contact_status(contact).days_since, 2);
}
