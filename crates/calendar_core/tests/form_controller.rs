use calendar_core::{
    decode_events, EventStore, EventType, FormController, FormField, FormSubmitError,
    KeyValueRepository, ManualClock, MemoryKeyValueRepository,
};
use chrono::{TimeZone, Utc};

const KEY: &str = "calendar.events";

fn empty_store() -> (
    EventStore<MemoryKeyValueRepository, ManualClock>,
    MemoryKeyValueRepository,
) {
    let repo = MemoryKeyValueRepository::new();
    let store =
        EventStore::load_with_clock(repo.clone(), KEY, ManualClock::at_millis(1_714_500_000_000));
    (store, repo)
}

fn fill(form: &mut FormController, title: &str, kind: EventType, start: &str, end: &str) {
    let draft = form.draft_mut();
    draft.title = title.to_string();
    draft.kind = kind;
    draft.start_text = start.to_string();
    draft.end_text = end.to_string();
}

#[test]
fn open_for_create_resets_draft_with_reminder_default() {
    let mut form = FormController::new();
    form.open_for_create();
    fill(&mut form, "Leftover", EventType::Plan, "2024-05-01T09:00", "");

    form.open_for_create();

    assert!(form.is_open());
    assert_eq!(form.draft().title, "");
    assert_eq!(form.draft().kind, EventType::Reminder);
    assert_eq!(form.draft().start_text, "");
}

#[test]
fn open_for_slot_prefills_range() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut form = FormController::new();

    form.open_for_slot(start, end);

    assert!(form.is_open());
    assert_eq!(form.draft().start_text, "2024-05-01T09:30");
    assert_eq!(form.draft().end_text, "2024-05-01T10:00");
    assert_eq!(form.draft().title, "");
    assert_eq!(form.draft().kind, EventType::Reminder);
}

#[test]
fn validate_lists_every_missing_field() {
    let mut form = FormController::new();
    form.open_for_create();
    form.draft_mut().title = "   ".to_string();

    let err = form.validate().unwrap_err();

    assert_eq!(
        err.missing,
        vec![FormField::Title, FormField::Start, FormField::End]
    );
    assert!(err.malformed.is_empty());
    assert!(err.to_string().contains("title, start, end"));
}

#[test]
fn validate_reports_unparsable_timestamps_separately() {
    let mut form = FormController::new();
    form.open_for_create();
    fill(&mut form, "Trip", EventType::Plan, "next friday", "");

    let err = form.validate().unwrap_err();

    assert_eq!(err.missing, vec![FormField::End]);
    assert_eq!(err.malformed, vec![FormField::Start]);
}

#[test]
fn validate_does_not_check_end_after_start() {
    let mut form = FormController::new();
    form.open_for_create();
    fill(
        &mut form,
        "Backwards",
        EventType::Other,
        "2024-05-02T09:00",
        "2024-05-01T09:00",
    );

    let event = form.validate().unwrap();
    assert!(event.end < event.start);
}

#[test]
fn submit_trip_appends_and_persists() {
    let (mut store, repo) = empty_store();
    let mut form = FormController::new();
    form.open_for_create();
    fill(
        &mut form,
        " Trip ",
        EventType::Plan,
        "2024-06-01T08:00",
        "2024-06-03T20:00",
    );
    form.draft_mut().description = "Pack light".to_string();

    let id = form.submit(&mut store).unwrap();

    assert!(!form.is_open());
    assert_eq!(store.len(), 1);
    let stored = store.get(id).unwrap();
    assert_eq!(stored.title, "Trip");
    assert_eq!(stored.description.as_deref(), Some("Pack light"));
    assert_eq!(stored.kind, EventType::Plan);
    assert_eq!(
        stored.start,
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    );

    let persisted = decode_events(&repo.get_item(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, id);
}

#[test]
fn submit_grows_store_with_fresh_unique_id() {
    let (mut store, _repo) = empty_store();
    let mut form = FormController::new();

    let mut ids = Vec::new();
    for title in ["One", "Two", "Three"] {
        form.open_for_create();
        fill(
            &mut form,
            title,
            EventType::Reminder,
            "2024-05-01T09:00",
            "2024-05-01T09:15",
        );
        let before = store.len();
        let id = form.submit(&mut store).unwrap();
        assert_eq!(store.len(), before + 1);
        assert!(!ids.contains(&id));
        ids.push(id);
    }
}

#[test]
fn invalid_submit_keeps_form_open_and_store_untouched() {
    let (mut store, repo) = empty_store();
    let mut form = FormController::new();
    form.open_for_create();
    fill(&mut form, "", EventType::Plan, "2024-05-01T09:00", "2024-05-01T10:00");

    let err = form.submit(&mut store).unwrap_err();

    match err {
        FormSubmitError::Invalid(validation) => {
            assert_eq!(validation.missing, vec![FormField::Title])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(form.is_open());
    assert_eq!(form.draft().start_text, "2024-05-01T09:00");
    assert!(store.is_empty());
    assert!(repo.is_empty());
}

#[test]
fn submit_on_closed_form_is_rejected() {
    let (mut store, _repo) = empty_store();
    let mut form = FormController::new();

    assert!(matches!(
        form.submit(&mut store).unwrap_err(),
        FormSubmitError::NotOpen
    ));
    assert!(store.is_empty());
}

#[test]
fn cancel_discards_draft_without_mutation() {
    let (mut store, repo) = empty_store();
    let mut form = FormController::new();
    form.open_for_create();
    fill(&mut form, "Maybe", EventType::Other, "2024-05-01T09:00", "2024-05-01T10:00");

    form.cancel();

    assert!(!form.is_open());
    assert_eq!(form.draft().title, "");
    assert!(store.is_empty());
    assert!(repo.is_empty());
    assert!(form.submit(&mut store).is_err());
}

#[test]
fn refused_id_keeps_form_open_with_draft() {
    let raw = format!(
        r#"[{{"id":{},"title":"Last","type":"plan","start":"2024-05-01T08:00:00.000Z","end":"2024-05-01T09:00:00.000Z"}}]"#,
        i64::MAX
    );
    let repo = MemoryKeyValueRepository::with_entry(KEY, raw);
    let mut store = EventStore::load_with_clock(repo, KEY, ManualClock::at_millis(1));
    let mut form = FormController::new();
    form.open_for_create();
    fill(&mut form, "Trip", EventType::Plan, "2024-05-01T09:00", "2024-05-01T10:00");

    let err = form.submit(&mut store).unwrap_err();

    assert!(matches!(
        err,
        FormSubmitError::Store(calendar_core::StoreError::IdExhausted)
    ));
    assert!(form.is_open());
    assert_eq!(form.draft().title, "Trip");
    assert_eq!(store.len(), 1);
}
