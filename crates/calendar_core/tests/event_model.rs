use calendar_core::{decode_events, EventId, EventRecord, EventType, EventValidationError, NewEvent};
use chrono::{TimeZone, Utc};

fn sample_record() -> EventRecord {
    EventRecord {
        id: EventId::from_millis(1_714_554_000_000),
        title: "Dentist".to_string(),
        description: Some("Bring insurance card".to_string()),
        kind: EventType::Reminder,
        start: Utc.timestamp_millis_opt(1_714_554_000_123).unwrap(),
        end: Utc.timestamp_millis_opt(1_714_557_600_000).unwrap(),
    }
}

#[test]
fn record_serializes_to_persisted_wire_fields() {
    let json = serde_json::to_value(sample_record()).unwrap();

    assert_eq!(json["id"], 1_714_554_000_000_i64);
    assert_eq!(json["title"], "Dentist");
    assert_eq!(json["description"], "Bring insurance card");
    assert_eq!(json["type"], "reminder");
    assert_eq!(json["start"], "2024-05-01T09:00:00.123Z");
    assert_eq!(json["end"], "2024-05-01T10:00:00.000Z");
}

#[test]
fn start_and_end_are_revived_as_timestamps() {
    let raw = r#"[{
        "id": 7,
        "title": "Trip",
        "description": null,
        "type": "plan",
        "start": "2024-05-01T11:00:00.250+02:00",
        "end": "2024-05-03T18:00:00.000Z"
    }]"#;

    let events = decode_events(raw).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, EventId::from_millis(7));
    assert_eq!(events[0].kind, EventType::Plan);
    assert_eq!(events[0].description, None);
    assert_eq!(
        events[0].start,
        Utc.timestamp_millis_opt(1_714_554_000_250).unwrap()
    );
}

#[test]
fn other_string_fields_are_not_revived() {
    let raw = r#"[{
        "id": 8,
        "title": "2024-05-01T09:00:00.000Z",
        "type": "other",
        "start": "2024-05-01T09:00:00.000Z",
        "end": "2024-05-01T09:00:00.000Z"
    }]"#;

    let events = decode_events(raw).unwrap();
    assert_eq!(events[0].title, "2024-05-01T09:00:00.000Z");
    assert_eq!(events[0].description, None);
}

#[test]
fn invalid_timestamp_text_fails_decoding() {
    let raw = r#"[{"id":1,"title":"x","type":"plan","start":"tomorrow","end":"2024-05-01T09:00:00Z"}]"#;
    let err = decode_events(raw).unwrap_err();
    assert!(err.to_string().contains("invalid timestamp"), "{err}");
}

#[test]
fn unknown_type_fails_decoding() {
    let raw = r#"[{"id":1,"title":"x","type":"holiday","start":"2024-05-01T09:00:00Z","end":"2024-05-01T09:00:00Z"}]"#;
    assert!(decode_events(raw).is_err());
}

#[test]
fn descriptor_table_is_fixed() {
    let keys = EventType::ALL
        .into_iter()
        .map(|kind| kind.descriptor().key)
        .collect::<Vec<_>>();
    assert_eq!(keys, vec!["reminder", "plan", "other"]);

    for kind in EventType::ALL {
        let descriptor = kind.descriptor();
        assert_eq!(descriptor.kind, kind);
        assert!(descriptor.color.starts_with('#'));
        assert!(!descriptor.label.is_empty());
    }
    assert_eq!(EventType::default(), EventType::Reminder);
}

#[test]
fn new_event_requires_non_blank_title() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let event = NewEvent::new("   ", EventType::Other, at, at);
    assert_eq!(event.validate(), Err(EventValidationError::EmptyTitle));

    let reversed = NewEvent::new("Backwards", EventType::Other, at, at - chrono::Duration::hours(1));
    assert_eq!(reversed.validate(), Ok(()));
}
