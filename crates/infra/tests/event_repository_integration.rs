//! SQLite event repository coverage: expired-event scan, per-event
//! settings, date writes and known-range bookkeeping.

mod support;

use chrono::{NaiveDate, TimeZone, Utc};
use launder_core::{EventDateStore, ExpiredEventScanner, KnownRangeTracker, SettingsStore};
use launder_domain::{EventId, EventRecord, LaunderError, LaunderedDates};
use support::{laundry_event, TestDatabase};

fn id(raw: &str) -> EventId {
    EventId::from(raw)
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_returns_only_enabled_events_that_ended_before_now() {
    let db = TestDatabase::new();
    let repo = db.events();

    repo.upsert_event(laundry_event("past", "2024-07-01 09:00:00", "2024-07-01 10:00:00", "today"))
        .await
        .unwrap();
    repo.upsert_event(laundry_event(
        "at-now",
        "2024-07-10 11:00:00",
        "2024-07-10 12:00:00",
        "today",
    ))
    .await
    .unwrap();
    repo.upsert_event(laundry_event(
        "future",
        "2024-07-11 09:00:00",
        "2024-07-11 10:00:00",
        "today",
    ))
    .await
    .unwrap();
    repo.upsert_event(EventRecord::new(
        "disabled",
        "Not opted in",
        "2024-06-01 09:00:00",
        "2024-06-01 10:00:00",
        "UTC",
    ))
    .await
    .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap();
    let expired = repo.find_expired(now).await.unwrap();

    assert_eq!(expired, vec![id("past")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_orders_by_end_then_id() {
    let db = TestDatabase::new();
    let repo = db.events();

    let ends = [
        ("b", "2024-05-02 10:00:00"),
        ("a", "2024-05-02 10:00:00"),
        ("c", "2024-05-01 10:00:00"),
    ];
    for (event, end) in ends {
        repo.upsert_event(laundry_event(event, "2024-05-01 09:00:00", end, "next_day"))
            .await
            .unwrap();
    }

    let now = Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap();
    let expired = repo.find_expired(now).await.unwrap();

    assert_eq!(expired, vec![id("c"), id("a"), id("b")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_compares_iso_and_offset_timestamps_as_instants() {
    let db = TestDatabase::new();
    let repo = db.events();

    let ends = [
        ("iso", "2024-07-10T01:00:00"),
        ("offset-past", "2024-07-10T13:30:00+02:00"),
        ("offset-future", "2024-07-10T14:00:00+01:00"),
        ("unparseable", "sometime soon"),
    ];
    for (event, end) in ends {
        repo.upsert_event(laundry_event(event, "2024-07-09 09:00:00", end, "next_day"))
            .await
            .unwrap();
    }

    let now = Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap();
    let expired = repo.find_expired(now).await.unwrap();

    assert_eq!(expired, vec![id("iso"), id("offset-past")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn settings_round_trip_and_require_existing_event() {
    let db = TestDatabase::new();
    let repo = db.events();
    repo.upsert_event(EventRecord::new(
        "7",
        "Planning",
        "2024-06-01 10:00:00",
        "2024-06-01 11:00:00",
        "Europe/Berlin",
    ))
    .await
    .unwrap();

    assert!(!repo.get_enabled(&id("7")).await.unwrap());
    assert_eq!(repo.get_interval(&id("7")).await.unwrap(), None);

    repo.set_enabled(&id("7"), true).await.unwrap();
    repo.set_interval(&id("7"), "same_next_month").await.unwrap();
    repo.set_interval(&id("7"), "same_next_year").await.unwrap();

    assert!(repo.get_enabled(&id("7")).await.unwrap());
    assert_eq!(repo.get_interval(&id("7")).await.unwrap().as_deref(), Some("same_next_year"));

    let err = repo.set_enabled(&id("missing"), true).await.unwrap_err();
    assert!(matches!(err, LaunderError::NotFound(_)));
    assert!(!repo.get_enabled(&id("missing")).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn write_dates_replaces_all_four_fields() {
    let db = TestDatabase::new();
    let repo = db.events();
    repo.upsert_event(EventRecord::new(
        "42",
        "Standup",
        "2024-06-01 10:00:00",
        "2024-06-01 12:00:00",
        "America/New_York",
    ))
    .await
    .unwrap();

    let local = NaiveDate::from_ymd_opt(2024, 7, 17).unwrap().and_hms_opt(6, 0, 0).unwrap();
    let dates = LaunderedDates {
        start_utc: Utc.with_ymd_and_hms(2024, 7, 17, 10, 0, 0).unwrap(),
        end_utc: Utc.with_ymd_and_hms(2024, 7, 17, 12, 0, 0).unwrap(),
        start_local: local,
        end_local: local + chrono::Duration::hours(2),
        timezone: "America/New_York".into(),
    };
    repo.write_dates(&id("42"), &dates).await.unwrap();

    let record = repo.get_event(&id("42")).await.unwrap().expect("event exists");
    assert_eq!(record.start_utc, "2024-07-17 10:00:00");
    assert_eq!(record.end_utc, "2024-07-17 12:00:00");
    assert_eq!(record.start_local.as_deref(), Some("2024-07-17 06:00:00"));
    assert_eq!(record.end_local.as_deref(), Some("2024-07-17 08:00:00"));
    assert_eq!(record.timezone, "America/New_York");

    let stored = repo.load_dates(&id("42")).await.unwrap().expect("dates exist");
    assert_eq!(stored.start_utc, "2024-07-17 10:00:00");

    let err = repo.write_dates(&id("gone"), &dates).await.unwrap_err();
    assert!(matches!(err, LaunderError::NotFound(_)));
    assert!(repo.load_dates(&id("gone")).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_event_drops_its_settings() {
    let db = TestDatabase::new();
    let repo = db.events();
    repo.upsert_event(laundry_event("9", "2024-06-01 10:00:00", "2024-06-01 11:00:00", "today"))
        .await
        .unwrap();

    assert!(repo.delete_event(&id("9")).await.unwrap());
    assert!(!repo.delete_event(&id("9")).await.unwrap());
    assert_eq!(repo.get_interval(&id("9")).await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn known_range_widens_and_recomputes_for_marker_events() {
    let db = TestDatabase::new();
    let repo = db.events();

    repo.upsert_event(laundry_event("early", "2024-01-05 09:00:00", "2024-01-05 10:00:00", "today"))
        .await
        .unwrap();
    repo.upsert_event(laundry_event("late", "2024-03-01 09:00:00", "2024-03-01 10:00:00", "today"))
        .await
        .unwrap();
    repo.rebuild_known_range().await.unwrap();

    let range = repo.known_range().await.unwrap();
    assert_eq!(range.earliest.as_deref(), Some("2024-01-05 09:00:00"));
    assert_eq!(range.earliest_event, Some(id("early")));
    assert_eq!(range.latest.as_deref(), Some("2024-03-01 10:00:00"));
    assert_eq!(range.latest_event, Some(id("late")));

    // Moving the earliest event forward must shrink the range.
    let local = NaiveDate::from_ymd_opt(2024, 7, 17).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let moved = LaunderedDates {
        start_utc: Utc.with_ymd_and_hms(2024, 7, 17, 9, 0, 0).unwrap(),
        end_utc: Utc.with_ymd_and_hms(2024, 7, 17, 10, 0, 0).unwrap(),
        start_local: local,
        end_local: local + chrono::Duration::hours(1),
        timezone: "UTC".into(),
    };
    repo.write_dates(&id("early"), &moved).await.unwrap();
    repo.update_known_range(&id("early")).await.unwrap();

    let range = repo.known_range().await.unwrap();
    assert_eq!(range.earliest.as_deref(), Some("2024-03-01 09:00:00"));
    assert_eq!(range.earliest_event, Some(id("late")));
    assert_eq!(range.latest.as_deref(), Some("2024-07-17 10:00:00"));
    assert_eq!(range.latest_event, Some(id("early")));

    let err = repo.update_known_range(&id("missing")).await.unwrap_err();
    assert!(matches!(err, LaunderError::NotFound(_)));
}
