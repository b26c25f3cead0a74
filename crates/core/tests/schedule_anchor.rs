//! Persisted schedule anchors.

mod support;

use chrono::{Duration, TimeZone, Utc};
use launder_core::laundry::schedule::ensure_anchor;
use launder_core::ScheduleAnchorStore;
use launder_domain::constants::LAUNDRY_PROCESS;
use launder_domain::Recurrence;
use support::InMemoryAnchorStore;

#[tokio::test]
async fn first_setup_schedules_six_hours_out() {
    let store = InMemoryAnchorStore::default();
    let now = Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap();

    let (schedule, created) =
        ensure_anchor(&store, LAUNDRY_PROCESS, now, Duration::hours(6), Recurrence::Daily)
            .await
            .unwrap();

    assert!(created);
    assert_eq!(schedule.anchor, Utc.with_ymd_and_hms(2024, 7, 10, 15, 0, 0).unwrap());
    assert_eq!(schedule.cron_expression(), "0 0 15 * * *");
}

#[tokio::test]
async fn repeated_setup_keeps_first_registration() {
    let store = InMemoryAnchorStore::default();
    let first_setup = Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap();
    let (first, _) =
        ensure_anchor(&store, LAUNDRY_PROCESS, first_setup, Duration::hours(6), Recurrence::Daily)
            .await
            .unwrap();

    let later = first_setup + Duration::days(3);
    let (second, created) =
        ensure_anchor(&store, LAUNDRY_PROCESS, later, Duration::hours(6), Recurrence::Hourly)
            .await
            .unwrap();

    assert!(!created);
    assert_eq!(second, first);
    assert_eq!(store.saved(), 1);
}

#[tokio::test]
async fn clearing_allows_rescheduling() {
    let store = InMemoryAnchorStore::default();
    let now = Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap();
    ensure_anchor(&store, LAUNDRY_PROCESS, now, Duration::hours(6), Recurrence::Daily)
        .await
        .unwrap();

    assert!(store.clear_anchor(LAUNDRY_PROCESS).await.unwrap());
    assert!(!store.clear_anchor(LAUNDRY_PROCESS).await.unwrap());

    let (schedule, created) =
        ensure_anchor(&store, LAUNDRY_PROCESS, now, Duration::hours(1), Recurrence::Hourly)
            .await
            .unwrap();
    assert!(created);
    assert_eq!(schedule.recurrence, Recurrence::Hourly);
}
