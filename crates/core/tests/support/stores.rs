use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launder_core::{
    EventDateStore, ExpiredEventScanner, KnownRangeTracker, LaundrySchedule, RequestTokenGuard,
    ScheduleAnchorStore, SettingsStore,
};
use launder_domain::constants::DB_DATETIME_FORMAT;
use launder_domain::{
    EventId, EventRecord, LaunderError, LaunderedDates, Result as DomainResult, StoredEventDates,
};

#[derive(Default)]
struct State {
    events: BTreeMap<EventId, EventRecord>,
    phantom_ids: Vec<EventId>,
    failing_writes: HashSet<EventId>,
    fail_scan: bool,
    fail_known_range: bool,
    writes: usize,
    range_updates: Vec<EventId>,
}

/// In-memory event store implementing every event-facing port.
///
/// The expired scan compares stored strings against `now` in storage format,
/// the same way the SQLite adapter does.
#[derive(Default, Clone)]
pub struct InMemoryEventStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryEventStore {
    pub fn new(events: Vec<EventRecord>) -> Self {
        let store = Self::default();
        for event in events {
            store.insert(event);
        }
        store
    }

    pub fn insert(&self, event: EventRecord) {
        self.state.lock().unwrap().events.insert(event.id.clone(), event);
    }

    pub fn get(&self, id: &str) -> Option<EventRecord> {
        self.state.lock().unwrap().events.get(&EventId::from(id)).cloned()
    }

    /// Make the scanner report an id the store does not hold.
    pub fn with_phantom(self, id: &str) -> Self {
        self.state.lock().unwrap().phantom_ids.push(EventId::from(id));
        self
    }

    pub fn fail_writes_for(self, id: &str) -> Self {
        self.state.lock().unwrap().failing_writes.insert(EventId::from(id));
        self
    }

    pub fn fail_scan(self) -> Self {
        self.state.lock().unwrap().fail_scan = true;
        self
    }

    pub fn fail_known_range(self) -> Self {
        self.state.lock().unwrap().fail_known_range = true;
        self
    }

    /// Number of successful date writes.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn range_updates(&self) -> Vec<EventId> {
        self.state.lock().unwrap().range_updates.clone()
    }
}

#[async_trait]
impl ExpiredEventScanner for InMemoryEventStore {
    async fn find_expired(&self, now: DateTime<Utc>) -> DomainResult<Vec<EventId>> {
        let state = self.state.lock().unwrap();
        if state.fail_scan {
            return Err(LaunderError::Database("scan failed".into()));
        }
        let cutoff = now.format(DB_DATETIME_FORMAT).to_string();
        let mut ids: Vec<EventId> = state
            .events
            .values()
            .filter(|event| event.laundry_enabled && event.end_utc < cutoff)
            .map(|event| event.id.clone())
            .collect();
        ids.extend(state.phantom_ids.iter().cloned());
        Ok(ids)
    }
}

#[async_trait]
impl SettingsStore for InMemoryEventStore {
    async fn get_enabled(&self, id: &EventId) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().events.get(id).is_some_and(|event| event.laundry_enabled))
    }

    async fn get_interval(&self, id: &EventId) -> DomainResult<Option<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .events
            .get(id)
            .and_then(|event| event.laundry_interval.clone()))
    }

    async fn set_enabled(&self, id: &EventId, enabled: bool) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        let event =
            state.events.get_mut(id).ok_or_else(|| LaunderError::NotFound(id.to_string()))?;
        event.laundry_enabled = enabled;
        Ok(())
    }

    async fn set_interval(&self, id: &EventId, interval: &str) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        let event =
            state.events.get_mut(id).ok_or_else(|| LaunderError::NotFound(id.to_string()))?;
        event.laundry_interval = Some(interval.to_string());
        Ok(())
    }
}

#[async_trait]
impl EventDateStore for InMemoryEventStore {
    async fn load_dates(&self, id: &EventId) -> DomainResult<Option<StoredEventDates>> {
        Ok(self.state.lock().unwrap().events.get(id).map(EventRecord::stored_dates))
    }

    async fn write_dates(&self, id: &EventId, dates: &LaunderedDates) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_writes.contains(id) {
            return Err(LaunderError::Database("disk full".into()));
        }
        let event =
            state.events.get_mut(id).ok_or_else(|| LaunderError::NotFound(id.to_string()))?;
        event.start_utc = dates.start_utc_db();
        event.end_utc = dates.end_utc_db();
        event.start_local = Some(dates.start_local_db());
        event.end_local = Some(dates.end_local_db());
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl KnownRangeTracker for InMemoryEventStore {
    async fn update_known_range(&self, id: &EventId) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_known_range {
            return Err(LaunderError::Database("range table locked".into()));
        }
        state.range_updates.push(id.clone());
        Ok(())
    }

    async fn rebuild_known_range(&self) -> DomainResult<()> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAnchorStore {
    anchors: Arc<Mutex<HashMap<String, LaundrySchedule>>>,
}

impl InMemoryAnchorStore {
    pub fn saved(&self) -> usize {
        self.anchors.lock().unwrap().len()
    }
}

#[async_trait]
impl ScheduleAnchorStore for InMemoryAnchorStore {
    async fn load_anchor(&self, task: &str) -> DomainResult<Option<LaundrySchedule>> {
        Ok(self.anchors.lock().unwrap().get(task).copied())
    }

    async fn save_anchor(&self, task: &str, schedule: &LaundrySchedule) -> DomainResult<()> {
        self.anchors.lock().unwrap().insert(task.to_string(), *schedule);
        Ok(())
    }

    async fn clear_anchor(&self, task: &str) -> DomainResult<bool> {
        Ok(self.anchors.lock().unwrap().remove(task).is_some())
    }
}

/// Token guard whose tokens are `action:subject`, ignoring time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTokenGuard;

impl RequestTokenGuard for StaticTokenGuard {
    fn issue(&self, action: &str, subject: &str, _now: DateTime<Utc>) -> String {
        format!("{action}:{subject}")
    }

    fn verify(&self, token: &str, action: &str, subject: &str, now: DateTime<Utc>) -> bool {
        token == self.issue(action, subject, now)
    }
}
