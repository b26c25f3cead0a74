//! SQLite-backed event store.
//!
//! Implements every event-facing laundry port on one repository: the
//! expired-event scan, per-event settings, date reads/writes and the
//! known-range bookkeeping.
//!
//! Stored dates may use the `T` or RFC 3339 forms, so the scan normalises
//! them through SQLite's `datetime()` before comparing. Rows whose end does
//! not parse are never treated as expired.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launder_core::{EventDateStore, ExpiredEventScanner, KnownRangeTracker, SettingsStore};
use launder_domain::constants::{DB_DATETIME_FORMAT, LAUNDRY_ENABLED, LAUNDRY_INTERVAL};
use launder_domain::{
    EventId, EventRecord, KnownRange, LaunderError, LaunderedDates, Result as DomainResult,
    StoredEventDates,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::manager::{map_sql_error, with_connection, DbManager};

const ENABLED_VALUE: &str = "1";
const DISABLED_VALUE: &str = "0";

/// SQLite implementation of the event-facing ports.
#[derive(Clone)]
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace an event together with its laundry settings.
    #[instrument(skip(self, record), fields(event_id = %record.id))]
    pub async fn upsert_event(&self, record: EventRecord) -> DomainResult<()> {
        with_connection(&self.db, move |conn| {
            let tx = conn.unchecked_transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO events
                    (id, title, start_utc, end_utc, start_local, end_local, timezone, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    start_utc = excluded.start_utc,
                    end_utc = excluded.end_utc,
                    start_local = excluded.start_local,
                    end_local = excluded.end_local,
                    timezone = excluded.timezone,
                    updated_at = excluded.updated_at",
                params![
                    record.id.as_str(),
                    record.title,
                    record.start_utc,
                    record.end_utc,
                    record.start_local,
                    record.end_local,
                    record.timezone,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(map_sql_error)?;

            let enabled = if record.laundry_enabled { ENABLED_VALUE } else { DISABLED_VALUE };
            put_meta(&tx, &record.id, LAUNDRY_ENABLED, enabled)?;
            match record.laundry_interval.as_deref() {
                Some(interval) => put_meta(&tx, &record.id, LAUNDRY_INTERVAL, interval)?,
                None => delete_meta(&tx, &record.id, LAUNDRY_INTERVAL)?,
            }

            tx.commit().map_err(map_sql_error)
        })
        .await
    }

    /// Full stored row for an event.
    #[instrument(skip(self))]
    pub async fn get_event(&self, id: &EventId) -> DomainResult<Option<EventRecord>> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            let record = conn
                .query_row(
                    "SELECT id, title, start_utc, end_utc, start_local, end_local, timezone
                     FROM events WHERE id = ?1",
                    params![id.as_str()],
                    map_event_row,
                )
                .optional()
                .map_err(map_sql_error)?;

            let Some(mut record) = record else {
                return Ok(None);
            };
            record.laundry_enabled =
                get_meta(conn, &id, LAUNDRY_ENABLED)?.as_deref() == Some(ENABLED_VALUE);
            record.laundry_interval = get_meta(conn, &id, LAUNDRY_INTERVAL)?;
            Ok(Some(record))
        })
        .await
    }

    /// Remove an event and its settings. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: &EventId) -> DomainResult<bool> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            let removed = conn
                .execute("DELETE FROM events WHERE id = ?1", params![id.as_str()])
                .map_err(map_sql_error)?;
            Ok(removed > 0)
        })
        .await
    }

    /// Current earliest/latest bookkeeping.
    pub async fn known_range(&self) -> DomainResult<KnownRange> {
        with_connection(&self.db, |conn| load_known_range(conn)).await
    }
}

#[async_trait]
impl ExpiredEventScanner for SqliteEventRepository {
    #[instrument(skip(self))]
    async fn find_expired(&self, now: DateTime<Utc>) -> DomainResult<Vec<EventId>> {
        let cutoff = now.format(DB_DATETIME_FORMAT).to_string();
        with_connection(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT e.id FROM events e
                     JOIN event_meta m
                       ON m.event_id = e.id AND m.meta_key = ?1 AND m.meta_value = ?2
                     WHERE datetime(e.end_utc) < datetime(?3)
                     ORDER BY datetime(e.end_utc) ASC, e.id ASC",
                )
                .map_err(map_sql_error)?;
            let ids = stmt
                .query_map(params![LAUNDRY_ENABLED, ENABLED_VALUE, cutoff], |row| {
                    row.get::<_, String>(0)
                })
                .map_err(map_sql_error)?
                .map(|id| id.map(EventId::from).map_err(map_sql_error))
                .collect::<DomainResult<Vec<_>>>()?;
            debug!(expired = ids.len(), cutoff = %cutoff, "expired events scanned");
            Ok(ids)
        })
        .await
    }
}

#[async_trait]
impl SettingsStore for SqliteEventRepository {
    async fn get_enabled(&self, id: &EventId) -> DomainResult<bool> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            Ok(get_meta(conn, &id, LAUNDRY_ENABLED)?.as_deref() == Some(ENABLED_VALUE))
        })
        .await
    }

    async fn get_interval(&self, id: &EventId) -> DomainResult<Option<String>> {
        let id = id.clone();
        with_connection(&self.db, move |conn| get_meta(conn, &id, LAUNDRY_INTERVAL)).await
    }

    #[instrument(skip(self))]
    async fn set_enabled(&self, id: &EventId, enabled: bool) -> DomainResult<()> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            ensure_event_exists(conn, &id)?;
            let value = if enabled { ENABLED_VALUE } else { DISABLED_VALUE };
            put_meta(conn, &id, LAUNDRY_ENABLED, value)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn set_interval(&self, id: &EventId, interval: &str) -> DomainResult<()> {
        let id = id.clone();
        let interval = interval.to_string();
        with_connection(&self.db, move |conn| {
            ensure_event_exists(conn, &id)?;
            put_meta(conn, &id, LAUNDRY_INTERVAL, &interval)
        })
        .await
    }
}

#[async_trait]
impl EventDateStore for SqliteEventRepository {
    async fn load_dates(&self, id: &EventId) -> DomainResult<Option<StoredEventDates>> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT start_utc, end_utc, timezone FROM events WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(StoredEventDates {
                        start_utc: row.get(0)?,
                        end_utc: row.get(1)?,
                        timezone: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    #[instrument(skip(self, dates), fields(start = %dates.start_utc, end = %dates.end_utc))]
    async fn write_dates(&self, id: &EventId, dates: &LaunderedDates) -> DomainResult<()> {
        let id = id.clone();
        let row = [
            dates.start_utc_db(),
            dates.end_utc_db(),
            dates.start_local_db(),
            dates.end_local_db(),
        ];
        with_connection(&self.db, move |conn| {
            let [start_utc, end_utc, start_local, end_local] = row;
            let updated = conn
                .execute(
                    "UPDATE events
                     SET start_utc = ?1, end_utc = ?2, start_local = ?3, end_local = ?4,
                         updated_at = ?5
                     WHERE id = ?6",
                    params![
                        start_utc,
                        end_utc,
                        start_local,
                        end_local,
                        Utc::now().timestamp(),
                        id.as_str()
                    ],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(LaunderError::NotFound(format!("event {id}")));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl KnownRangeTracker for SqliteEventRepository {
    #[instrument(skip(self))]
    async fn update_known_range(&self, id: &EventId) -> DomainResult<()> {
        let id = id.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.unchecked_transaction().map_err(map_sql_error)?;
            let (start, end) = tx
                .query_row(
                    "SELECT COALESCE(start_local, start_utc), COALESCE(end_local, end_utc)
                     FROM events WHERE id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()
                .map_err(map_sql_error)?
                .ok_or_else(|| LaunderError::NotFound(format!("event {id}")))?;

            let current = load_known_range(&tx)?;
            let is_marker = current.earliest_event.as_ref() == Some(&id)
                || current.latest_event.as_ref() == Some(&id);

            // A marker event may have moved inward, so only a full pass is exact.
            let range = if is_marker {
                compute_known_range(&tx)?
            } else {
                widen(current, &id, start, end)
            };
            save_known_range(&tx, &range)?;
            tx.commit().map_err(map_sql_error)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn rebuild_known_range(&self) -> DomainResult<()> {
        with_connection(&self.db, |conn| {
            let range = compute_known_range(conn)?;
            save_known_range(conn, &range)
        })
        .await
    }
}

fn widen(mut range: KnownRange, id: &EventId, start: String, end: String) -> KnownRange {
    if range.earliest.as_ref().map_or(true, |earliest| &start < earliest) {
        range.earliest = Some(start);
        range.earliest_event = Some(id.clone());
    }
    if range.latest.as_ref().map_or(true, |latest| &end > latest) {
        range.latest = Some(end);
        range.latest_event = Some(id.clone());
    }
    range
}

fn compute_known_range(conn: &Connection) -> DomainResult<KnownRange> {
    let earliest: Option<(String, String)> = conn
        .query_row(
            "SELECT id, COALESCE(start_local, start_utc) AS start FROM events
             ORDER BY start ASC, id ASC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(map_sql_error)?;
    let latest: Option<(String, String)> = conn
        .query_row(
            "SELECT id, COALESCE(end_local, end_utc) AS end_at FROM events
             ORDER BY end_at DESC, id ASC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(map_sql_error)?;

    let (earliest_event, earliest) = earliest.unzip();
    let (latest_event, latest) = latest.unzip();
    Ok(KnownRange {
        earliest,
        latest,
        earliest_event: earliest_event.map(EventId::from),
        latest_event: latest_event.map(EventId::from),
    })
}

fn load_known_range(conn: &Connection) -> DomainResult<KnownRange> {
    conn.query_row(
        "SELECT earliest, latest, earliest_event, latest_event FROM known_range WHERE id = 1",
        [],
        |row| {
            Ok(KnownRange {
                earliest: row.get(0)?,
                latest: row.get(1)?,
                earliest_event: row.get::<_, Option<String>>(2)?.map(EventId::from),
                latest_event: row.get::<_, Option<String>>(3)?.map(EventId::from),
            })
        },
    )
    .optional()
    .map(Option::unwrap_or_default)
    .map_err(map_sql_error)
}

fn save_known_range(conn: &Connection, range: &KnownRange) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO known_range (id, earliest, latest, earliest_event, latest_event)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            earliest = excluded.earliest,
            latest = excluded.latest,
            earliest_event = excluded.earliest_event,
            latest_event = excluded.latest_event",
        params![
            range.earliest,
            range.latest,
            range.earliest_event.as_ref().map(EventId::as_str),
            range.latest_event.as_ref().map(EventId::as_str),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn ensure_event_exists(conn: &Connection, id: &EventId) -> DomainResult<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
            params![id.as_str()],
            |row| row.get(0),
        )
        .map_err(map_sql_error)?;
    if exists {
        Ok(())
    } else {
        Err(LaunderError::NotFound(format!("event {id}")))
    }
}

fn get_meta(conn: &Connection, id: &EventId, key: &str) -> DomainResult<Option<String>> {
    conn.query_row(
        "SELECT meta_value FROM event_meta WHERE event_id = ?1 AND meta_key = ?2",
        params![id.as_str(), key],
        |row| row.get(0),
    )
    .optional()
    .map_err(map_sql_error)
}

fn put_meta(conn: &Connection, id: &EventId, key: &str, value: &str) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO event_meta (event_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
         ON CONFLICT(event_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
        params![id.as_str(), key, value],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn delete_meta(conn: &Connection, id: &EventId, key: &str) -> DomainResult<()> {
    conn.execute(
        "DELETE FROM event_meta WHERE event_id = ?1 AND meta_key = ?2",
        params![id.as_str(), key],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        id: EventId::from(row.get::<_, String>(0)?),
        title: row.get(1)?,
        start_utc: row.get(2)?,
        end_utc: row.get(3)?,
        start_local: row.get(4)?,
        end_local: row.get(5)?,
        timezone: row.get(6)?,
        laundry_enabled: false,
        laundry_interval: None,
    })
}
