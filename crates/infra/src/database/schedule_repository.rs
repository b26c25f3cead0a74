//! SQLite persistence for recurring task anchors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use launder_core::{LaundrySchedule, ScheduleAnchorStore};
use launder_domain::{LaunderError, Recurrence, Result as DomainResult};
use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use super::manager::{map_sql_error, with_connection, DbManager};

pub struct SqliteScheduleRepository {
    db: Arc<DbManager>,
}

impl SqliteScheduleRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleAnchorStore for SqliteScheduleRepository {
    #[instrument(skip(self))]
    async fn load_anchor(&self, task: &str) -> DomainResult<Option<LaundrySchedule>> {
        let task = task.to_string();
        with_connection(&self.db, move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT anchor_utc, recurrence FROM scheduled_tasks WHERE task = ?1",
                    params![task],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(map_sql_error)?;

            row.map(|(anchor, recurrence)| -> DomainResult<LaundrySchedule> {
                let anchor = chrono::DateTime::parse_from_rfc3339(&anchor)
                    .map_err(|err| {
                        LaunderError::Database(format!("corrupt anchor for task {task}: {err}"))
                    })?
                    .with_timezone(&Utc);
                let recurrence = recurrence.parse::<Recurrence>().map_err(LaunderError::Database)?;
                Ok(LaundrySchedule::new(anchor, recurrence))
            })
            .transpose()
        })
        .await
    }

    #[instrument(skip(self, schedule), fields(anchor = %schedule.anchor))]
    async fn save_anchor(&self, task: &str, schedule: &LaundrySchedule) -> DomainResult<()> {
        let task = task.to_string();
        let anchor = schedule.anchor.to_rfc3339();
        let recurrence = schedule.recurrence.to_string();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO scheduled_tasks (task, anchor_utc, recurrence, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(task) DO UPDATE SET
                    anchor_utc = excluded.anchor_utc,
                    recurrence = excluded.recurrence",
                params![task, anchor, recurrence, Utc::now().timestamp()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn clear_anchor(&self, task: &str) -> DomainResult<bool> {
        let task = task.to_string();
        with_connection(&self.db, move |conn| {
            let removed = conn
                .execute("DELETE FROM scheduled_tasks WHERE task = ?1", params![task])
                .map_err(map_sql_error)?;
            Ok(removed > 0)
        })
        .await
    }
}
