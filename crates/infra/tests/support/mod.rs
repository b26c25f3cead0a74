//! Shared fixtures for infra integration tests.

use std::sync::Arc;

use launder_domain::EventRecord;
use launder_infra::database::{DbManager, SqliteEventRepository, SqliteScheduleRepository};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("laundry-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn events(&self) -> SqliteEventRepository {
        SqliteEventRepository::new(Arc::clone(&self.manager))
    }

    #[allow(dead_code)]
    pub fn schedules(&self) -> SqliteScheduleRepository {
        SqliteScheduleRepository::new(Arc::clone(&self.manager))
    }

    /// Execute a batch of SQL statements against the database.
    #[allow(dead_code)]
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

/// Event with laundry enabled for `interval`, stored in UTC only.
#[allow(dead_code)]
pub fn laundry_event(id: &str, start_utc: &str, end_utc: &str, interval: &str) -> EventRecord {
    EventRecord::new(id, format!("Event {id}"), start_utc, end_utc, "UTC").with_laundry(interval)
}
