//! Database implementations

pub mod event_repository;
pub mod manager;
pub mod schedule_repository;

pub use event_repository::SqliteEventRepository;
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use schedule_repository::SqliteScheduleRepository;
