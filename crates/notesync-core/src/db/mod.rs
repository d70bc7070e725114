//! Database layer for notesync

mod connection;
mod migrations;
mod settings_repository;
mod sqlite_store;
mod store;

pub use connection::Database;
pub use settings_repository::{SettingsRepository, SqliteSettingsRepository};
pub use sqlite_store::SqliteRecordStore;
pub use store::{OpResult, Predicate, RecordStore, Row, StoreOp};
