//! Settings repository implementation

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::SyncSettings;
use crate::sync::SyncPreferences;

const KEY_ACCOUNT_NAME: &str = "sync_account_name";
const KEY_LAST_SYNC_TIME: &str = "last_sync_time";

/// Trait for settings storage operations
pub trait SettingsRepository {
    /// Load settings from the database
    fn load(&self) -> Result<SyncSettings>;

    /// Save settings to the database
    fn save(&self, settings: &SyncSettings) -> Result<()>;
}

/// `SQLite` implementation of `SettingsRepository`
#[derive(Clone)]
pub struct SqliteSettingsRepository {
    db: Database,
}

impl SqliteSettingsRepository {
    /// Create a new repository on the given database
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.db.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: Option<&str>) -> Result<()> {
        let conn = self.db.lock()?;
        match value {
            Some(value) => conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                params![key, value],
            )?,
            None => conn.execute("DELETE FROM settings WHERE key = ?", params![key])?,
        };
        Ok(())
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    fn load(&self) -> Result<SyncSettings> {
        let account_name = crate::util::normalize_text_option(self.get_setting(KEY_ACCOUNT_NAME)?);
        let last_sync_time = self
            .get_setting(KEY_LAST_SYNC_TIME)?
            .and_then(|value| value.parse().ok());

        Ok(SyncSettings {
            account_name,
            last_sync_time,
        })
    }

    fn save(&self, settings: &SyncSettings) -> Result<()> {
        self.set_setting(KEY_ACCOUNT_NAME, settings.account_name.as_deref())?;
        let last_sync_time = settings.last_sync_time.map(|time| time.to_string());
        self.set_setting(KEY_LAST_SYNC_TIME, last_sync_time.as_deref())
    }
}

impl SyncPreferences for SqliteSettingsRepository {
    fn set_last_sync_time(&self, time_ms: i64) -> Result<()> {
        self.set_setting(KEY_LAST_SYNC_TIME, Some(&time_ms.to_string()))
    }

    fn last_sync_time(&self) -> Result<Option<i64>> {
        Ok(self.load()?.last_sync_time)
    }
}
