//! Client configuration for notesync.
//!
//! `NotesConfig` is a small JSON document shared by every front end. It names
//! the local database, the sync account and the remote task file, and holds
//! defaults applied when new notes are created.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{compact_text, normalize_text_option};

const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Number of background colors a note can use
pub const BG_COLOR_COUNT: i64 = 5;

/// Persisted client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub sync_account: Option<String>,
    /// JSON file acting as the remote task service
    #[serde(default)]
    pub remote_path: Option<PathBuf>,
    /// Cancel a sync pass that runs longer than this
    #[serde(default)]
    pub sync_timeout_secs: Option<u64>,
    #[serde(default)]
    pub default_bg_color: i64,
}

const fn default_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

impl NotesConfig {
    /// Trim text fields and drop empty ones
    pub fn normalize(&mut self) {
        self.sync_account = normalize_text_option(self.sync_account.take());
        self.database_path = self
            .database_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
        self.remote_path = self
            .remote_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
        self.sync_timeout_secs = self.sync_timeout_secs.filter(|secs| *secs > 0);
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version {} (expected {CONFIG_SCHEMA_VERSION})",
                self.version
            )));
        }
        if !(0..BG_COLOR_COUNT).contains(&self.default_bg_color) {
            return Err(Error::Config(format!(
                "default_bg_color must be between 0 and {}",
                BG_COLOR_COUNT - 1
            )));
        }
        Ok(())
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout_secs.map(Duration::from_secs)
    }

    /// Parse, normalize and validate a config document
    pub fn parse(raw: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(raw).map_err(|error| {
            Error::Config(format!("invalid config JSON: {}", compact_text(&error.to_string())))
        })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default_config()),
            Err(error) => Err(error.into()),
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Defaults with the current schema version set
    pub fn default_config() -> Self {
        Self {
            version: CONFIG_SCHEMA_VERSION,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = NotesConfig::load_from_path(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, NotesConfig::default_config());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = NotesConfig {
            sync_account: Some("me@example.com".to_string()),
            remote_path: Some(dir.path().join("tasks.json")),
            sync_timeout_secs: Some(30),
            default_bg_color: 2,
            ..NotesConfig::default_config()
        };
        config.save_to_path(&path).unwrap();

        let loaded = NotesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.sync_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let error = NotesConfig::parse(r#"{"version": 1, "turso_url": "x"}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn test_parse_normalizes_empty_values() {
        let config = NotesConfig::parse(
            r#"{"sync_account": "   ", "database_path": "", "sync_timeout_secs": 0}"#,
        )
        .unwrap();
        assert_eq!(config.sync_account, None);
        assert_eq!(config.database_path, None);
        assert_eq!(config.sync_timeout(), None);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            NotesConfig::parse(r#"{"version": 9}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            NotesConfig::parse(r#"{"default_bg_color": 7}"#),
            Err(Error::Config(_))
        ));
    }
}
