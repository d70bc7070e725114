//! Config file and database path resolution

use std::env;
use std::path::{Path, PathBuf};

use notesync_core::NotesConfig;

use crate::error::CliError;

const CONFIG_ENV: &str = "NOTESYNC_CONFIG";
const DB_PATH_ENV: &str = "NOTESYNC_DB_PATH";

/// Paths and config the commands run with
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub config: NotesConfig,
    pub db_path: PathBuf,
}

impl Settings {
    pub fn resolve(
        cli_config_path: Option<PathBuf>,
        cli_db_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let config_path = resolve_config_path(cli_config_path, env::var_os(CONFIG_ENV));
        let config = NotesConfig::load_from_path(&config_path)?;
        let db_path = resolve_db_path(cli_db_path, env::var_os(DB_PATH_ENV), &config);
        tracing::debug!(
            "Using config {} and database {}",
            config_path.display(),
            db_path.display()
        );
        Ok(Self {
            config_path,
            config,
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

pub fn resolve_config_path(
    cli_path: Option<PathBuf>,
    env_path: Option<std::ffi::OsString>,
) -> PathBuf {
    cli_path
        .or_else(|| env_path.filter(|path| !path.is_empty()).map(PathBuf::from))
        .unwrap_or_else(default_config_path)
}

pub fn resolve_db_path(
    cli_path: Option<PathBuf>,
    env_path: Option<std::ffi::OsString>,
    config: &NotesConfig,
) -> PathBuf {
    cli_path
        .or_else(|| env_path.filter(|path| !path.is_empty()).map(PathBuf::from))
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(default_db_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("notesync")
        .join("config.json")
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("notesync")
        .join("notesync.db")
}
