use std::path::{Path, PathBuf};

use notesync_core::db::{Database, SettingsRepository};
use notesync_core::util::normalize_text_option;
use notesync_core::NotesConfig;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::format_timestamp;
use crate::error::CliError;
use crate::settings::Settings;

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    config_path: &'a Path,
    db_path: &'a Path,
    config: &'a NotesConfig,
    last_sync_time: Option<i64>,
}

pub fn run_config(command: ConfigCommands, settings: &Settings) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { json } => run_config_show(json, settings),
        ConfigCommands::Init {
            account,
            remote_path,
            timeout,
            bg,
            database_path,
        } => {
            let config = run_config_init(
                &settings.config,
                account,
                remote_path,
                timeout,
                bg,
                database_path,
            )?;
            config.save_to_path(&settings.config_path)?;
            remember_account(&config, &settings.db_path)?;
            println!("{}", settings.config_path.display());
            Ok(())
        }
    }
}

fn run_config_show(as_json: bool, settings: &Settings) -> Result<(), CliError> {
    let last_sync_time = if settings.db_path.exists() {
        Database::open(&settings.db_path)?.settings().load()?.last_sync_time
    } else {
        None
    };

    if as_json {
        let report = ConfigReport {
            config_path: &settings.config_path,
            db_path: &settings.db_path,
            config: &settings.config,
            last_sync_time,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let config = &settings.config;
    println!("config:    {}", settings.config_path.display());
    println!("database:  {}", settings.db_path.display());
    println!(
        "account:   {}",
        config.sync_account.as_deref().unwrap_or("(not set)")
    );
    println!(
        "remote:    {}",
        config
            .remote_path
            .as_ref()
            .map_or_else(|| "(not set)".to_string(), |path| path.display().to_string())
    );
    if let Some(timeout) = config.sync_timeout_secs {
        println!("timeout:   {timeout}s");
    }
    println!("bg color:  {}", config.default_bg_color);
    println!(
        "last sync: {}",
        last_sync_time.map_or_else(|| "never".to_string(), format_timestamp)
    );
    Ok(())
}

/// Merge explicit values over `existing`; omitted values are kept
pub fn run_config_init(
    existing: &NotesConfig,
    account: Option<String>,
    remote_path: Option<PathBuf>,
    timeout: Option<u64>,
    bg: Option<i64>,
    database_path: Option<PathBuf>,
) -> Result<NotesConfig, CliError> {
    let mut config = existing.clone();
    if let Some(account) = normalize_text_option(account) {
        config.sync_account = Some(account);
    }
    if remote_path.is_some() {
        config.remote_path = remote_path;
    }
    if timeout.is_some() {
        config.sync_timeout_secs = timeout;
    }
    if let Some(bg) = bg {
        config.default_bg_color = bg;
    }
    if database_path.is_some() {
        config.database_path = database_path;
    }
    config.normalize();
    config.validate()?;
    Ok(config)
}

fn remember_account(config: &NotesConfig, db_path: &Path) -> Result<(), CliError> {
    let Some(account) = config.sync_account.clone() else {
        return Ok(());
    };
    let repo = Database::open(db_path)?.settings();
    let mut stored = repo.load()?;
    if stored.account_name.as_deref() != Some(account.as_str()) {
        stored.account_name = Some(account);
        stored.last_sync_time = None;
        repo.save(&stored)?;
    }
    Ok(())
}
