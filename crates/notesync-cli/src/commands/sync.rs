use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notesync_core::db::SettingsRepository;
use notesync_core::sync::{
    FileTaskService, StoreSyncOrchestrator, SyncFinished, SyncNotifier, SyncOutcome,
};
use notesync_core::{NotesConfig, SyncService};

use crate::commands::common::{format_timestamp, open_store};
use crate::error::CliError;

/// Prints progress on stderr and the final message on stdout
pub struct ConsoleNotifier;

impl SyncNotifier for ConsoleNotifier {
    fn progress(&self, message: &str) {
        eprintln!("{message}");
    }

    fn finished(&self, outcome: SyncOutcome, message: &str) {
        tracing::info!("Sync finished: {outcome}");
        println!("{message}");
    }
}

pub async fn run_sync(
    timeout_secs: Option<u64>,
    config: &NotesConfig,
    db_path: &Path,
) -> Result<SyncOutcome, CliError> {
    let (db, store) = open_store(db_path)?;
    let settings = db.settings();

    let account = config
        .sync_account
        .clone()
        .or(settings.load()?.account_name)
        .ok_or(CliError::SyncNotConfigured)?;
    let remote_path = config
        .remote_path
        .clone()
        .ok_or(CliError::SyncNotConfigured)?;

    let remote = Arc::new(FileTaskService::new(remote_path));
    let orchestrator = Arc::new(StoreSyncOrchestrator::new(store, remote, account));
    let deadline = timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .or_else(|| config.sync_timeout());

    let service = SyncService::new(orchestrator, Arc::new(ConsoleNotifier))
        .with_preferences(Arc::new(settings.clone()))
        .with_deadline(deadline);
    let handle = service.start(None)?;

    let wait = handle.wait();
    tokio::pin!(wait);
    let finished: SyncFinished = tokio::select! {
        finished = &mut wait => finished,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Cancelling sync...");
            service.cancel_sync();
            wait.await
        }
    };

    if let Some(listener) = finished.listener {
        listener.await.ok();
    }

    if !finished.outcome.is_success() {
        return Err(CliError::SyncFailed(finished.outcome));
    }
    if let Some(last_sync_time) = settings.load()?.last_sync_time {
        tracing::debug!("Last sync at {}", format_timestamp(last_sync_time));
    }
    Ok(finished.outcome)
}
