use std::io;

use notesync_core::SyncOutcome;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Invalid note id: {0}")]
    InvalidNoteId(String),
    #[error("Folder {0} does not exist")]
    FolderNotFound(i64),
    #[error("Failed to save note {0}")]
    SaveFailed(String),
    #[error("Failed to {0}")]
    BatchFailed(&'static str),
    #[error(
        "Sync is not configured. Run `notesync config init --account <NAME> --remote-path <PATH>`."
    )]
    SyncNotConfigured,
    #[error("Sync finished with {0}")]
    SyncFailed(SyncOutcome),
}
