//! notesync-core - Core library for notesync
//!
//! Diff-tracked note editing over a record store, batched atomic
//! persistence, and background synchronization with a remote task service.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod note;
pub mod queries;
pub mod sync;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::NotesConfig;
pub use error::{Error, Result};
pub use models::{NoteSummary, RecordId};
pub use note::{NoteSettingChanged, WorkingNote};
pub use sync::{SyncOutcome, SyncService};
