//! Background synchronization with a remote task service.
//!
//! [`SyncTask`] drives one pass of a [`SyncOrchestrator`] on a blocking
//! worker, relays progress, and resolves to a [`SyncOutcome`].
//! [`SyncService`] keeps at most one task running.

mod orchestrator;
mod outcome;
mod reconcile;
mod remote;
mod service;
mod task;

pub use orchestrator::{CancelFlag, ProgressSink, SyncOrchestrator};
pub use outcome::{SyncOutcome, SYNC_IN_PROGRESS_CODE};
pub use reconcile::StoreSyncOrchestrator;
pub use remote::{FileTaskService, RemoteError, RemoteResult, RemoteTask, RemoteTaskService};
pub use service::SyncService;
pub use task::{
    CompletionListener, SyncFinished, SyncHandle, SyncNotifier, SyncPreferences, SyncTask,
};
