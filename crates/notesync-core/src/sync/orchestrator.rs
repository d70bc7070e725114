//! Contract between the sync task and whatever performs the reconciliation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::SyncOutcome;

/// Per-pass channel between the task and the orchestrator.
///
/// Carries progress messages back to the task, in emission order, and the
/// cancellation state of this one pass. Sending after the task has stopped
/// listening is silently ignored.
#[derive(Debug, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<String>>,
    cancel: CancelFlag,
}

impl ProgressSink {
    pub fn new(tx: UnboundedSender<String>) -> Self {
        Self::with_cancel(tx, CancelFlag::new())
    }

    pub const fn with_cancel(tx: UnboundedSender<String>, cancel: CancelFlag) -> Self {
        Self {
            tx: Some(tx),
            cancel,
        }
    }

    /// A sink that drops every message and is never cancelled
    pub fn discard() -> Self {
        Self::default()
    }

    /// Whether this pass was asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn publish(&self, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(message.into());
        }
    }
}

/// Shared cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Performs one reconciliation pass against a remote task service.
///
/// `sync` blocks for the whole pass and is run on a blocking worker. The pass
/// stops at its next checkpoint with `Cancelled` once either `cancel_sync` is
/// called while it runs or `progress.is_cancelled()` turns true. A
/// `cancel_sync` request left over from an earlier pass is dropped when the
/// next pass begins.
pub trait SyncOrchestrator: Send + Sync {
    fn sync(&self, progress: &ProgressSink) -> SyncOutcome;

    fn cancel_sync(&self);

    /// Account name shown in progress and result messages
    fn account_label(&self) -> String;
}
