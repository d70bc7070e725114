//! Background job that drives one sync pass to a terminal outcome

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{CancelFlag, ProgressSink, SyncOrchestrator, SyncOutcome};
use crate::error::Result;
use crate::util::now_millis;

/// Runs once after the outcome has been delivered
pub type CompletionListener = Box<dyn FnOnce() + Send + 'static>;

/// Receives progress and the final result of a sync task
pub trait SyncNotifier: Send + Sync {
    fn progress(&self, message: &str);

    /// Called exactly once per task
    fn finished(&self, outcome: SyncOutcome, message: &str);
}

/// Where the time of the last successful sync is kept
pub trait SyncPreferences: Send + Sync {
    fn set_last_sync_time(&self, time_ms: i64) -> Result<()>;

    fn last_sync_time(&self) -> Result<Option<i64>>;
}

/// Clears the single-flight flag when the task is dropped
pub(super) struct RunningGuard(pub(super) Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Result handed back when the task ends
#[derive(Debug)]
pub struct SyncFinished {
    pub outcome: SyncOutcome,
    pub message: String,
    /// Completion listener running on its own worker, if one was registered
    pub listener: Option<JoinHandle<()>>,
}

/// One sync invocation.
///
/// The pass runs on a blocking worker. Progress, the finished notification
/// and the last-sync bookkeeping happen on the task driving [`SyncTask::run`].
pub struct SyncTask {
    orchestrator: Arc<dyn SyncOrchestrator>,
    notifier: Arc<dyn SyncNotifier>,
    preferences: Option<Arc<dyn SyncPreferences>>,
    on_complete: Option<CompletionListener>,
    deadline: Option<Duration>,
    running: Option<RunningGuard>,
    cancel: CancelFlag,
}

impl fmt::Debug for SyncTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncTask")
            .field("has_preferences", &self.preferences.is_some())
            .field("has_listener", &self.on_complete.is_some())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl SyncTask {
    pub fn new(orchestrator: Arc<dyn SyncOrchestrator>, notifier: Arc<dyn SyncNotifier>) -> Self {
        Self {
            orchestrator,
            notifier,
            preferences: None,
            on_complete: None,
            deadline: None,
            running: None,
            cancel: CancelFlag::new(),
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Arc<dyn SyncPreferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Register the completion listener; it runs whatever the outcome
    #[must_use]
    pub fn on_complete(mut self, listener: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(listener));
        self
    }

    /// Request cancellation once `deadline` has elapsed
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub(super) fn with_running_guard(mut self, guard: RunningGuard) -> Self {
        self.running = Some(guard);
        self
    }

    /// Cancel this task's pass. A request made before the pass starts is
    /// honored; one made after its outcome is fixed has no effect.
    pub fn cancel_sync(&self) {
        self.cancel.cancel();
    }

    pub(super) fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run the task on the current runtime and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> SyncHandle {
        let orchestrator = Arc::clone(&self.orchestrator);
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run());
        SyncHandle {
            orchestrator,
            cancel,
            join,
        }
    }

    /// Drive the pass to its outcome.
    pub async fn run(mut self) -> SyncFinished {
        let account = self.orchestrator.account_label();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ProgressSink::with_cancel(tx, self.cancel.clone());
        sink.publish(format!("Logging in to {account}..."));

        let orchestrator = Arc::clone(&self.orchestrator);
        // the sink is dropped when the pass returns, which closes the channel
        let pass = tokio::task::spawn_blocking(move || orchestrator.sync(&sink));

        let deadline = self.deadline.map(|deadline| Instant::now() + deadline);
        let mut deadline_hit = false;
        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(message) => self.notifier.progress(&message),
                    None => break,
                },
                () = wait_until(deadline), if !deadline_hit => {
                    deadline_hit = true;
                    tracing::warn!("Sync with {account} ran past its deadline, cancelling");
                    self.cancel.cancel();
                }
            }
        }

        let outcome = match pass.await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!("Sync pass aborted: {error}");
                SyncOutcome::InternalError
            }
        };

        if outcome.is_success() {
            if let Some(preferences) = &self.preferences {
                if let Err(error) = preferences.set_last_sync_time(now_millis()) {
                    tracing::warn!("Failed to record last sync time: {error}");
                }
            }
        }

        let message = outcome.message(&account);
        tracing::info!("Sync with {account} finished: {outcome}");
        self.notifier.finished(outcome, &message);
        drop(self.running.take());

        let listener = self.on_complete.take().map(tokio::task::spawn_blocking);
        SyncFinished {
            outcome,
            message,
            listener,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle to a spawned [`SyncTask`]
pub struct SyncHandle {
    orchestrator: Arc<dyn SyncOrchestrator>,
    cancel: CancelFlag,
    join: JoinHandle<SyncFinished>,
}

impl fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHandle")
            .field("join", &self.join)
            .finish_non_exhaustive()
    }
}

impl SyncHandle {
    /// Ask this task's pass to stop at its next checkpoint.
    /// Other passes on the same orchestrator are not affected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to end
    pub async fn wait(self) -> SyncFinished {
        match self.join.await {
            Ok(finished) => finished,
            Err(error) => {
                tracing::error!("Sync task aborted: {error}");
                let account = self.orchestrator.account_label();
                SyncFinished {
                    outcome: SyncOutcome::InternalError,
                    message: SyncOutcome::InternalError.message(&account),
                    listener: None,
                }
            }
        }
    }
}
