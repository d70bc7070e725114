//! Single-flight entry point for starting sync passes

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::task::RunningGuard;
use super::{CancelFlag, SyncHandle, SyncNotifier, SyncOrchestrator, SyncPreferences, SyncTask};
use crate::error::{Error, Result};

/// Owns the orchestrator and allows at most one running pass
pub struct SyncService {
    orchestrator: Arc<dyn SyncOrchestrator>,
    notifier: Arc<dyn SyncNotifier>,
    preferences: Option<Arc<dyn SyncPreferences>>,
    deadline: Option<Duration>,
    running: Arc<AtomicBool>,
    /// Cancel flag of the most recently started pass
    current: Mutex<Option<CancelFlag>>,
}

impl fmt::Debug for SyncService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncService")
            .field("deadline", &self.deadline)
            .field("running", &self.is_syncing())
            .finish_non_exhaustive()
    }
}

impl SyncService {
    pub fn new(orchestrator: Arc<dyn SyncOrchestrator>, notifier: Arc<dyn SyncNotifier>) -> Self {
        Self {
            orchestrator,
            notifier,
            preferences: None,
            deadline: None,
            running: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Arc<dyn SyncPreferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Start a pass unless one is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        on_complete: Option<Box<dyn FnOnce() + Send + 'static>>,
    ) -> Result<SyncHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Sync already in progress");
            return Err(Error::SyncInProgress);
        }

        let mut task = SyncTask::new(Arc::clone(&self.orchestrator), Arc::clone(&self.notifier))
            .with_running_guard(RunningGuard(Arc::clone(&self.running)));
        if let Some(preferences) = &self.preferences {
            task = task.with_preferences(Arc::clone(preferences));
        }
        if let Some(deadline) = self.deadline {
            task = task.with_deadline(deadline);
        }
        if let Some(listener) = on_complete {
            task = task.on_complete(listener);
        }

        if let Ok(mut current) = self.current.lock() {
            *current = Some(task.cancel_flag());
        }
        Ok(task.spawn())
    }

    /// Cancel the running pass, if any. The orchestrator drops a request
    /// that lands after the pass has ended when its next pass begins.
    pub fn cancel_sync(&self) {
        if !self.is_syncing() {
            return;
        }
        if let Ok(current) = self.current.lock() {
            if let Some(cancel) = current.as_ref() {
                cancel.cancel();
            }
        }
        self.orchestrator.cancel_sync();
    }

    pub fn is_syncing(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::task::tests::{release, RecordingNotifier, ScriptedOrchestrator};
    use crate::sync::SyncOutcome;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_start_is_rejected_while_running() {
        let (orchestrator, gate) = ScriptedOrchestrator::returning(SyncOutcome::Success).gated();
        let service = SyncService::new(
            Arc::new(orchestrator),
            Arc::new(RecordingNotifier::default()),
        );

        let handle = service.start(None).unwrap();
        assert!(service.is_syncing());
        assert!(matches!(service.start(None), Err(Error::SyncInProgress)));

        release(&gate);
        assert_eq!(handle.wait().await.outcome, SyncOutcome::Success);
        assert!(!service.is_syncing());

        let again = service.start(None).unwrap();
        assert_eq!(again.wait().await.outcome, SyncOutcome::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_sync_reaches_running_pass() {
        let (orchestrator, _gate) = ScriptedOrchestrator::returning(SyncOutcome::Success).gated();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = SyncService::new(Arc::new(orchestrator), notifier.clone());

        let handle = service.start(None).unwrap();
        service.cancel_sync();
        assert_eq!(handle.wait().await.outcome, SyncOutcome::Cancelled);
        assert_eq!(notifier.finished.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_right_after_start_is_honored() {
        let (orchestrator, _gate) = ScriptedOrchestrator::returning(SyncOutcome::Success).gated();
        let service = SyncService::new(
            Arc::new(orchestrator),
            Arc::new(RecordingNotifier::default()),
        );

        let handle = service.start(None).unwrap();
        service.cancel_sync();
        assert_eq!(handle.wait().await.outcome, SyncOutcome::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_after_pass_does_not_reach_next_pass() {
        let orchestrator = Arc::new(ScriptedOrchestrator::returning(SyncOutcome::Success));
        let service = SyncService::new(orchestrator.clone(), Arc::new(RecordingNotifier::default()));

        let first = service.start(None).unwrap();
        let finished = first.wait().await;
        assert_eq!(finished.outcome, SyncOutcome::Success);
        service.cancel_sync();
        orchestrator.cancel_sync();

        let second = service.start(None).unwrap();
        assert_eq!(second.wait().await.outcome, SyncOutcome::Success);
    }

    #[test]
    fn test_cancel_without_running_pass_is_ignored() {
        let orchestrator = Arc::new(ScriptedOrchestrator::returning(SyncOutcome::Success));
        let service = SyncService::new(orchestrator, Arc::new(RecordingNotifier::default()));
        service.cancel_sync();
        assert!(!service.is_syncing());
    }
}
