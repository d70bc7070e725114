//! Reconciliation of the local record store with a remote task service

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{CancelFlag, ProgressSink, RemoteError, RemoteTask, RemoteTaskService, SyncOrchestrator, SyncOutcome};
use crate::db::{Predicate, RecordStore, Row, StoreOp};
use crate::error::Error;
use crate::models::{data, folders, note, Collection, ContentKind, FieldMap, NoteType, RecordId, Value};
use crate::util::now_millis;

/// Why a pass stopped early
#[derive(Debug)]
enum PassError {
    Cancelled,
    Remote(RemoteError),
    Store(Error),
}

impl From<RemoteError> for PassError {
    fn from(error: RemoteError) -> Self {
        Self::Remote(error)
    }
}

impl From<Error> for PassError {
    fn from(error: Error) -> Self {
        Self::Store(error)
    }
}

type PassResult<T> = Result<T, PassError>;

/// Local note as the pass sees it
#[derive(Debug)]
struct LocalNote {
    id: RecordId,
    parent_id: i64,
    local_modified: bool,
    sync_id: i64,
    gtask_id: String,
    modified_date: i64,
}

impl LocalNote {
    fn from_row(row: &Row) -> Self {
        Self {
            id: row.get_id(note::ID),
            parent_id: row.get_i64(note::PARENT_ID),
            local_modified: row.get_i64(note::LOCAL_MODIFIED) != 0,
            sync_id: row.get_i64(note::SYNC_ID),
            gtask_id: row.get_string(note::GTASK_ID),
            modified_date: row.get_i64(note::MODIFIED_DATE),
        }
    }
}

const LOCAL_PROJECTION: &[&str] = &[
    note::ID,
    note::PARENT_ID,
    note::LOCAL_MODIFIED,
    note::SYNC_ID,
    note::GTASK_ID,
    note::MODIFIED_DATE,
];

/// Pushes locally modified notes, then pulls remote changes.
///
/// Local edits win over remote ones: a remote update is applied only to a
/// note with no pending local changes. Notes in the trash are deleted
/// remotely; remote deletions move the local note to the trash.
pub struct StoreSyncOrchestrator {
    store: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteTaskService>,
    account: String,
    cancel: CancelFlag,
}

impl fmt::Debug for StoreSyncOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSyncOrchestrator")
            .field("account", &self.account)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl StoreSyncOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        remote: Arc<dyn RemoteTaskService>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            store,
            remote,
            account: account.into(),
            cancel: CancelFlag::new(),
        }
    }

    fn checkpoint(&self, progress: &ProgressSink) -> PassResult<()> {
        if self.cancel.is_cancelled() || progress.is_cancelled() {
            return Err(PassError::Cancelled);
        }
        Ok(())
    }

    fn run_pass(&self, progress: &ProgressSink) -> PassResult<()> {
        self.checkpoint(progress)?;
        self.remote.login(&self.account)?;

        let pushed = self.push_local_changes(progress)?;
        let pulled = self.pull_remote_changes(progress)?;
        tracing::info!("Sync pushed {pushed} and pulled {pulled} notes");
        Ok(())
    }

    fn text_content(&self, note_id: RecordId) -> PassResult<Option<(RecordId, String)>> {
        let rows = self.store.query(
            Collection::Data,
            &[data::ID, data::CONTENT],
            &Predicate::eq(data::NOTE_ID, note_id)
                .and(Predicate::eq(data::MIME_TYPE, ContentKind::Text.mime_type())),
        )?;
        Ok(rows
            .first()
            .map(|row| (row.get_id(data::ID), row.get_string(data::CONTENT))))
    }

    fn push_local_changes(&self, progress: &ProgressSink) -> PassResult<usize> {
        let rows = self.store.query(
            Collection::Notes,
            LOCAL_PROJECTION,
            &Predicate::eq(note::LOCAL_MODIFIED, 1).and(Predicate::eq(note::TYPE, NoteType::Note.code())),
        )?;
        progress.publish(format!("Uploading {} local changes...", rows.len()));

        for row in &rows {
            self.checkpoint(progress)?;
            let local = LocalNote::from_row(row);

            let mut fields = FieldMap::from([(note::LOCAL_MODIFIED, Value::from(0))]);
            if local.parent_id == folders::TRASH {
                if !local.gtask_id.is_empty() {
                    self.remote.delete_task(&local.gtask_id)?;
                }
            } else {
                let content = self
                    .text_content(local.id)?
                    .map(|(_, content)| content)
                    .unwrap_or_default();
                let stored = self.remote.upsert_task(&RemoteTask {
                    gid: local.gtask_id.clone(),
                    content,
                    deleted: false,
                    modified: local.modified_date,
                })?;
                fields.insert(note::GTASK_ID, Value::from(stored.gid));
                fields.insert(note::SYNC_ID, Value::from(stored.modified));
            }

            if self.store.update(Collection::Notes, local.id, &fields)? == 0 {
                tracing::warn!("Note {} vanished during sync", local.id);
            }
        }
        Ok(rows.len())
    }

    fn pull_remote_changes(&self, progress: &ProgressSink) -> PassResult<usize> {
        self.checkpoint(progress)?;
        progress.publish("Fetching remote notes...");
        let tasks = self.remote.fetch_tasks()?;

        let known: HashMap<String, LocalNote> = self
            .store
            .query(
                Collection::Notes,
                LOCAL_PROJECTION,
                &Predicate::ne(note::GTASK_ID, ""),
            )?
            .iter()
            .map(LocalNote::from_row)
            .map(|local| (local.gtask_id.clone(), local))
            .collect();

        progress.publish(format!("Merging {} remote notes...", tasks.len()));
        let mut pulled = 0;
        for task in &tasks {
            self.checkpoint(progress)?;
            let applied = match known.get(&task.gid) {
                Some(local) => self.apply_remote_change(local, task)?,
                None if task.deleted => false,
                None => {
                    self.create_from_remote(task)?;
                    true
                }
            };
            if applied {
                pulled += 1;
            }
        }
        Ok(pulled)
    }

    fn apply_remote_change(&self, local: &LocalNote, task: &RemoteTask) -> PassResult<bool> {
        if task.deleted {
            if local.parent_id == folders::TRASH {
                return Ok(false);
            }
            let fields = FieldMap::from([
                (note::PARENT_ID, Value::from(folders::TRASH)),
                (note::ORIGIN_PARENT_ID, Value::from(local.parent_id)),
                (note::SYNC_ID, Value::from(task.modified)),
            ]);
            self.store.update(Collection::Notes, local.id, &fields)?;
            return Ok(true);
        }

        if local.local_modified || task.modified <= local.sync_id {
            return Ok(false);
        }

        let mut ops = vec![StoreOp::Update {
            collection: Collection::Notes,
            id: local.id,
            fields: FieldMap::from([
                (note::SYNC_ID, Value::from(task.modified)),
                (note::MODIFIED_DATE, Value::from(task.modified)),
            ]),
        }];
        ops.push(match self.text_content(local.id)? {
            Some((data_id, _)) => StoreOp::Update {
                collection: Collection::Data,
                id: data_id,
                fields: FieldMap::from([(data::CONTENT, Value::from(task.content.as_str()))]),
            },
            None => StoreOp::Insert {
                collection: Collection::Data,
                fields: text_row(local.id, &task.content),
            },
        });
        self.store.batch_apply(&ops)?;
        Ok(true)
    }

    fn create_from_remote(&self, task: &RemoteTask) -> PassResult<()> {
        let now = now_millis();
        let fields = FieldMap::from([
            (note::PARENT_ID, Value::from(folders::ROOT)),
            (note::TYPE, Value::from(NoteType::Note.code())),
            (note::CREATED_DATE, Value::from(now)),
            (note::MODIFIED_DATE, Value::from(task.modified)),
            (note::GTASK_ID, Value::from(task.gid.as_str())),
            (note::SYNC_ID, Value::from(task.modified)),
            (note::LOCAL_MODIFIED, Value::from(0)),
        ]);
        let note_id = self.store.insert(Collection::Notes, &fields)?;
        if !note_id.is_persisted() {
            return Err(PassError::Store(Error::InvalidRecordId(format!(
                "Wrong note id: {note_id}"
            ))));
        }
        self.store
            .insert(Collection::Data, &text_row(note_id, &task.content))?;
        Ok(())
    }
}

fn text_row(note_id: RecordId, content: &str) -> FieldMap {
    FieldMap::from([
        (data::NOTE_ID, Value::from(note_id)),
        (data::MIME_TYPE, Value::from(ContentKind::Text.mime_type())),
        (data::CONTENT, Value::from(content)),
    ])
}

impl SyncOrchestrator for StoreSyncOrchestrator {
    fn sync(&self, progress: &ProgressSink) -> SyncOutcome {
        // requests made between passes belong to no pass
        self.cancel.reset();
        match self.run_pass(progress) {
            Ok(()) => SyncOutcome::Success,
            Err(PassError::Cancelled) => SyncOutcome::Cancelled,
            Err(PassError::Remote(RemoteError::Network(message))) => {
                tracing::warn!("Sync network failure: {message}");
                SyncOutcome::NetworkError
            }
            Err(PassError::Remote(error)) => {
                tracing::error!("Sync failed: {error}");
                SyncOutcome::InternalError
            }
            Err(PassError::Store(error)) => {
                tracing::error!("Sync failed on local store: {error}");
                SyncOutcome::InternalError
            }
        }
    }

    fn cancel_sync(&self) {
        self.cancel.cancel();
    }

    fn account_label(&self) -> String {
        self.account.clone()
    }
}
