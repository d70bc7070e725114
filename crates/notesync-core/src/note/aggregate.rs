//! Pending edits for one note and the flush that persists them

use crate::db::{RecordStore, StoreOp};
use crate::error::{Error, Result};
use crate::models::{data, note, Collection, ContentKind, FieldMap, NoteType, RecordId, Value};
use crate::note::DirtyRecord;
use crate::util::now_millis;

/// Which record a field change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Note,
    Content(ContentKind),
}

/// Content row of one kind: its id once persisted and its pending changes
#[derive(Debug)]
struct ContentSlot {
    kind: ContentKind,
    id: RecordId,
    pending: DirtyRecord,
}

impl ContentSlot {
    const fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            id: RecordId::NEW,
            pending: DirtyRecord::new(),
        }
    }

    fn assign_id(&mut self, id: RecordId) -> Result<()> {
        if !id.is_persisted() {
            return Err(Error::InvalidRecordId(format!(
                "{} data id should be larger than 0, got {id}",
                self.kind
            )));
        }
        if self.id.is_persisted() && self.id != id {
            return Err(Error::InvalidRecordId(format!(
                "{} data id is already {}, refusing {id}",
                self.kind, self.id
            )));
        }
        self.id = id;
        Ok(())
    }

    /// Insert a new content row right away, or queue an update for the batch.
    ///
    /// Returns `false` when the insert fails; the pending changes are dropped
    /// in that case so a retry starts from the caller's next edit.
    fn push(&mut self, store: &dyn RecordStore, note_id: RecordId, batch: &mut Vec<StoreOp>) -> bool {
        if !self.pending.is_dirty() {
            return true;
        }
        self.pending.put(data::NOTE_ID, note_id);

        if self.id.is_persisted() {
            batch.push(StoreOp::Update {
                collection: Collection::Data,
                id: self.id,
                fields: self.pending.fields().clone(),
            });
            return true;
        }

        self.pending.put(data::MIME_TYPE, self.kind.mime_type());
        let inserted = store.insert(Collection::Data, self.pending.fields());
        self.pending.clear();
        match inserted {
            Ok(id) if id.is_persisted() => {
                self.id = id;
                true
            }
            Ok(id) => {
                tracing::error!(
                    "Insert new {} data for note {note_id} returned invalid id {id}",
                    self.kind
                );
                false
            }
            Err(error) => {
                tracing::error!("Insert new {} data for note {note_id} failed: {error}", self.kind);
                false
            }
        }
    }
}

/// Accumulated, not yet persisted changes of one note.
///
/// Holds the note's own attribute diff plus one content slot per kind.
/// Any change, whichever record it targets, stamps the note's record as
/// locally modified.
#[derive(Debug)]
pub struct NoteAggregate {
    diff: DirtyRecord,
    text: ContentSlot,
    call: ContentSlot,
}

impl Default for NoteAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteAggregate {
    pub const fn new() -> Self {
        Self {
            diff: DirtyRecord::new(),
            text: ContentSlot::new(ContentKind::Text),
            call: ContentSlot::new(ContentKind::Call),
        }
    }

    /// Create an empty note row in `folder_id` and return its id.
    ///
    /// `Ok(None)` means the store refused the insert. An id that is not
    /// positive is a broken store contract and fails with `InvalidRecordId`.
    pub fn allocate_note_id(store: &dyn RecordStore, folder_id: i64) -> Result<Option<RecordId>> {
        let now = now_millis();
        let fields = FieldMap::from([
            (note::CREATED_DATE, Value::from(now)),
            (note::MODIFIED_DATE, Value::from(now)),
            (note::TYPE, Value::from(NoteType::Note.code())),
            (note::LOCAL_MODIFIED, Value::from(1)),
            (note::PARENT_ID, Value::from(folder_id)),
        ]);

        match store.insert(Collection::Notes, &fields) {
            Ok(id) if id.is_persisted() => Ok(Some(id)),
            Ok(id) => Err(Error::InvalidRecordId(format!("Wrong note id: {id}"))),
            Err(error) => {
                tracing::error!("Create new note in folder {folder_id} failed: {error}");
                Ok(None)
            }
        }
    }

    /// Record a field change on `target`, stamped with the current time
    pub fn apply(&mut self, target: Target, field: &'static str, value: impl Into<Value>) {
        self.apply_at(target, field, value, now_millis());
    }

    /// Record a field change on `target`, stamped with `now`
    pub fn apply_at(&mut self, target: Target, field: &'static str, value: impl Into<Value>, now: i64) {
        match target {
            Target::Note => self.diff.put(field, value),
            Target::Content(kind) => self.slot_mut(kind).pending.put(field, value),
        }
        self.diff.stamp(now);
    }

    pub fn set_note_value(&mut self, field: &'static str, value: impl Into<Value>) {
        self.apply(Target::Note, field, value);
    }

    pub fn set_text_data(&mut self, field: &'static str, value: impl Into<Value>) {
        self.apply(Target::Content(ContentKind::Text), field, value);
    }

    pub fn set_call_data(&mut self, field: &'static str, value: impl Into<Value>) {
        self.apply(Target::Content(ContentKind::Call), field, value);
    }

    pub fn set_text_data_id(&mut self, id: RecordId) -> Result<()> {
        self.text.assign_id(id)
    }

    pub fn set_call_data_id(&mut self, id: RecordId) -> Result<()> {
        self.call.assign_id(id)
    }

    pub const fn text_data_id(&self) -> RecordId {
        self.text.id
    }

    pub const fn call_data_id(&self) -> RecordId {
        self.call.id
    }

    /// Whether anything is waiting to be flushed
    pub fn is_local_modified(&self) -> bool {
        self.diff.is_dirty() || self.text.pending.is_dirty() || self.call.pending.is_dirty()
    }

    /// Pending attribute changes of the note record
    pub const fn pending_note_fields(&self) -> &FieldMap {
        self.diff.fields()
    }

    pub const fn pending_content(&self, kind: ContentKind) -> &FieldMap {
        match kind {
            ContentKind::Text => self.text.pending.fields(),
            ContentKind::Call => self.call.pending.fields(),
        }
    }

    fn slot_mut(&mut self, kind: ContentKind) -> &mut ContentSlot {
        match kind {
            ContentKind::Text => &mut self.text,
            ContentKind::Call => &mut self.call,
        }
    }

    /// Persist pending changes for `note_id`.
    ///
    /// The note's attributes are written first on a best-effort basis. New
    /// content rows are inserted immediately; updates to existing ones go
    /// out as a single all-or-nothing batch. `Ok(false)` reports a failed
    /// content write; updates that did not reach the store stay pending.
    pub fn flush(&mut self, store: &dyn RecordStore, note_id: RecordId) -> Result<bool> {
        if !note_id.is_persisted() {
            return Err(Error::InvalidRecordId(format!("Wrong note id: {note_id}")));
        }
        if !self.is_local_modified() {
            return Ok(true);
        }

        best_effort_attribute_write(store, note_id, self.diff.fields());
        self.diff.clear();

        let mut batch = Vec::new();
        let mut queued = Vec::new();
        for slot in [&mut self.text, &mut self.call] {
            let was_queued = slot.pending.is_dirty() && slot.id.is_persisted();
            if !slot.push(store, note_id, &mut batch) {
                return Ok(false);
            }
            if was_queued {
                queued.push(slot.kind);
            }
        }

        if batch.is_empty() {
            return Ok(true);
        }

        match store.batch_apply(&batch) {
            Ok(results) if !results.is_empty() => {
                for kind in queued {
                    self.slot_mut(kind).pending.clear();
                }
                Ok(true)
            }
            Ok(_) => {
                tracing::error!("Content batch for note {note_id} returned no results");
                Ok(false)
            }
            Err(error) => {
                tracing::error!("Content batch for note {note_id} failed: {error}");
                Ok(false)
            }
        }
    }
}

/// Write the note's attribute diff, logging instead of failing.
///
/// Zero affected rows or a store error leave the flush going; the content
/// writes that follow still decide the result.
fn best_effort_attribute_write(store: &dyn RecordStore, note_id: RecordId, fields: &FieldMap) {
    if fields.is_empty() {
        return;
    }
    match store.update(Collection::Notes, note_id, fields) {
        Ok(0) => tracing::error!("Update note {note_id} error, should not happen"),
        Ok(_) => {}
        Err(error) => tracing::error!("Update note {note_id} failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingStore, StoreCall};
    use pretty_assertions::assert_eq;

    const NOTE: RecordId = RecordId::new(7);

    fn store_with_note() -> RecordingStore {
        let store = RecordingStore::new();
        store.seed(
            Collection::Notes,
            NOTE.get(),
            FieldMap::from([(note::PARENT_ID, Value::from(0))]),
        );
        store
    }

    #[test]
    fn test_any_change_stamps_note_record() {
        let mut aggregate = NoteAggregate::new();
        aggregate.apply_at(Target::Content(ContentKind::Text), data::CONTENT, "hi", 500);

        assert!(aggregate.is_local_modified());
        let fields = aggregate.pending_note_fields();
        assert_eq!(fields.get(note::LOCAL_MODIFIED), Some(&Value::from(1)));
        assert_eq!(fields.get(note::MODIFIED_DATE), Some(&Value::from(500)));
        assert_eq!(fields.get(data::CONTENT), None);
    }

    #[test]
    fn test_content_id_must_be_positive() {
        let mut aggregate = NoteAggregate::new();
        assert!(matches!(
            aggregate.set_text_data_id(RecordId::NEW),
            Err(Error::InvalidRecordId(_))
        ));
        assert!(matches!(
            aggregate.set_call_data_id(RecordId::new(-4)),
            Err(Error::InvalidRecordId(_))
        ));
    }

    #[test]
    fn test_content_id_not_reassigned() {
        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data_id(RecordId::new(3)).unwrap();
        aggregate.set_text_data_id(RecordId::new(3)).unwrap();
        assert!(aggregate.set_text_data_id(RecordId::new(4)).is_err());
        assert_eq!(aggregate.text_data_id(), RecordId::new(3));
    }

    #[test]
    fn test_flush_rejects_unpersisted_note() {
        let store = RecordingStore::new();
        let mut aggregate = NoteAggregate::new();
        aggregate.set_note_value(note::BG_COLOR_ID, 1);
        assert!(matches!(
            aggregate.flush(&store, RecordId::NEW),
            Err(Error::InvalidRecordId(_))
        ));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_flush_clean_is_noop() {
        let store = store_with_note();
        let mut aggregate = NoteAggregate::new();
        assert!(aggregate.flush(&store, NOTE).unwrap());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_flush_inserts_new_text_content() {
        let store = store_with_note();
        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data(data::CONTENT, "hello");

        assert!(aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.is_local_modified());
        assert!(aggregate.text_data_id().is_persisted());

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert!(matches!(&writes[0], StoreCall::Update(Collection::Notes, id, _) if *id == NOTE));
        let StoreCall::Insert(Collection::Data, fields) = &writes[1] else {
            panic!("expected data insert, got {:?}", writes[1]);
        };
        assert_eq!(fields.get(data::CONTENT), Some(&Value::from("hello")));
        assert_eq!(fields.get(data::NOTE_ID), Some(&Value::from(NOTE)));
        assert_eq!(
            fields.get(data::MIME_TYPE),
            Some(&Value::from(ContentKind::Text.mime_type()))
        );
    }

    #[test]
    fn test_flush_batches_existing_content_updates() {
        let store = store_with_note();
        store.seed(Collection::Data, 11, FieldMap::new());
        store.seed(Collection::Data, 12, FieldMap::new());

        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data_id(RecordId::new(11)).unwrap();
        aggregate.set_call_data_id(RecordId::new(12)).unwrap();
        aggregate.set_text_data(data::CONTENT, "updated");
        aggregate.set_call_data(data::PHONE_NUMBER, "555");

        assert!(aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.is_local_modified());

        let batches: Vec<_> = store
            .writes()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Batch(ops) => Some(ops),
                _ => None,
            })
            .collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert!(batches[0]
            .iter()
            .all(|op| op.collection() == Collection::Data));
    }

    #[test]
    fn test_insert_failure_returns_false() {
        let store = store_with_note();
        store.fail_inserts_into(Some(Collection::Data));

        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data(data::CONTENT, "x");
        assert!(!aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.text_data_id().is_persisted());

        let note_updates = store
            .writes()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Update(Collection::Notes, id, _) if *id == NOTE))
            .count();
        assert_eq!(note_updates, 1);
        assert!(!store
            .writes()
            .iter()
            .any(|call| matches!(call, StoreCall::Batch(_))));
    }

    #[test]
    fn test_insert_with_invalid_id_returns_false() {
        let store = store_with_note();
        store.return_insert_id(Some(RecordId::NEW));

        let mut aggregate = NoteAggregate::new();
        aggregate.set_call_data(data::CALL_DATE, 1);
        assert!(!aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.call_data_id().is_persisted());
    }

    #[test]
    fn test_text_insert_failure_skips_remaining_writes() {
        let store = store_with_note();
        store.seed(Collection::Data, 12, FieldMap::new());
        store.fail_inserts_into(Some(Collection::Data));

        let mut aggregate = NoteAggregate::new();
        aggregate.set_call_data_id(RecordId::new(12)).unwrap();
        aggregate.set_text_data(data::CONTENT, "x");
        aggregate.set_call_data(data::PHONE_NUMBER, "1");

        assert!(!aggregate.flush(&store, NOTE).unwrap());
        assert!(!store
            .writes()
            .iter()
            .any(|call| matches!(call, StoreCall::Batch(_))));
        assert!(!aggregate.pending_content(ContentKind::Call).is_empty());
    }

    #[test]
    fn test_batch_failure_keeps_updates_pending() {
        let store = store_with_note();
        store.seed(Collection::Data, 11, FieldMap::new());
        store.fail_batches(true);

        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data_id(RecordId::new(11)).unwrap();
        aggregate.set_text_data(data::CONTENT, "retry me");

        assert!(!aggregate.flush(&store, NOTE).unwrap());
        assert!(aggregate.is_local_modified());
        assert!(aggregate.pending_note_fields().is_empty());

        store.fail_batches(false);
        assert!(aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.is_local_modified());
        let row = store.row(Collection::Data, RecordId::new(11)).unwrap();
        assert_eq!(row.get(data::CONTENT), Some(&Value::from("retry me")));
    }

    #[test]
    fn test_empty_batch_result_returns_false() {
        let store = store_with_note();
        store.return_empty_batch_result(true);

        let mut aggregate = NoteAggregate::new();
        aggregate.set_text_data_id(RecordId::new(11)).unwrap();
        aggregate.set_text_data(data::CONTENT, "x");
        assert!(!aggregate.flush(&store, NOTE).unwrap());
    }

    #[test]
    fn test_attribute_write_failure_does_not_fail_flush() {
        let store = RecordingStore::new();
        store.fail_updates(true);

        let mut aggregate = NoteAggregate::new();
        aggregate.set_note_value(note::BG_COLOR_ID, 2);
        assert!(aggregate.flush(&store, NOTE).unwrap());
        assert!(!aggregate.is_local_modified());

        // missing row: zero affected is logged, not fatal
        store.fail_updates(false);
        aggregate.set_note_value(note::BG_COLOR_ID, 3);
        assert!(aggregate.flush(&store, RecordId::new(99)).unwrap());
    }

    #[test]
    fn test_allocate_note_id() {
        let store = RecordingStore::new();
        let id = NoteAggregate::allocate_note_id(&store, 5).unwrap().unwrap();
        let row = store.row(Collection::Notes, id).unwrap();
        assert_eq!(row.get(note::PARENT_ID), Some(&Value::from(5)));
        assert_eq!(row.get(note::TYPE), Some(&Value::from(NoteType::Note.code())));
        assert_eq!(row.get(note::LOCAL_MODIFIED), Some(&Value::from(1)));
        assert_eq!(row.get(note::CREATED_DATE), row.get(note::MODIFIED_DATE));
    }

    #[test]
    fn test_allocate_note_id_store_error_is_none() {
        let store = RecordingStore::new();
        store.fail_inserts_into(Some(Collection::Notes));
        assert_eq!(NoteAggregate::allocate_note_id(&store, 0).unwrap(), None);
    }

    #[test]
    fn test_allocate_note_id_invalid_id_fails_fast() {
        let store = RecordingStore::new();
        store.return_insert_id(Some(RecordId::new(-1)));
        assert!(matches!(
            NoteAggregate::allocate_note_id(&store, 0),
            Err(Error::InvalidRecordId(_))
        ));
    }
}
