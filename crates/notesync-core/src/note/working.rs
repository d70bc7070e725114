//! Editing session for a single note

use std::fmt;
use std::sync::Arc;

use crate::db::{Predicate, RecordStore};
use crate::error::{Error, Result};
use crate::models::{
    data, folders, note, CallRecord, Collection, ContentKind, NoteMode, RecordId, Value,
    WidgetBinding, WidgetType, INVALID_WIDGET_ID,
};
use crate::note::{NoteAggregate, NoteSettingChanged, Target};
use crate::util::now_millis;

const NOTE_PROJECTION: &[&str] = &[
    note::ID,
    note::PARENT_ID,
    note::ALERTED_DATE,
    note::BG_COLOR_ID,
    note::WIDGET_ID,
    note::WIDGET_TYPE,
    note::MODIFIED_DATE,
    note::CREATED_DATE,
];

const DATA_PROJECTION: &[&str] = &[
    data::ID,
    data::CONTENT,
    data::MIME_TYPE,
    data::DATA1,
    data::DATA2,
    data::DATA3,
    data::DATA4,
];

/// Mutable in-memory copy of one note.
///
/// Edits update the local fields, accumulate a diff in the owned
/// [`NoteAggregate`] and notify the registered listener. Nothing reaches the
/// store until [`WorkingNote::save_note`].
pub struct WorkingNote {
    store: Arc<dyn RecordStore>,
    note: NoteAggregate,
    note_id: RecordId,
    content: String,
    mode: NoteMode,
    alert_date: i64,
    created_date: i64,
    modified_date: i64,
    bg_color_id: i64,
    widget_id: i64,
    widget_type: WidgetType,
    folder_id: i64,
    call_record: Option<CallRecord>,
    is_deleted: bool,
    listener: Option<Arc<dyn NoteSettingChanged>>,
}

impl fmt::Debug for WorkingNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingNote")
            .field("note_id", &self.note_id)
            .field("folder_id", &self.folder_id)
            .field("mode", &self.mode)
            .field("alert_date", &self.alert_date)
            .field("bg_color_id", &self.bg_color_id)
            .field("widget_id", &self.widget_id)
            .field("widget_type", &self.widget_type)
            .field("is_deleted", &self.is_deleted)
            .field("note", &self.note)
            .finish_non_exhaustive()
    }
}

impl WorkingNote {
    fn fresh(store: Arc<dyn RecordStore>, folder_id: i64) -> Self {
        let now = now_millis();
        Self {
            store,
            note: NoteAggregate::new(),
            note_id: RecordId::NEW,
            content: String::new(),
            mode: NoteMode::Normal,
            alert_date: 0,
            created_date: now,
            modified_date: now,
            bg_color_id: 0,
            widget_id: INVALID_WIDGET_ID,
            widget_type: WidgetType::Invalid,
            folder_id,
            call_record: None,
            is_deleted: false,
            listener: None,
        }
    }

    /// Start a new, unsaved note in `folder_id`
    pub fn create_empty_note(
        store: Arc<dyn RecordStore>,
        folder_id: i64,
        widget_id: i64,
        widget_type: WidgetType,
        default_bg_color_id: i64,
    ) -> Self {
        let mut working = Self::fresh(store, folder_id);
        working.set_bg_color_id(default_bg_color_id);
        working.set_widget_id(widget_id);
        working.set_widget_type(widget_type);
        working
    }

    /// Read an existing note and its content rows
    pub fn load(store: Arc<dyn RecordStore>, note_id: RecordId) -> Result<Self> {
        if !note_id.is_persisted() {
            return Err(Error::InvalidRecordId(format!("Wrong note id: {note_id}")));
        }

        let rows = store.query(Collection::Notes, NOTE_PROJECTION, &Predicate::id(note_id))?;
        let Some(row) = rows.first() else {
            tracing::error!("No note with id: {note_id}");
            return Err(Error::NotFound(format!("Unable to find note with id {note_id}")));
        };

        let mut working = Self::fresh(Arc::clone(&store), row.get_i64(note::PARENT_ID));
        working.note_id = note_id;
        working.alert_date = row.get_i64(note::ALERTED_DATE);
        working.bg_color_id = row.get_i64(note::BG_COLOR_ID);
        working.widget_id = row.get_i64(note::WIDGET_ID);
        working.widget_type = WidgetType::from_code(row.get_i64(note::WIDGET_TYPE));
        working.modified_date = row.get_i64(note::MODIFIED_DATE);
        working.created_date = row.get_i64(note::CREATED_DATE);

        let content_rows = store.query(
            Collection::Data,
            DATA_PROJECTION,
            &Predicate::eq(data::NOTE_ID, note_id),
        )?;
        if content_rows.is_empty() {
            tracing::error!("No data with id: {note_id}");
            return Err(Error::NotFound(format!(
                "Unable to find note's data with id {note_id}"
            )));
        }

        // the newest row of each kind wins
        for row in content_rows.iter().rev() {
            let mime_type = row.get_string(data::MIME_TYPE);
            let kind = ContentKind::from_mime_type(&mime_type);
            let already_loaded = match kind {
                Some(ContentKind::Text) => working.note.text_data_id().is_persisted(),
                Some(ContentKind::Call) => working.note.call_data_id().is_persisted(),
                None => false,
            };
            if already_loaded {
                tracing::warn!(
                    "Skipping duplicate {mime_type} row {} of note {note_id}",
                    row.get_id(data::ID)
                );
                continue;
            }
            match kind {
                Some(ContentKind::Text) => {
                    working.content = row.get_string(data::CONTENT);
                    working.mode = NoteMode::from_code(row.get_i64(data::TEXT_MODE));
                    working.note.set_text_data_id(row.get_id(data::ID))?;
                }
                Some(ContentKind::Call) => {
                    working.note.set_call_data_id(row.get_id(data::ID))?;
                    working.call_record = Some(CallRecord {
                        phone_number: row.get_string(data::PHONE_NUMBER),
                        call_date: row.get_i64(data::CALL_DATE),
                    });
                }
                None => tracing::debug!("Wrong note type with type: {mime_type}"),
            }
        }

        Ok(working)
    }

    /// Record one change in the aggregate and mirror its timestamp
    fn record(&mut self, target: Target, field: &'static str, value: impl Into<Value>) {
        let now = now_millis();
        self.note.apply_at(target, field, value, now);
        self.modified_date = now;
    }

    /// Whether saving would write anything meaningful
    pub fn is_worth_saving(&self) -> bool {
        if self.is_deleted {
            return false;
        }
        if !self.exists_in_database() {
            return !self.content.is_empty();
        }
        self.note.is_local_modified()
    }

    /// Persist pending changes, allocating the note row first if needed.
    ///
    /// `Ok(false)` covers both "nothing worth saving" and a failed write.
    /// The widget listener fires only after a successful flush.
    pub fn save_note(&mut self) -> Result<bool> {
        if !self.is_worth_saving() {
            return Ok(false);
        }

        if !self.exists_in_database() {
            let Some(note_id) = NoteAggregate::allocate_note_id(self.store.as_ref(), self.folder_id)?
            else {
                tracing::error!("Create new note fail with folder {}", self.folder_id);
                return Ok(false);
            };
            self.note_id = note_id;
        }

        if !self.note.flush(self.store.as_ref(), self.note_id)? {
            return Ok(false);
        }

        if self.widget().is_bound() {
            if let Some(listener) = &self.listener {
                listener.on_widget_changed();
            }
        }
        Ok(true)
    }

    pub const fn exists_in_database(&self) -> bool {
        self.note_id.is_persisted()
    }

    pub fn set_on_setting_status_changed_listener(&mut self, listener: Arc<dyn NoteSettingChanged>) {
        self.listener = Some(listener);
    }

    pub fn set_alert_date(&mut self, date: i64, set: bool) {
        if date == self.alert_date {
            return;
        }
        self.alert_date = date;
        self.record(Target::Note, note::ALERTED_DATE, date);
        if let Some(listener) = &self.listener {
            listener.on_clock_alert_changed(date, set);
        }
    }

    /// Flag the note as deleted; a deleted note is never worth saving
    pub fn mark_deleted(&mut self, mark: bool) {
        self.is_deleted = mark;
        if self.widget().is_bound() {
            if let Some(listener) = &self.listener {
                listener.on_widget_changed();
            }
        }
    }

    pub fn set_bg_color_id(&mut self, id: i64) {
        if id == self.bg_color_id {
            return;
        }
        self.bg_color_id = id;
        self.record(Target::Note, note::BG_COLOR_ID, id);
        if let Some(listener) = &self.listener {
            listener.on_background_color_changed();
        }
    }

    pub fn set_check_list_mode(&mut self, mode: NoteMode) {
        if mode == self.mode {
            return;
        }
        let old_mode = self.mode;
        self.mode = mode;
        self.record(Target::Content(ContentKind::Text), data::TEXT_MODE, mode.code());
        if let Some(listener) = &self.listener {
            listener.on_check_list_mode_changed(old_mode, mode);
        }
    }

    pub fn set_widget_type(&mut self, widget_type: WidgetType) {
        if widget_type == self.widget_type {
            return;
        }
        self.widget_type = widget_type;
        self.record(Target::Note, note::WIDGET_TYPE, widget_type.code());
    }

    pub fn set_widget_id(&mut self, widget_id: i64) {
        if widget_id == self.widget_id {
            return;
        }
        self.widget_id = widget_id;
        self.record(Target::Note, note::WIDGET_ID, widget_id);
    }

    pub fn set_working_text(&mut self, text: &str) {
        if text == self.content {
            return;
        }
        text.clone_into(&mut self.content);
        self.record(Target::Content(ContentKind::Text), data::CONTENT, text);
    }

    /// Attach call details and move the note into the call-record folder
    pub fn convert_to_call_note(&mut self, phone_number: &str, call_date: i64) {
        let call = CallRecord {
            phone_number: phone_number.to_string(),
            call_date,
        };
        if self.folder_id == folders::CALL_RECORD && self.call_record.as_ref() == Some(&call) {
            return;
        }
        let call_target = Target::Content(ContentKind::Call);
        self.record(call_target, data::CALL_DATE, call_date);
        self.record(call_target, data::PHONE_NUMBER, phone_number);
        self.record(Target::Note, note::PARENT_ID, folders::CALL_RECORD);
        self.folder_id = folders::CALL_RECORD;
        self.call_record = Some(call);
    }

    pub const fn has_clock_alert(&self) -> bool {
        self.alert_date > 0
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn alert_date(&self) -> i64 {
        self.alert_date
    }

    pub const fn created_date(&self) -> i64 {
        self.created_date
    }

    pub const fn modified_date(&self) -> i64 {
        self.modified_date
    }

    pub const fn bg_color_id(&self) -> i64 {
        self.bg_color_id
    }

    pub const fn check_list_mode(&self) -> NoteMode {
        self.mode
    }

    pub const fn note_id(&self) -> RecordId {
        self.note_id
    }

    pub const fn folder_id(&self) -> i64 {
        self.folder_id
    }

    pub const fn widget_id(&self) -> i64 {
        self.widget_id
    }

    pub const fn widget_type(&self) -> WidgetType {
        self.widget_type
    }

    pub const fn widget(&self) -> WidgetBinding {
        WidgetBinding {
            widget_id: self.widget_id,
            widget_type: self.widget_type,
        }
    }

    pub const fn call_record(&self) -> Option<&CallRecord> {
        self.call_record.as_ref()
    }

    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Pending changes not yet flushed
    pub const fn pending(&self) -> &NoteAggregate {
        &self.note
    }
}
