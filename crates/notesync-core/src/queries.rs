//! Note and folder lookups and bulk operations over a record store

use std::collections::HashSet;

use crate::db::{Predicate, RecordStore, Row, StoreOp};
use crate::error::{Error, Result};
use crate::models::{
    data, folders, note, Collection, ContentKind, FieldMap, NoteSummary, NoteType, RecordId,
    Value, WidgetBinding, WidgetType,
};
use crate::util::normalize_phone_number;

const SUMMARY_PROJECTION: &[&str] = &[
    note::ID,
    note::ALERTED_DATE,
    note::BG_COLOR_ID,
    note::CREATED_DATE,
    note::HAS_ATTACHMENT,
    note::MODIFIED_DATE,
    note::NOTES_COUNT,
    note::PARENT_ID,
    note::SNIPPET,
    note::TYPE,
    note::WIDGET_ID,
    note::WIDGET_TYPE,
];

/// Apply `ops` as one batch, reporting failure as `false`
fn apply_batch(store: &dyn RecordStore, ops: &[StoreOp], action: &str) -> bool {
    if ops.is_empty() {
        return true;
    }
    match store.batch_apply(ops) {
        Ok(results) if !results.is_empty() => true,
        Ok(_) => {
            tracing::debug!("{action} returned no results");
            false
        }
        Err(error) => {
            tracing::error!("{action} failed: {error}");
            false
        }
    }
}

/// Delete notes in one batch. The root folder is never deleted.
pub fn batch_delete_notes(store: &dyn RecordStore, ids: &[RecordId]) -> bool {
    if ids.is_empty() {
        tracing::debug!("No note ids to delete");
        return true;
    }

    let ops: Vec<_> = ids
        .iter()
        .filter(|id| {
            let is_root = id.get() == folders::ROOT;
            if is_root {
                tracing::error!("Don't delete system folder root");
            }
            !is_root
        })
        .map(|id| StoreOp::Delete {
            collection: Collection::Notes,
            id: *id,
        })
        .collect();

    apply_batch(store, &ops, "Delete notes")
}

/// Move one note, remembering where it came from
pub fn move_note_to_folder(
    store: &dyn RecordStore,
    id: RecordId,
    src_folder_id: i64,
    dest_folder_id: i64,
) -> Result<()> {
    let fields = FieldMap::from([
        (note::PARENT_ID, Value::from(dest_folder_id)),
        (note::ORIGIN_PARENT_ID, Value::from(src_folder_id)),
        (note::LOCAL_MODIFIED, Value::from(1)),
    ]);
    if store.update(Collection::Notes, id, &fields)? == 0 {
        return Err(Error::NotFound(format!("Note {id} not found")));
    }
    Ok(())
}

/// Move several notes into `folder_id` in one batch
pub fn batch_move_to_folder(store: &dyn RecordStore, ids: &[RecordId], folder_id: i64) -> bool {
    let ops: Vec<_> = ids
        .iter()
        .map(|id| StoreOp::Update {
            collection: Collection::Notes,
            id: *id,
            fields: FieldMap::from([
                (note::PARENT_ID, Value::from(folder_id)),
                (note::LOCAL_MODIFIED, Value::from(1)),
            ]),
        })
        .collect();

    apply_batch(store, &ops, "Move notes")
}

/// Number of user folders outside the trash
pub fn user_folder_count(store: &dyn RecordStore) -> Result<usize> {
    let rows = store.query(
        Collection::Notes,
        &[note::ID],
        &Predicate::eq(note::TYPE, NoteType::Folder.code())
            .and(Predicate::ne(note::PARENT_ID, folders::TRASH)),
    )?;
    Ok(rows.len())
}

/// Whether a note of `note_type` exists outside the trash
pub fn visible_in_note_database(
    store: &dyn RecordStore,
    note_id: RecordId,
    note_type: NoteType,
) -> Result<bool> {
    let rows = store.query(
        Collection::Notes,
        &[note::ID],
        &Predicate::id(note_id)
            .and(Predicate::eq(note::TYPE, note_type.code()))
            .and(Predicate::ne(note::PARENT_ID, folders::TRASH)),
    )?;
    Ok(!rows.is_empty())
}

pub fn exists_in_note_database(store: &dyn RecordStore, note_id: RecordId) -> Result<bool> {
    let rows = store.query(Collection::Notes, &[note::ID], &Predicate::id(note_id))?;
    Ok(!rows.is_empty())
}

pub fn exists_in_data_database(store: &dyn RecordStore, data_id: RecordId) -> Result<bool> {
    let rows = store.query(Collection::Data, &[data::ID], &Predicate::id(data_id))?;
    Ok(!rows.is_empty())
}

/// Whether a visible folder already uses `name`
pub fn check_visible_folder_name(store: &dyn RecordStore, name: &str) -> Result<bool> {
    let rows = store.query(
        Collection::Notes,
        &[note::ID],
        &Predicate::eq(note::TYPE, NoteType::Folder.code())
            .and(Predicate::ne(note::PARENT_ID, folders::TRASH))
            .and(Predicate::eq(note::SNIPPET, name)),
    )?;
    Ok(!rows.is_empty())
}

/// Widgets attached to notes inside `folder_id`
pub fn folder_note_widgets(store: &dyn RecordStore, folder_id: i64) -> Result<HashSet<WidgetBinding>> {
    let rows = store.query(
        Collection::Notes,
        &[note::WIDGET_ID, note::WIDGET_TYPE],
        &Predicate::eq(note::PARENT_ID, folder_id),
    )?;
    Ok(rows
        .iter()
        .map(|row| WidgetBinding {
            widget_id: row.get_i64(note::WIDGET_ID),
            widget_type: WidgetType::from_code(row.get_i64(note::WIDGET_TYPE)),
        })
        .collect())
}

/// Phone number of the call record attached to `note_id`
pub fn call_number_by_note_id(store: &dyn RecordStore, note_id: RecordId) -> Result<Option<String>> {
    let rows = store.query(
        Collection::Data,
        &[data::PHONE_NUMBER],
        &Predicate::eq(data::NOTE_ID, note_id)
            .and(Predicate::eq(data::MIME_TYPE, ContentKind::Call.mime_type())),
    )?;
    Ok(rows.first().map(|row| row.get_string(data::PHONE_NUMBER)))
}

/// Note written for a call, matching phone numbers regardless of formatting
pub fn note_id_by_phone_number_and_call_date(
    store: &dyn RecordStore,
    phone_number: &str,
    call_date: i64,
) -> Result<Option<RecordId>> {
    let wanted = normalize_phone_number(phone_number);
    let rows = store.query(
        Collection::Data,
        &[data::NOTE_ID, data::PHONE_NUMBER],
        &Predicate::eq(data::CALL_DATE, call_date)
            .and(Predicate::eq(data::MIME_TYPE, ContentKind::Call.mime_type())),
    )?;
    Ok(rows
        .iter()
        .find(|row| normalize_phone_number(&row.get_string(data::PHONE_NUMBER)) == wanted)
        .map(|row| row.get_id(data::NOTE_ID)))
}

pub fn snippet_by_id(store: &dyn RecordStore, note_id: RecordId) -> Result<String> {
    let rows = store.query(Collection::Notes, &[note::SNIPPET], &Predicate::id(note_id))?;
    rows.first()
        .map(|row| row.get_string(note::SNIPPET))
        .ok_or_else(|| Error::NotFound(format!("Note is not found with id: {note_id}")))
}

/// Trimmed snippet cut at its first line break
pub fn formatted_snippet(snippet: &str) -> &str {
    let snippet = snippet.trim();
    snippet.find('\n').map_or(snippet, |index| &snippet[..index])
}

fn summary_from_row(row: &Row) -> NoteSummary {
    NoteSummary {
        id: row.get_id(note::ID),
        alert_date: row.get_i64(note::ALERTED_DATE),
        bg_color_id: row.get_i64(note::BG_COLOR_ID),
        created_date: row.get_i64(note::CREATED_DATE),
        has_attachment: row.get_i64(note::HAS_ATTACHMENT) > 0,
        modified_date: row.get_i64(note::MODIFIED_DATE),
        notes_count: row.get_i64(note::NOTES_COUNT),
        parent_id: row.get_i64(note::PARENT_ID),
        snippet: NoteSummary::clean_snippet(&row.get_string(note::SNIPPET)),
        note_type: NoteType::from_code(row.get_i64(note::TYPE)).unwrap_or(NoteType::Note),
        widget: WidgetBinding {
            widget_id: row.get_i64(note::WIDGET_ID),
            widget_type: WidgetType::from_code(row.get_i64(note::WIDGET_TYPE)),
        },
        phone_number: String::new(),
    }
}

/// Rows shown when browsing `folder_id`, folders first, newest first.
///
/// System folders are hidden except the call-record folder once it holds
/// notes.
pub fn list_folder(store: &dyn RecordStore, folder_id: i64) -> Result<Vec<NoteSummary>> {
    let rows = store.query(
        Collection::Notes,
        SUMMARY_PROJECTION,
        &Predicate::eq(note::PARENT_ID, folder_id),
    )?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut summary = summary_from_row(row);
        if summary.id.get() == folder_id {
            continue;
        }
        if summary.note_type == NoteType::System
            && !(summary.id.get() == folders::CALL_RECORD && summary.notes_count > 0)
        {
            tracing::debug!("Skipping system folder {}", summary.id);
            continue;
        }
        if summary.parent_id == folders::CALL_RECORD {
            summary.phone_number = call_number_by_note_id(store, summary.id)?.unwrap_or_default();
        }
        summaries.push(summary);
    }

    summaries.sort_by(|a, b| {
        let a_folder = a.note_type != NoteType::Note;
        let b_folder = b.note_type != NoteType::Note;
        b_folder
            .cmp(&a_folder)
            .then(b.modified_date.cmp(&a.modified_date))
    });
    Ok(summaries)
}
