use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use notesync_core::db::{Database, RecordStore};
use notesync_core::models::{folders, NoteMode, NoteType};
use notesync_core::{NoteSettingChanged, NoteSummary, RecordId, WorkingNote};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub kind: NoteType,
    pub preview: String,
    pub parent_id: i64,
    pub notes_count: i64,
    pub modified_date: i64,
    pub relative_time: String,
    pub alert_date: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct NoteDetails {
    pub id: i64,
    pub folder_id: i64,
    pub content: String,
    pub mode: NoteMode,
    pub bg_color_id: i64,
    pub created_date: i64,
    pub modified_date: i64,
    pub alert_date: Option<i64>,
    pub phone_number: Option<String>,
    pub call_date: Option<i64>,
}

/// Open the database and hand back a shared record store over it
pub fn open_store(db_path: &Path) -> Result<(Database, Arc<dyn RecordStore>), CliError> {
    let db = Database::open(db_path)?;
    let store: Arc<dyn RecordStore> = Arc::new(db.record_store());
    Ok((db, store))
}

pub fn parse_note_id(raw: &str) -> Result<RecordId, CliError> {
    let id = raw
        .parse::<RecordId>()
        .map_err(|_| CliError::InvalidNoteId(raw.trim().to_string()))?;
    if id.is_persisted() {
        Ok(id)
    } else {
        Err(CliError::InvalidNoteId(raw.trim().to_string()))
    }
}

pub fn parse_note_ids(raw: &[String]) -> Result<Vec<RecordId>, CliError> {
    raw.iter().map(|id| parse_note_id(id)).collect()
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Save `note`, turning a recoverable store failure into an error.
/// An unchanged note is left alone.
pub fn save_or_fail(note: &mut WorkingNote) -> Result<RecordId, CliError> {
    if !note.is_worth_saving() {
        if note.exists_in_database() {
            return Ok(note.note_id());
        }
        return Err(CliError::EmptyContent);
    }
    if note.save_note()? {
        Ok(note.note_id())
    } else {
        Err(CliError::SaveFailed(note.note_id().to_string()))
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(|| timestamp_ms.to_string(), |time| time.to_rfc3339())
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let diff = now_ms.saturating_sub(timestamp_ms);
    if diff < MINUTE {
        "just now".to_string()
    } else if diff < HOUR {
        format!("{}m ago", diff / MINUTE)
    } else if diff < DAY {
        format!("{}h ago", diff / HOUR)
    } else {
        format!("{}d ago", diff / DAY)
    }
}

pub fn folder_label(folder_id: i64) -> String {
    match folder_id {
        folders::ROOT => "root".to_string(),
        folders::CALL_RECORD => "call records".to_string(),
        folders::TRASH => "trash".to_string(),
        folders::TEMPORARY => "temporary".to_string(),
        id => format!("folder {id}"),
    }
}

pub fn note_to_list_item(summary: &NoteSummary, now_ms: i64) -> NoteListItem {
    NoteListItem {
        id: summary.id.get(),
        kind: summary.note_type,
        preview: list_preview(summary, 40),
        parent_id: summary.parent_id,
        notes_count: summary.notes_count,
        modified_date: summary.modified_date,
        relative_time: format_relative_time(summary.modified_date, now_ms),
        alert_date: summary.has_alert().then_some(summary.alert_date),
        phone_number: summary.phone_number.clone(),
    }
}

pub fn format_note_lines(summaries: &[NoteSummary], now_ms: i64) -> Vec<String> {
    summaries
        .iter()
        .map(|summary| {
            let id = summary.id.to_string();
            let preview = list_preview(summary, 40);
            let relative_time = format_relative_time(summary.modified_date, now_ms);
            let alert = if summary.has_alert() { "⏰" } else { "" };
            format!("{id:>6}  {preview:<40}  {relative_time:<10} {alert}")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn list_preview(summary: &NoteSummary, max_chars: usize) -> String {
    match summary.note_type {
        NoteType::Note if summary.is_call_record() => {
            format!("[{}] {}", summary.phone_number, summary.title_preview(max_chars))
        }
        NoteType::Note => summary.title_preview(max_chars),
        NoteType::Folder | NoteType::System => format!(
            "{}/ ({})",
            if summary.id.get() == folders::CALL_RECORD {
                folder_label(folders::CALL_RECORD)
            } else {
                summary.title_preview(max_chars)
            },
            summary.notes_count
        ),
    }
}

pub fn note_details(note: &WorkingNote) -> NoteDetails {
    NoteDetails {
        id: note.note_id().get(),
        folder_id: note.folder_id(),
        content: note.content().to_string(),
        mode: note.check_list_mode(),
        bg_color_id: note.bg_color_id(),
        created_date: note.created_date(),
        modified_date: note.modified_date(),
        alert_date: note.has_clock_alert().then_some(note.alert_date()),
        phone_number: note.call_record().map(|call| call.phone_number.clone()),
        call_date: note.call_record().map(|call| call.call_date),
    }
}

/// Reports note setting changes on stderr
pub struct ConsoleListener;

impl NoteSettingChanged for ConsoleListener {
    fn on_background_color_changed(&self) {
        eprintln!("Background color updated");
    }

    fn on_clock_alert_changed(&self, date: i64, set: bool) {
        if set {
            eprintln!("Alert set for {}", format_timestamp(date));
        } else {
            eprintln!("Alert cleared");
        }
    }

    fn on_widget_changed(&self) {
        tracing::debug!("Widget refresh requested");
    }

    fn on_check_list_mode_changed(&self, old_mode: NoteMode, new_mode: NoteMode) {
        tracing::debug!("Check-list mode {old_mode:?} -> {new_mode:?}");
    }
}
