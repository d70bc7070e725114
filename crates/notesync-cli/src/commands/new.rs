use std::path::Path;
use std::sync::Arc;

use notesync_core::models::{folders, NoteType, WidgetType, INVALID_WIDGET_ID};
use notesync_core::queries::visible_in_note_database;
use notesync_core::{NotesConfig, RecordId, WorkingNote};

use crate::commands::common::{open_store, resolve_note_content, save_or_fail, ConsoleListener};
use crate::error::CliError;

pub fn run_new(
    content_parts: &[String],
    folder: Option<i64>,
    bg: Option<i64>,
    config: &NotesConfig,
    db_path: &Path,
) -> Result<RecordId, CliError> {
    let content = resolve_note_content(content_parts)?;
    let (_db, store) = open_store(db_path)?;

    let folder_id = folder.unwrap_or(folders::ROOT);
    if folder_id != folders::ROOT
        && !visible_in_note_database(store.as_ref(), RecordId::new(folder_id), NoteType::Folder)?
    {
        return Err(CliError::FolderNotFound(folder_id));
    }

    let mut note = WorkingNote::create_empty_note(
        Arc::clone(&store),
        folder_id,
        INVALID_WIDGET_ID,
        WidgetType::Invalid,
        bg.unwrap_or(config.default_bg_color),
    );
    note.set_on_setting_status_changed_listener(Arc::new(ConsoleListener));
    note.set_working_text(&content);

    let id = save_or_fail(&mut note)?;
    println!("{id}");
    Ok(id)
}
