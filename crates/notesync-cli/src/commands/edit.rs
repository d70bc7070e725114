use std::path::Path;
use std::sync::Arc;

use notesync_core::WorkingNote;

use crate::commands::common::{
    open_store, parse_note_id, resolve_note_content, save_or_fail, ConsoleListener,
};
use crate::error::CliError;

pub fn run_edit(id: &str, content_parts: &[String], db_path: &Path) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let content = resolve_note_content(content_parts)?;
    let (_db, store) = open_store(db_path)?;

    let mut note = WorkingNote::load(store, note_id)?;
    note.set_on_setting_status_changed_listener(Arc::new(ConsoleListener));
    if note.content() == content {
        println!("{note_id}");
        return Ok(());
    }

    note.set_working_text(&content);
    save_or_fail(&mut note)?;
    println!("{note_id}");
    Ok(())
}
