use std::path::Path;
use std::sync::Arc;

use notesync_core::models::NoteMode;
use notesync_core::WorkingNote;

use crate::cli::Toggle;
use crate::commands::common::{open_store, parse_note_id, save_or_fail, ConsoleListener};
use crate::error::CliError;

pub fn run_checklist(id: &str, state: Toggle, db_path: &Path) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let (_db, store) = open_store(db_path)?;

    let mut note = WorkingNote::load(store, note_id)?;
    note.set_on_setting_status_changed_listener(Arc::new(ConsoleListener));
    note.set_check_list_mode(match state {
        Toggle::On => NoteMode::CheckList,
        Toggle::Off => NoteMode::Normal,
    });

    save_or_fail(&mut note)?;
    println!("{note_id}");
    Ok(())
}
