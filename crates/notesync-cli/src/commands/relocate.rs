use std::path::Path;

use notesync_core::models::{folders, NoteType};
use notesync_core::queries::{batch_move_to_folder, visible_in_note_database};
use notesync_core::RecordId;

use crate::commands::common::{folder_label, open_store, parse_note_ids};
use crate::error::CliError;

pub fn run_move(ids: &[String], to: i64, db_path: &Path) -> Result<(), CliError> {
    let note_ids = parse_note_ids(ids)?;
    let (_db, store) = open_store(db_path)?;

    let is_target = matches!(to, folders::ROOT | folders::TRASH)
        || visible_in_note_database(store.as_ref(), RecordId::new(to), NoteType::Folder)?;
    if !is_target {
        return Err(CliError::FolderNotFound(to));
    }

    if !batch_move_to_folder(store.as_ref(), &note_ids, to) {
        return Err(CliError::BatchFailed("move notes"));
    }
    println!("Moved {} note(s) to {}", note_ids.len(), folder_label(to));
    Ok(())
}
