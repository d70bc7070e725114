use std::path::Path;

use notesync_core::models::folders;
use notesync_core::queries::{batch_delete_notes, batch_move_to_folder};
use notesync_core::NotesConfig;

use crate::commands::common::{open_store, parse_note_ids};
use crate::error::CliError;

/// Synced notes go to trash so the next pass can delete them remotely
pub fn run_delete(
    ids: &[String],
    purge: bool,
    config: &NotesConfig,
    db_path: &Path,
) -> Result<(), CliError> {
    let note_ids = parse_note_ids(ids)?;
    let (_db, store) = open_store(db_path)?;

    if purge || config.sync_account.is_none() {
        if !batch_delete_notes(store.as_ref(), &note_ids) {
            return Err(CliError::BatchFailed("delete notes"));
        }
        println!("Deleted {} note(s)", note_ids.len());
    } else {
        if !batch_move_to_folder(store.as_ref(), &note_ids, folders::TRASH) {
            return Err(CliError::BatchFailed("move notes to trash"));
        }
        println!("Moved {} note(s) to trash", note_ids.len());
    }
    Ok(())
}
