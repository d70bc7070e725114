use std::path::Path;

use notesync_core::models::folders;
use notesync_core::queries::list_folder;
use notesync_core::util::now_millis;

use crate::commands::common::{format_note_lines, note_to_list_item, open_store, NoteListItem};
use crate::error::CliError;

pub fn run_list(folder: Option<i64>, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let (_db, store) = open_store(db_path)?;
    let summaries = list_folder(store.as_ref(), folder.unwrap_or(folders::ROOT))?;
    let now_ms = now_millis();

    if as_json {
        let json_items = summaries
            .iter()
            .map(|summary| note_to_list_item(summary, now_ms))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&summaries, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}
