use std::path::Path;

use notesync_core::models::NoteMode;
use notesync_core::WorkingNote;

use crate::commands::common::{
    folder_label, format_timestamp, note_details, open_store, parse_note_id,
};
use crate::error::CliError;

pub fn run_show(id: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let (_db, store) = open_store(db_path)?;
    let note = WorkingNote::load(store, note_id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note_details(&note))?);
        return Ok(());
    }

    println!("id:       {}", note.note_id());
    println!("folder:   {}", folder_label(note.folder_id()));
    println!("modified: {}", format_timestamp(note.modified_date()));
    if note.has_clock_alert() {
        println!("alert:    {}", format_timestamp(note.alert_date()));
    }
    if note.check_list_mode() == NoteMode::CheckList {
        println!("mode:     check list");
    }
    if let Some(call) = note.call_record() {
        println!(
            "call:     {} at {}",
            call.phone_number,
            format_timestamp(call.call_date)
        );
    }
    println!();
    println!("{}", note.content());
    Ok(())
}
