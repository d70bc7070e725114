use std::path::Path;
use std::sync::Arc;

use notesync_core::WorkingNote;

use crate::commands::common::{open_store, parse_note_id, save_or_fail, ConsoleListener};
use crate::error::CliError;

pub fn run_alert(id: &str, at: Option<i64>, clear: bool, db_path: &Path) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let (_db, store) = open_store(db_path)?;

    let mut note = WorkingNote::load(store, note_id)?;
    note.set_on_setting_status_changed_listener(Arc::new(ConsoleListener));
    match at {
        Some(date) if !clear => note.set_alert_date(date, true),
        _ => note.set_alert_date(0, false),
    }

    save_or_fail(&mut note)?;
    Ok(())
}
