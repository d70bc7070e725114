//! Change notifications raised by a working note

use crate::models::NoteMode;

/// Receives setting changes from a `WorkingNote`.
///
/// Callbacks run synchronously inside the mutator that caused them, after the
/// new value is applied and before anything is written to the store.
pub trait NoteSettingChanged: Send + Sync {
    /// The background color of the note has just changed
    fn on_background_color_changed(&self);

    /// An alert was set (`set == true`) or cleared
    fn on_clock_alert_changed(&self, date: i64, set: bool);

    /// The widget showing this note needs a refresh
    fn on_widget_changed(&self);

    /// Switched between check-list and normal mode
    fn on_check_list_mode_changed(&self, old_mode: NoteMode, new_mode: NoteMode);
}
