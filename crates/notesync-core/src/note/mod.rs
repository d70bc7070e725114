//! Note editing: change tracking, aggregate flush and the working note

mod aggregate;
mod dirty;
mod listener;
mod working;

pub use aggregate::{NoteAggregate, Target};
pub use dirty::DirtyRecord;
pub use listener::NoteSettingChanged;
pub use working::WorkingNote;
