//! Data models for notesync

mod columns;
mod record;
mod settings;
mod summary;
mod value;

pub use columns::{data, note, Collection};
pub use record::{
    folders, CallRecord, ContentKind, NoteMode, NoteType, RecordId, WidgetBinding, WidgetType,
    INVALID_WIDGET_ID,
};
pub use settings::SyncSettings;
pub use summary::{NoteSummary, TAG_CHECKED, TAG_UNCHECKED};
pub use value::{FieldMap, Value};
