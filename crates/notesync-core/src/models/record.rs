//! Note identifiers and the small enumerations stored on note rows

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of a row in the record store.
///
/// `0` means the record has not been created yet; every persisted record has a
/// positive id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(i64);

impl RecordId {
    /// Marker for a record that does not exist in the store yet
    pub const NEW: Self = Self(0);

    /// Wrap a raw identifier
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw integer value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this id refers to a persisted record
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Folder ids reserved for system folders
pub mod folders {
    /// Top-level folder holding notes and user folders
    pub const ROOT: i64 = 0;
    /// Temporary folder for notes without a home
    pub const TEMPORARY: i64 = -1;
    /// Folder holding notes attached to phone calls
    pub const CALL_RECORD: i64 = -2;
    /// Trash folder
    pub const TRASH: i64 = -3;
}

/// Kind of row in the notes collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Note,
    Folder,
    System,
}

impl NoteType {
    pub const fn code(self) -> i64 {
        match self {
            Self::Note => 0,
            Self::Folder => 1,
            Self::System => 2,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Note),
            1 => Some(Self::Folder),
            2 => Some(Self::System),
            _ => None,
        }
    }
}

/// Home-screen widget size a note is bound to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    #[default]
    Invalid,
    Small,
    Large,
}

impl WidgetType {
    pub const fn code(self) -> i64 {
        match self {
            Self::Invalid => -1,
            Self::Small => 0,
            Self::Large => 1,
        }
    }

    /// Unknown codes map to `Invalid`
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Small,
            1 => Self::Large,
            _ => Self::Invalid,
        }
    }
}

/// Widget id that never refers to a real widget
pub const INVALID_WIDGET_ID: i64 = 0;

/// Widget a note is displayed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetBinding {
    pub widget_id: i64,
    pub widget_type: WidgetType,
}

impl WidgetBinding {
    /// A binding is live when both the id and the type are usable
    pub const fn is_bound(self) -> bool {
        self.widget_id > INVALID_WIDGET_ID && !matches!(self.widget_type, WidgetType::Invalid)
    }
}

/// Editing mode of a text note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteMode {
    #[default]
    Normal,
    CheckList,
}

impl NoteMode {
    pub const fn code(self) -> i64 {
        match self {
            Self::Normal => 0,
            Self::CheckList => 1,
        }
    }

    pub const fn from_code(code: i64) -> Self {
        if code == 1 {
            Self::CheckList
        } else {
            Self::Normal
        }
    }
}

/// Content row discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Call,
}

impl ContentKind {
    /// MIME-like discriminator stored in the data collection
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Text => "vnd.notesync.item/text_note",
            Self::Call => "vnd.notesync.item/call_note",
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type {
            "vnd.notesync.item/text_note" => Some(Self::Text),
            "vnd.notesync.item/call_note" => Some(Self::Call),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Call => f.write_str("call"),
        }
    }
}

/// Phone call a note was written for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub phone_number: String,
    /// Call timestamp (Unix ms)
    pub call_date: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_persisted() {
        assert!(!RecordId::NEW.is_persisted());
        assert!(!RecordId::new(-1).is_persisted());
        assert!(RecordId::new(7).is_persisted());
    }

    #[test]
    fn test_record_id_parse() {
        let id: RecordId = " 42 ".parse().unwrap();
        assert_eq!(id, RecordId::new(42));
        assert!("abc".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_widget_binding() {
        let bound = WidgetBinding {
            widget_id: 3,
            widget_type: WidgetType::Large,
        };
        assert!(bound.is_bound());

        let sentinel = WidgetBinding {
            widget_id: -1,
            widget_type: WidgetType::Small,
        };
        assert!(!sentinel.is_bound());

        let untyped = WidgetBinding {
            widget_id: 3,
            widget_type: WidgetType::Invalid,
        };
        assert!(!untyped.is_bound());
    }

    #[test]
    fn test_codes() {
        assert_eq!(WidgetType::from_code(9), WidgetType::Invalid);
        assert_eq!(NoteMode::from_code(NoteMode::CheckList.code()), NoteMode::CheckList);
        assert_eq!(NoteType::from_code(1), Some(NoteType::Folder));
        assert_eq!(
            ContentKind::from_mime_type(ContentKind::Call.mime_type()),
            Some(ContentKind::Call)
        );
        assert_eq!(ContentKind::from_mime_type("image/png"), None);
    }
}
