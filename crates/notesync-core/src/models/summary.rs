//! List-row model for notes and folders

use serde::{Deserialize, Serialize};

use super::{folders, NoteType, RecordId, WidgetBinding};

/// Marker prefixed to a checked check-list line
pub const TAG_CHECKED: char = '\u{221A}';
/// Marker prefixed to an unchecked check-list line
pub const TAG_UNCHECKED: char = '\u{25A1}';

/// One row of a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: RecordId,
    /// Alert timestamp (Unix ms), 0 when unset
    pub alert_date: i64,
    pub bg_color_id: i64,
    /// Creation timestamp (Unix ms)
    pub created_date: i64,
    pub has_attachment: bool,
    /// Last modification timestamp (Unix ms)
    pub modified_date: i64,
    /// Number of notes inside a folder row
    pub notes_count: i64,
    pub parent_id: i64,
    /// Snippet with check-list markers removed
    pub snippet: String,
    pub note_type: NoteType,
    pub widget: WidgetBinding,
    /// Phone number of a call-record note, empty otherwise
    pub phone_number: String,
}

impl NoteSummary {
    /// Strip check-list markers from a stored snippet
    pub fn clean_snippet(raw: &str) -> String {
        raw.chars()
            .filter(|ch| *ch != TAG_CHECKED && *ch != TAG_UNCHECKED)
            .collect()
    }

    pub const fn has_alert(&self) -> bool {
        self.alert_date > 0
    }

    pub const fn folder_id(&self) -> i64 {
        self.parent_id
    }

    pub fn is_call_record(&self) -> bool {
        self.parent_id == folders::CALL_RECORD && !self.phone_number.is_empty()
    }

    /// First line of the snippet, truncated to `max_len` characters
    pub fn title_preview(&self, max_len: usize) -> String {
        self.snippet
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WidgetType;

    fn summary(parent_id: i64, phone_number: &str) -> NoteSummary {
        NoteSummary {
            id: RecordId::new(1),
            alert_date: 0,
            bg_color_id: 0,
            created_date: 1,
            has_attachment: false,
            modified_date: 1,
            notes_count: 0,
            parent_id,
            snippet: "First line\nSecond".to_string(),
            note_type: NoteType::Note,
            widget: WidgetBinding {
                widget_id: 0,
                widget_type: WidgetType::Invalid,
            },
            phone_number: phone_number.to_string(),
        }
    }

    #[test]
    fn test_clean_snippet_removes_markers() {
        let raw = format!("{TAG_CHECKED} milk\n{TAG_UNCHECKED} eggs");
        assert_eq!(NoteSummary::clean_snippet(&raw), " milk\n eggs");
    }

    #[test]
    fn test_is_call_record() {
        assert!(summary(folders::CALL_RECORD, "5550100").is_call_record());
        assert!(!summary(folders::CALL_RECORD, "").is_call_record());
        assert!(!summary(folders::ROOT, "5550100").is_call_record());
    }

    #[test]
    fn test_title_preview() {
        let row = summary(folders::ROOT, "");
        assert_eq!(row.title_preview(50), "First line");
        assert_eq!(row.title_preview(5), "First");
    }
}
