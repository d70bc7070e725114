//! Collection and column names of the persisted layout

/// Addressable collections in the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Note and folder attributes
    Notes,
    /// Content rows (text and call records)
    Data,
}

impl Collection {
    pub const fn table(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Data => "data",
        }
    }

    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Notes => note::ALL,
            Self::Data => data::ALL,
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

/// Columns of the notes collection
pub mod note {
    pub const ID: &str = "id";
    pub const PARENT_ID: &str = "parent_id";
    pub const ALERTED_DATE: &str = "alerted_date";
    pub const BG_COLOR_ID: &str = "bg_color_id";
    pub const CREATED_DATE: &str = "created_date";
    pub const HAS_ATTACHMENT: &str = "has_attachment";
    pub const MODIFIED_DATE: &str = "modified_date";
    pub const NOTES_COUNT: &str = "notes_count";
    pub const SNIPPET: &str = "snippet";
    pub const TYPE: &str = "type";
    pub const WIDGET_ID: &str = "widget_id";
    pub const WIDGET_TYPE: &str = "widget_type";
    pub const SYNC_ID: &str = "sync_id";
    pub const LOCAL_MODIFIED: &str = "local_modified";
    pub const ORIGIN_PARENT_ID: &str = "origin_parent_id";
    pub const GTASK_ID: &str = "gtask_id";
    pub const VERSION: &str = "version";

    pub const ALL: &[&str] = &[
        ID,
        PARENT_ID,
        ALERTED_DATE,
        BG_COLOR_ID,
        CREATED_DATE,
        HAS_ATTACHMENT,
        MODIFIED_DATE,
        NOTES_COUNT,
        SNIPPET,
        TYPE,
        WIDGET_ID,
        WIDGET_TYPE,
        SYNC_ID,
        LOCAL_MODIFIED,
        ORIGIN_PARENT_ID,
        GTASK_ID,
        VERSION,
    ];
}

/// Columns of the data collection
pub mod data {
    pub const ID: &str = "id";
    pub const MIME_TYPE: &str = "mime_type";
    pub const NOTE_ID: &str = "note_id";
    pub const CREATED_DATE: &str = "created_date";
    pub const MODIFIED_DATE: &str = "modified_date";
    pub const CONTENT: &str = "content";
    pub const DATA1: &str = "data1";
    pub const DATA2: &str = "data2";
    pub const DATA3: &str = "data3";
    pub const DATA4: &str = "data4";
    pub const DATA5: &str = "data5";

    pub const ALL: &[&str] = &[
        ID,
        MIME_TYPE,
        NOTE_ID,
        CREATED_DATE,
        MODIFIED_DATE,
        CONTENT,
        DATA1,
        DATA2,
        DATA3,
        DATA4,
        DATA5,
    ];

    /// Check-list mode of a text row
    pub const TEXT_MODE: &str = DATA1;
    /// Call timestamp of a call row
    pub const CALL_DATE: &str = DATA1;
    /// Phone number of a call row
    pub const PHONE_NUMBER: &str = DATA3;
}
