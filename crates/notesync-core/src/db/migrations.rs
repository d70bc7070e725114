//! Database migrations

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{folders, ContentKind, NoteType};

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.unwrap_or(0))
}

/// Migration to version 1: notes, content rows, settings and bookkeeping triggers
fn migrate_v1(conn: &Connection) -> Result<()> {
    let now_ms = "(CAST(strftime('%s','now') AS INTEGER) * 1000)";
    let text_mime = ContentKind::Text.mime_type();
    let system = NoteType::System.code();

    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )"
        .to_string(),
        // Notes and folders
        format!(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER NOT NULL DEFAULT 0,
                alerted_date INTEGER NOT NULL DEFAULT 0,
                bg_color_id INTEGER NOT NULL DEFAULT 0,
                created_date INTEGER NOT NULL DEFAULT {now_ms},
                has_attachment INTEGER NOT NULL DEFAULT 0,
                modified_date INTEGER NOT NULL DEFAULT {now_ms},
                notes_count INTEGER NOT NULL DEFAULT 0,
                snippet TEXT NOT NULL DEFAULT '',
                type INTEGER NOT NULL DEFAULT 0,
                widget_id INTEGER NOT NULL DEFAULT 0,
                widget_type INTEGER NOT NULL DEFAULT -1,
                sync_id INTEGER NOT NULL DEFAULT 0,
                local_modified INTEGER NOT NULL DEFAULT 0,
                origin_parent_id INTEGER NOT NULL DEFAULT 0,
                gtask_id TEXT NOT NULL DEFAULT '',
                version INTEGER NOT NULL DEFAULT 0
            )"
        ),
        "CREATE INDEX IF NOT EXISTS idx_notes_parent ON notes(parent_id)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_notes_gtask ON notes(gtask_id)".to_string(),
        // Content rows
        format!(
            "CREATE TABLE IF NOT EXISTS data (
                id INTEGER PRIMARY KEY,
                mime_type TEXT NOT NULL,
                note_id INTEGER NOT NULL DEFAULT 0,
                created_date INTEGER NOT NULL DEFAULT {now_ms},
                modified_date INTEGER NOT NULL DEFAULT {now_ms},
                content TEXT NOT NULL DEFAULT '',
                data1 INTEGER,
                data2 INTEGER,
                data3 TEXT NOT NULL DEFAULT '',
                data4 TEXT NOT NULL DEFAULT '',
                data5 TEXT NOT NULL DEFAULT ''
            )"
        ),
        "CREATE INDEX IF NOT EXISTS idx_data_note ON data(note_id)".to_string(),
        // Settings table (local only)
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )"
        .to_string(),
        // System folders, seeded before the count triggers exist
        format!(
            "INSERT OR IGNORE INTO notes (id, parent_id, type) VALUES
                ({root}, 0, {system}),
                ({temporary}, {root}, {system}),
                ({call_record}, {root}, {system}),
                ({trash}, {root}, {system})",
            root = folders::ROOT,
            temporary = folders::TEMPORARY,
            call_record = folders::CALL_RECORD,
            trash = folders::TRASH,
        ),
        // Folder note counts
        "CREATE TRIGGER IF NOT EXISTS increase_folder_count_on_insert AFTER INSERT ON notes
         BEGIN
             UPDATE notes SET notes_count = notes_count + 1 WHERE id = NEW.parent_id;
         END"
        .to_string(),
        "CREATE TRIGGER IF NOT EXISTS move_folder_count_on_update AFTER UPDATE OF parent_id ON notes
         WHEN OLD.parent_id <> NEW.parent_id
         BEGIN
             UPDATE notes SET notes_count = notes_count - 1
                 WHERE id = OLD.parent_id AND notes_count > 0;
             UPDATE notes SET notes_count = notes_count + 1 WHERE id = NEW.parent_id;
         END"
        .to_string(),
        "CREATE TRIGGER IF NOT EXISTS decrease_folder_count_on_delete AFTER DELETE ON notes
         BEGIN
             UPDATE notes SET notes_count = notes_count - 1
                 WHERE id = OLD.parent_id AND notes_count > 0;
         END"
        .to_string(),
        "CREATE TRIGGER IF NOT EXISTS delete_data_on_note_delete AFTER DELETE ON notes
         BEGIN
             DELETE FROM data WHERE note_id = OLD.id;
         END"
        .to_string(),
        // Snippet follows the text content row
        format!(
            "CREATE TRIGGER IF NOT EXISTS snippet_on_data_insert AFTER INSERT ON data
             WHEN NEW.mime_type = '{text_mime}'
             BEGIN
                 UPDATE notes SET snippet = NEW.content WHERE id = NEW.note_id;
             END"
        ),
        format!(
            "CREATE TRIGGER IF NOT EXISTS snippet_on_data_update AFTER UPDATE ON data
             WHEN OLD.mime_type = '{text_mime}'
             BEGIN
                 UPDATE notes SET snippet = NEW.content WHERE id = NEW.note_id;
             END"
        ),
        format!(
            "CREATE TRIGGER IF NOT EXISTS snippet_on_data_delete AFTER DELETE ON data
             WHEN OLD.mime_type = '{text_mime}'
             BEGIN
                 UPDATE notes SET snippet = '' WHERE id = OLD.note_id;
             END"
        ),
        // Record migration version
        "INSERT INTO schema_version (version) VALUES (1)".to_string(),
    ];

    let tx = conn.unchecked_transaction()?;
    for stmt in &statements {
        tx.execute(stmt, [])?;
    }
    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
