//! `SQLite` implementation of the record store

use std::fmt::Write as _;

use rusqlite::{params_from_iter, Connection};

use super::store::{OpResult, Predicate, RecordStore, Row, StoreOp};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{Collection, FieldMap, RecordId, Value};

/// `SQLite` implementation of `RecordStore`
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    /// Create a new store on the given database
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Reject column names that are not part of the collection's schema
    fn check_columns<'a>(
        collection: Collection,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        for column in columns {
            if !collection.has_column(column) {
                return Err(Error::InvalidInput(format!(
                    "unknown column '{column}' for {}",
                    collection.table()
                )));
            }
        }
        Ok(())
    }

    fn insert_with(conn: &Connection, collection: Collection, fields: &FieldMap) -> Result<RecordId> {
        Self::check_columns(collection, fields.keys().copied())?;

        let sql = if fields.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", collection.table())
        } else {
            let columns = fields.keys().copied().collect::<Vec<_>>().join(", ");
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!(
                "INSERT INTO {} ({columns}) VALUES ({placeholders})",
                collection.table()
            )
        };

        conn.execute(&sql, params_from_iter(fields.values()))?;
        Ok(RecordId::new(conn.last_insert_rowid()))
    }

    fn update_with(
        conn: &Connection,
        collection: Collection,
        id: RecordId,
        fields: &FieldMap,
    ) -> Result<usize> {
        Self::check_columns(collection, fields.keys().copied())?;
        if fields.is_empty() {
            return Ok(0);
        }

        let assignments = fields
            .keys()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = ?", collection.table());

        let id_value = Value::from(id);
        let params = fields.values().chain(std::iter::once(&id_value));
        Ok(conn.execute(&sql, params_from_iter(params))?)
    }

    fn delete_with(conn: &Connection, collection: Collection, id: RecordId) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.table());
        Ok(conn.execute(&sql, [id.get()])?)
    }

    /// Render a predicate into a WHERE expression, collecting bound values
    fn push_predicate<'a>(predicate: &'a Predicate, sql: &mut String, params: &mut Vec<&'a Value>) {
        match predicate {
            Predicate::All => sql.push('1'),
            Predicate::Eq(column, Value::Null) => {
                let _ = write!(sql, "{column} IS NULL");
            }
            Predicate::Eq(column, value) => {
                let _ = write!(sql, "{column} = ?");
                params.push(value);
            }
            Predicate::Ne(column, Value::Null) => {
                let _ = write!(sql, "{column} IS NOT NULL");
            }
            Predicate::Ne(column, value) => {
                let _ = write!(sql, "{column} <> ?");
                params.push(value);
            }
            Predicate::And(parts) if parts.is_empty() => sql.push('1'),
            Predicate::And(parts) => {
                sql.push('(');
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        sql.push_str(" AND ");
                    }
                    Self::push_predicate(part, sql, params);
                }
                sql.push(')');
            }
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, collection: Collection, fields: &FieldMap) -> Result<RecordId> {
        let conn = self.db.lock()?;
        let id = Self::insert_with(&conn, collection, fields)?;
        tracing::debug!("Inserted {} row {}", collection.table(), id);
        Ok(id)
    }

    fn update(&self, collection: Collection, id: RecordId, fields: &FieldMap) -> Result<usize> {
        let conn = self.db.lock()?;
        Self::update_with(&conn, collection, id, fields)
    }

    fn batch_apply(&self, ops: &[StoreOp]) -> Result<Vec<OpResult>> {
        let conn = self.db.lock()?;
        let tx = conn.unchecked_transaction()?;

        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = match op {
                StoreOp::Insert { collection, fields } => {
                    OpResult::Inserted(Self::insert_with(&tx, *collection, fields)?)
                }
                StoreOp::Update {
                    collection,
                    id,
                    fields,
                } => OpResult::Affected(Self::update_with(&tx, *collection, *id, fields)?),
                StoreOp::Delete { collection, id } => {
                    OpResult::Affected(Self::delete_with(&tx, *collection, *id)?)
                }
            };
            results.push(result);
        }

        tx.commit()?;
        tracing::debug!("Applied batch of {} operations", results.len());
        Ok(results)
    }

    fn query(
        &self,
        collection: Collection,
        projection: &[&'static str],
        predicate: &Predicate,
    ) -> Result<Vec<Row>> {
        let projection = if projection.is_empty() {
            collection.columns()
        } else {
            projection
        };
        Self::check_columns(collection, projection.iter().copied())?;
        Self::check_columns(collection, predicate.columns())?;

        let mut filter = String::new();
        let mut params = Vec::new();
        Self::push_predicate(predicate, &mut filter, &mut params);

        let sql = format!(
            "SELECT {} FROM {} WHERE {filter} ORDER BY id",
            projection.join(", "),
            collection.table()
        );

        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                let mut values = Vec::with_capacity(projection.len());
                for (index, column) in projection.iter().enumerate() {
                    values.push((*column, row.get::<_, Value>(index)?));
                }
                Ok(Row::new(values))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{data, note, ContentKind};
    use pretty_assertions::assert_eq;

    fn setup() -> SqliteRecordStore {
        Database::open_in_memory().unwrap().record_store()
    }

    fn note_fields(parent_id: i64) -> FieldMap {
        FieldMap::from([
            (note::PARENT_ID, Value::from(parent_id)),
            (note::CREATED_DATE, Value::from(1_000)),
            (note::MODIFIED_DATE, Value::from(1_000)),
            (note::LOCAL_MODIFIED, Value::from(1)),
        ])
    }

    #[test]
    fn test_insert_and_query() {
        let store = setup();
        let id = store.insert(Collection::Notes, &note_fields(0)).unwrap();
        assert!(id.is_persisted());

        let rows = store
            .query(
                Collection::Notes,
                &[note::ID, note::PARENT_ID, note::LOCAL_MODIFIED],
                &Predicate::id(id),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_id(note::ID), id);
        assert_eq!(rows[0].get_i64(note::LOCAL_MODIFIED), 1);
    }

    #[test]
    fn test_update_reports_affected_rows() {
        let store = setup();
        let id = store.insert(Collection::Notes, &note_fields(0)).unwrap();
        let fields = FieldMap::from([(note::BG_COLOR_ID, Value::from(3))]);

        assert_eq!(store.update(Collection::Notes, id, &fields).unwrap(), 1);
        assert_eq!(
            store
                .update(Collection::Notes, RecordId::new(999), &fields)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let store = setup();
        let fields = FieldMap::from([("not_a_column", Value::from(1))]);
        let error = store.insert(Collection::Notes, &fields).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[test]
    fn test_batch_apply_is_all_or_nothing() {
        let store = setup();
        let id = store.insert(Collection::Notes, &note_fields(0)).unwrap();

        let ops = vec![
            StoreOp::Update {
                collection: Collection::Notes,
                id,
                fields: FieldMap::from([(note::BG_COLOR_ID, Value::from(4))]),
            },
            // data.mime_type is NOT NULL, so this insert fails
            StoreOp::Insert {
                collection: Collection::Data,
                fields: FieldMap::from([(data::NOTE_ID, Value::from(id))]),
            },
        ];
        assert!(store.batch_apply(&ops).is_err());

        let rows = store
            .query(Collection::Notes, &[note::BG_COLOR_ID], &Predicate::id(id))
            .unwrap();
        assert_eq!(rows[0].get_i64(note::BG_COLOR_ID), 0);
    }

    #[test]
    fn test_batch_apply_returns_results_in_order() {
        let store = setup();
        let id = store.insert(Collection::Notes, &note_fields(0)).unwrap();

        let ops = vec![
            StoreOp::Insert {
                collection: Collection::Data,
                fields: FieldMap::from([
                    (data::NOTE_ID, Value::from(id)),
                    (data::MIME_TYPE, Value::from(ContentKind::Text.mime_type())),
                    (data::CONTENT, Value::from("hello")),
                ]),
            },
            StoreOp::Update {
                collection: Collection::Notes,
                id,
                fields: FieldMap::from([(note::LOCAL_MODIFIED, Value::from(0))]),
            },
            StoreOp::Delete {
                collection: Collection::Notes,
                id: RecordId::new(12_345),
            },
        ];
        let results = store.batch_apply(&ops).unwrap();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], OpResult::Inserted(data_id) if data_id.is_persisted()));
        assert_eq!(results[1], OpResult::Affected(1));
        assert_eq!(results[2], OpResult::Affected(0));
    }

    #[test]
    fn test_query_predicates() {
        let store = setup();
        store.insert(Collection::Notes, &note_fields(0)).unwrap();
        store.insert(Collection::Notes, &note_fields(-3)).unwrap();

        let outside_trash = store
            .query(
                Collection::Notes,
                &[note::ID],
                &Predicate::eq(note::TYPE, 0).and(Predicate::ne(note::PARENT_ID, -3)),
            )
            .unwrap();
        assert_eq!(outside_trash.len(), 1);

        let all_columns = store
            .query(Collection::Notes, &[], &Predicate::eq(note::TYPE, 0))
            .unwrap();
        assert_eq!(all_columns.len(), 2);
        assert!(all_columns[0].get(note::GTASK_ID).is_some());
    }
}
