//! In-memory record store that logs every call and can be told to fail

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::db::{OpResult, Predicate, RecordStore, Row, StoreOp};
use crate::error::{Error, Result};
use crate::models::{Collection, FieldMap, RecordId, Value};

/// One store call, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Insert(Collection, FieldMap),
    Update(Collection, RecordId, FieldMap),
    Batch(Vec<StoreOp>),
    Query(Collection),
}

#[derive(Debug, Default)]
struct Inner {
    tables: BTreeMap<Collection, BTreeMap<i64, FieldMap>>,
    next_id: i64,
    calls: Vec<StoreCall>,
    fail_insert: Option<Collection>,
    insert_id_override: Option<RecordId>,
    fail_update: bool,
    fail_batch: bool,
    empty_batch_result: bool,
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: Mutex<Inner>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Seed a row with a fixed id
    pub fn seed(&self, collection: Collection, id: i64, fields: FieldMap) {
        let mut inner = self.inner();
        inner.next_id = inner.next_id.max(id);
        inner.tables.entry(collection).or_default().insert(id, fields);
    }

    pub fn row(&self, collection: Collection, id: RecordId) -> Option<FieldMap> {
        self.inner()
            .tables
            .get(&collection)
            .and_then(|table| table.get(&id.get()))
            .cloned()
    }

    pub fn row_count(&self, collection: Collection) -> usize {
        self.inner().tables.get(&collection).map_or(0, BTreeMap::len)
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner().calls.clone()
    }

    /// Calls that write, skipping queries
    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, StoreCall::Query(_)))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner().calls.clear();
    }

    pub fn fail_inserts_into(&self, collection: Option<Collection>) {
        self.inner().fail_insert = collection;
    }

    /// Make every insert report `id` without storing anything
    pub fn return_insert_id(&self, id: Option<RecordId>) {
        self.inner().insert_id_override = id;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.inner().fail_update = fail;
    }

    pub fn fail_batches(&self, fail: bool) {
        self.inner().fail_batch = fail;
    }

    pub fn return_empty_batch_result(&self, empty: bool) {
        self.inner().empty_batch_result = empty;
    }

    fn do_insert(inner: &mut Inner, collection: Collection, fields: &FieldMap) -> RecordId {
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .tables
            .entry(collection)
            .or_default()
            .insert(id, fields.clone());
        RecordId::new(id)
    }

    fn do_update(inner: &mut Inner, collection: Collection, id: RecordId, fields: &FieldMap) -> usize {
        let Some(row) = inner
            .tables
            .get_mut(&collection)
            .and_then(|table| table.get_mut(&id.get()))
        else {
            return 0;
        };
        for (column, value) in fields {
            row.insert(column, value.clone());
        }
        1
    }

    fn matches(id: i64, fields: &FieldMap, predicate: &Predicate) -> bool {
        let lookup = |column: &str| {
            if column == "id" {
                Value::from(id)
            } else {
                fields.get(column).cloned().unwrap_or(Value::Null)
            }
        };
        match predicate {
            Predicate::All => true,
            Predicate::Eq(column, value) => lookup(column) == *value,
            Predicate::Ne(column, value) => lookup(column) != *value,
            Predicate::And(parts) => parts.iter().all(|part| Self::matches(id, fields, part)),
        }
    }
}

impl RecordStore for RecordingStore {
    fn insert(&self, collection: Collection, fields: &FieldMap) -> Result<RecordId> {
        let mut inner = self.inner();
        inner.calls.push(StoreCall::Insert(collection, fields.clone()));
        if inner.fail_insert == Some(collection) {
            return Err(Error::Store(format!("insert into {} failed", collection.table())));
        }
        if let Some(id) = inner.insert_id_override {
            return Ok(id);
        }
        Ok(Self::do_insert(&mut inner, collection, fields))
    }

    fn update(&self, collection: Collection, id: RecordId, fields: &FieldMap) -> Result<usize> {
        let mut inner = self.inner();
        inner
            .calls
            .push(StoreCall::Update(collection, id, fields.clone()));
        if inner.fail_update {
            return Err(Error::Store("update failed".to_string()));
        }
        Ok(Self::do_update(&mut inner, collection, id, fields))
    }

    fn batch_apply(&self, ops: &[StoreOp]) -> Result<Vec<OpResult>> {
        let mut inner = self.inner();
        inner.calls.push(StoreCall::Batch(ops.to_vec()));
        if inner.fail_batch {
            return Err(Error::Store("batch failed".to_string()));
        }
        if inner.empty_batch_result {
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = match op {
                StoreOp::Insert { collection, fields } => {
                    OpResult::Inserted(Self::do_insert(&mut inner, *collection, fields))
                }
                StoreOp::Update {
                    collection,
                    id,
                    fields,
                } => OpResult::Affected(Self::do_update(&mut inner, *collection, *id, fields)),
                StoreOp::Delete { collection, id } => {
                    let removed = inner
                        .tables
                        .get_mut(collection)
                        .and_then(|table| table.remove(&id.get()));
                    OpResult::Affected(usize::from(removed.is_some()))
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    fn query(
        &self,
        collection: Collection,
        projection: &[&'static str],
        predicate: &Predicate,
    ) -> Result<Vec<Row>> {
        let mut inner = self.inner();
        inner.calls.push(StoreCall::Query(collection));

        let projection = if projection.is_empty() {
            collection.columns()
        } else {
            projection
        };
        let rows = inner
            .tables
            .get(&collection)
            .into_iter()
            .flatten()
            .filter(|(id, fields)| Self::matches(**id, fields, predicate))
            .map(|(id, fields)| {
                Row::new(projection.iter().map(|column| {
                    let value = if *column == "id" {
                        Value::from(*id)
                    } else {
                        fields.get(column).cloned().unwrap_or(Value::Null)
                    };
                    (*column, value)
                }))
            })
            .collect();
        Ok(rows)
    }
}
