//! Record store contract shared by the note model and the sync pass

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{Collection, FieldMap, RecordId, Value};

/// One operation inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Insert {
        collection: Collection,
        fields: FieldMap,
    },
    Update {
        collection: Collection,
        id: RecordId,
        fields: FieldMap,
    },
    Delete {
        collection: Collection,
        id: RecordId,
    },
}

impl StoreOp {
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Insert { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => *collection,
        }
    }
}

/// Result of one batched operation, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpResult {
    Inserted(RecordId),
    Affected(usize),
}

/// Row filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    And(Vec<Predicate>),
}

impl Predicate {
    /// Match a single record by id
    pub fn id(id: RecordId) -> Self {
        Self::Eq("id", Value::from(id))
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Eq(column, value.into())
    }

    pub fn ne(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Ne(column, value.into())
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All => other,
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Columns referenced by this predicate
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            Self::All => Vec::new(),
            Self::Eq(column, _) | Self::Ne(column, _) => vec![*column],
            Self::And(parts) => parts.iter().flat_map(Self::columns).collect(),
        }
    }
}

/// One query result row, keyed by projected column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<&'static str, Value>,
}

impl Row {
    pub fn new(values: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Integer column; NULL or missing reads as 0
    pub fn get_i64(&self, column: &str) -> i64 {
        self.get(column).and_then(Value::as_i64).unwrap_or_default()
    }

    /// Text column; NULL or missing reads as an empty string
    pub fn get_string(&self, column: &str) -> String {
        match self.get(column) {
            Some(Value::Text(value)) => value.clone(),
            Some(Value::Integer(value)) => value.to_string(),
            _ => String::new(),
        }
    }

    pub fn get_id(&self, column: &str) -> RecordId {
        RecordId::new(self.get_i64(column))
    }
}

/// Storage primitives addressed by collection and numeric record id.
///
/// Calls are blocking. Implementations must be shareable across threads so a
/// sync pass can use the same store as foreground edits.
pub trait RecordStore: Send + Sync {
    /// Insert a row and return the id the store assigned
    fn insert(&self, collection: Collection, fields: &FieldMap) -> Result<RecordId>;

    /// Update one row, returning the number of affected rows
    fn update(&self, collection: Collection, id: RecordId, fields: &FieldMap) -> Result<usize>;

    /// Apply all operations or none of them
    fn batch_apply(&self, ops: &[StoreOp]) -> Result<Vec<OpResult>>;

    /// Rows matching `predicate`, ordered by id
    fn query(
        &self,
        collection: Collection,
        projection: &[&'static str],
        predicate: &Predicate,
    ) -> Result<Vec<Row>>;
}
