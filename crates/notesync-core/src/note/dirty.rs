//! Field-level change accumulator for one logical row

use crate::models::{note, FieldMap, Value};

/// Pending column values for one row, cleared once the store confirms a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRecord {
    fields: FieldMap,
}

impl DirtyRecord {
    pub const fn new() -> Self {
        Self {
            fields: FieldMap::new(),
        }
    }

    /// Set `field` and stamp the row as locally modified at `now`.
    ///
    /// Field, marker and timestamp are written together; there is no way to
    /// record a change without its stamp.
    pub fn set(&mut self, field: &'static str, value: impl Into<Value>, now: i64) {
        self.put(field, value);
        self.stamp(now);
    }

    /// Set `field` without stamping. Used for content rows, whose stamp lands
    /// on the owning note's record.
    pub fn put(&mut self, field: &'static str, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    /// Write the local-modified marker and modification timestamp
    pub fn stamp(&mut self, now: i64) {
        self.fields.insert(note::LOCAL_MODIFIED, Value::from(1));
        self.fields.insert(note::MODIFIED_DATE, Value::from(now));
    }

    pub fn is_dirty(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub const fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_clean() {
        assert!(!DirtyRecord::new().is_dirty());
    }

    #[test]
    fn test_set_stamps_marker_and_timestamp() {
        let mut record = DirtyRecord::new();
        record.set(note::BG_COLOR_ID, 2, 1_234);

        assert!(record.is_dirty());
        assert_eq!(record.get(note::BG_COLOR_ID), Some(&Value::from(2)));
        assert_eq!(record.get(note::LOCAL_MODIFIED), Some(&Value::from(1)));
        assert_eq!(record.get(note::MODIFIED_DATE), Some(&Value::from(1_234)));
    }

    #[test]
    fn test_last_write_wins() {
        let mut record = DirtyRecord::new();
        record.set(note::WIDGET_ID, 1, 10);
        record.set(note::WIDGET_ID, 5, 20);

        assert_eq!(record.get(note::WIDGET_ID), Some(&Value::from(5)));
        assert_eq!(record.get(note::MODIFIED_DATE), Some(&Value::from(20)));
        assert_eq!(record.fields().len(), 3);
    }

    #[test]
    fn test_dirty_iff_set_since_clear() {
        let mut record = DirtyRecord::new();
        for round in 0..3 {
            assert!(!record.is_dirty());
            for step in 0..=round {
                record.put(note::SNIPPET, format!("v{step}"));
                assert!(record.is_dirty());
            }
            record.clear();
        }
        assert!(!record.is_dirty());
    }

    #[test]
    fn test_put_does_not_stamp() {
        let mut record = DirtyRecord::new();
        record.put(note::SNIPPET, "x");
        assert_eq!(record.get(note::LOCAL_MODIFIED), None);
        assert_eq!(record.get(note::MODIFIED_DATE), None);
    }
}
