//! Local entity cache snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityType, HasKeyStr, HasRowId, ROW_ID_FIELD};

/// A snapshot of one entity type's records, held locally.
///
/// Snapshots are immutable: refreshing a cache produces a new snapshot and
/// leaves handles to the old one untouched.
#[derive(Debug, Clone)]
pub struct EntityCache {
    entity_type: EntityType,
    loaded_at: DateTime<Utc>,
    rows: Vec<Value>,
}

/// Incremental changes to a cache since a given time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheChanges {
    /// New or modified rows.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Value>,
    /// Row ids removed on the server.
    #[serde(default)]
    pub deleted: Vec<i32>,
    /// The server cannot produce a delta; the cache must be reloaded.
    #[serde(default)]
    pub reset: bool,
}

impl EntityCache {
    /// Create a snapshot from raw rows, stamped with the local time it was
    /// requested at.
    pub fn new(entity_type: EntityType, rows: Vec<Value>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            entity_type,
            loaded_at,
            rows,
        }
    }

    /// The entity type this cache holds.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Local time this snapshot was loaded or last refreshed at.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the cache holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every cached row as `T`.
    ///
    /// Rows that do not decode are skipped.
    pub fn rows<T: Entity>(&self) -> Vec<T> {
        self.rows.iter().filter_map(|row| self.decode(row)).collect()
    }

    /// Look up a cached record by row id.
    pub fn get<T: HasRowId>(&self, row_id: i32) -> Option<T> {
        self.find(ROW_ID_FIELD, |v| v.as_i64() == Some(i64::from(row_id)))
    }

    /// Look up a cached record by key string.
    pub fn get_by_key<T: HasKeyStr>(&self, key: &str) -> Option<T> {
        self.find(T::KEY_FIELD, |v| v.as_str() == Some(key))
    }

    /// Apply incremental changes, producing a new snapshot stamped `at`.
    ///
    /// Changed rows replace cached rows with the same row id, or are
    /// appended. Deleted row ids are dropped. `changes.reset` is not
    /// interpreted here.
    pub fn apply_changes(&self, changes: CacheChanges, at: DateTime<Utc>) -> Self {
        let mut rows: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| match row_id_of(row) {
                Some(id) => !changes.deleted.contains(&id),
                None => true,
            })
            .cloned()
            .collect();

        for changed in changes.rows {
            let existing = row_id_of(&changed)
                .and_then(|id| rows.iter().position(|row| row_id_of(row) == Some(id)));
            match existing {
                Some(pos) => rows[pos] = changed,
                None => rows.push(changed),
            }
        }

        Self::new(self.entity_type, rows, at)
    }

    fn find<T: Entity>(&self, field: &str, pred: impl Fn(&Value) -> bool) -> Option<T> {
        self.rows
            .iter()
            .find(|row| row.get(field).is_some_and(&pred))
            .and_then(|row| self.decode(row))
    }

    fn decode<T: Entity>(&self, row: &Value) -> Option<T> {
        match serde_json::from_value(row.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    entity = %self.entity_type,
                    target_type = %T::ENTITY_TYPE,
                    error = %e,
                    "skipping cached row that does not decode"
                );
                None
            }
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn row_id_of(row: &Value) -> Option<i32> {
    row.get(ROW_ID_FIELD)
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}
