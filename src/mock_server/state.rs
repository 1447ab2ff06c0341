//! Mock server state management.
//!
//! Provides the in-memory tables for the mock ERP gateway.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::CacheChanges;
use crate::entity::Entity;
use crate::filter::{FieldType, QueryFilter};

/// A table row along with the server time it last changed.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub data: Value,
    pub modified: DateTime<Utc>,
}

impl StoredRow {
    fn row_id(&self) -> Option<i64> {
        self.data.get("RowId").and_then(Value::as_i64)
    }
}

/// Shared state for the mock server.
///
/// Tables are keyed by entity type name. It's wrapped in `Arc<RwLock<_>>`
/// for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// The only company id the server answers for.
    pub company_id: u32,

    /// Rows per entity table.
    pub tables: HashMap<String, Vec<StoredRow>>,

    /// Deleted row ids per entity table, with the time of deletion.
    pub deleted: HashMap<String, Vec<(i32, DateTime<Utc>)>>,

    /// Tables whose change feed answers with a reset.
    pub reset_tables: HashSet<String>,

    /// Optional authentication token. If set, requests must include this token.
    pub required_token: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            company_id: 1,
            tables: HashMap::new(),
            deleted: HashMap::new(),
            reset_tables: HashSet::new(),
            required_token: None,
        }
    }
}

impl MockState {
    /// Create a new empty state for company 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Answer for a different company id.
    pub fn with_company(mut self, company_id: u32) -> Self {
        self.company_id = company_id;
        self
    }

    /// Add raw rows to a table.
    pub fn with_rows(mut self, entity: &str, rows: Vec<Value>) -> Self {
        let now = Utc::now();
        self.tables
            .entry(entity.to_string())
            .or_default()
            .extend(rows.into_iter().map(|data| StoredRow {
                data,
                modified: now,
            }));
        self
    }

    /// Add a typed entity to its table.
    pub fn with_entity<T: Entity + Serialize>(self, item: &T) -> Self {
        let row = serde_json::to_value(item).expect("Failed to serialize fixture");
        self.with_rows(T::ENTITY_TYPE.name(), vec![row])
    }

    /// Make the change feed of `entity` answer with a reset.
    pub fn with_reset(mut self, entity: &str) -> Self {
        self.reset_tables.insert(entity.to_string());
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Run a filtered query.
    ///
    /// Filters on fields that no row of the table has are ignored, so they
    /// yield the whole table.
    pub fn query(&self, entity: &str, filters: &[QueryFilter]) -> Vec<Value> {
        let rows = self.tables.get(entity).map(Vec::as_slice).unwrap_or_default();

        let known: Vec<&QueryFilter> = filters
            .iter()
            .filter(|f| rows.iter().any(|r| r.data.get(&f.field).is_some()))
            .collect();

        rows.iter()
            .filter(|r| known.iter().all(|f| filter_matches(f, &r.data)))
            .map(|r| r.data.clone())
            .collect()
    }

    /// All rows of a table.
    pub fn snapshot(&self, entity: &str) -> Vec<Value> {
        self.query(entity, &[])
    }

    /// Rows changed and deleted after `since`.
    pub fn changes_since(&self, entity: &str, since: DateTime<Utc>) -> CacheChanges {
        if self.reset_tables.contains(entity) {
            return CacheChanges {
                reset: true,
                ..Default::default()
            };
        }

        let rows = self
            .tables
            .get(entity)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.modified > since)
                    .map(|r| r.data.clone())
                    .collect()
            })
            .unwrap_or_default();

        let deleted = self
            .deleted
            .get(entity)
            .map(|ids| {
                ids.iter()
                    .filter(|(_, at)| *at > since)
                    .map(|(id, _)| *id)
                    .collect()
            })
            .unwrap_or_default();

        CacheChanges {
            rows,
            deleted,
            reset: false,
        }
    }

    /// Insert or replace a row (matched by `RowId`), stamping it as changed now.
    pub fn upsert(&mut self, entity: &str, data: Value) {
        let row = StoredRow {
            data,
            modified: Utc::now(),
        };
        let rows = self.tables.entry(entity.to_string()).or_default();

        match row
            .row_id()
            .and_then(|id| rows.iter().position(|r| r.row_id() == Some(id)))
        {
            Some(pos) => rows[pos] = row,
            None => rows.push(row),
        }
    }

    /// Delete a row by `RowId`. Returns true if a row was removed.
    pub fn delete(&mut self, entity: &str, row_id: i32) -> bool {
        let Some(rows) = self.tables.get_mut(entity) else {
            return false;
        };

        let before = rows.len();
        rows.retain(|r| r.row_id() != Some(i64::from(row_id)));
        if rows.len() == before {
            return false;
        }

        self.deleted
            .entry(entity.to_string())
            .or_default()
            .push((row_id, Utc::now()));
        true
    }
}

fn filter_matches(filter: &QueryFilter, row: &Value) -> bool {
    match (filter.field_type, row.get(&filter.field)) {
        (FieldType::Int, Some(Value::Number(n))) => filter
            .value
            .parse::<i64>()
            .is_ok_and(|v| n.as_i64() == Some(v)),
        (FieldType::String, Some(Value::String(s))) => *s == filter.value,
        _ => false,
    }
}
