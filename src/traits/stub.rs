//! In-process `QueryApi` used by the helper tests.
//!
//! Holds rows as JSON per entity type, applies equality filters the way the
//! gateway does (filters on unknown fields are ignored) and counts every call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::api::QueryApi;
use crate::entity::{Entity, EntityType, HasKeyStr, HasRowId};
use crate::filter::{FieldType, QueryFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum StubError {
    #[error("backend unavailable")]
    Unavailable,
    #[error("not authorized")]
    Unauthorized,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Widget {
    pub row_id: i32,
    pub key_str: String,
}

impl Widget {
    pub fn json(row_id: i32, key: &str) -> Value {
        serde_json::json!({"RowId": row_id, "KeyStr": key})
    }
}

impl Entity for Widget {
    const ENTITY_TYPE: EntityType = EntityType::new("Widget");
}

impl HasRowId for Widget {
    fn row_id(&self) -> i32 {
        self.row_id
    }
}

impl HasKeyStr for Widget {
    fn key_str(&self) -> &str {
        &self.key_str
    }
}

/// Declares a row id but its table has no such column.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Memo {
    #[serde(default)]
    pub row_id: i32,
    pub text: String,
}

impl Entity for Memo {
    const ENTITY_TYPE: EntityType = EntityType::new("Memo");
}

impl HasRowId for Memo {
    fn row_id(&self) -> i32 {
        self.row_id
    }
}

/// Snapshot handed out as the stub's cache handle.
pub(crate) type StubCache = Arc<Vec<Value>>;

#[derive(Default)]
pub(crate) struct StubApi {
    tables: HashMap<EntityType, Vec<Value>>,
    caches: Mutex<HashMap<EntityType, StubCache>>,
    last_filters: Mutex<Vec<QueryFilter>>,
    failure: Option<StubError>,
    drop_on_update: bool,
    query_calls: AtomicUsize,
    update_calls: AtomicUsize,
    get_cache_calls: AtomicUsize,
    load_calls: AtomicUsize,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, entity_type: EntityType, rows: Vec<Value>) -> Self {
        self.tables.insert(entity_type, rows);
        self
    }

    /// Register a cache holding `rows` before any helper runs.
    pub fn with_cache(self, entity_type: EntityType, rows: Vec<Value>) -> Self {
        self.caches
            .lock()
            .unwrap()
            .insert(entity_type, Arc::new(rows));
        self
    }

    /// Every remote call fails with `error`.
    pub fn failing(mut self, error: StubError) -> Self {
        self.failure = Some(error);
        self
    }

    /// `update_cache` unregisters the cache instead of refreshing it.
    pub fn dropping_cache_on_update(mut self) -> Self {
        self.drop_on_update = true;
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn get_cache_calls(&self) -> usize {
        self.get_cache_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn last_filters(&self) -> Vec<QueryFilter> {
        self.last_filters.lock().unwrap().clone()
    }

    /// Current cache contents without counting as a `get_cache` call.
    pub fn peek_cache(&self, entity_type: EntityType) -> Option<StubCache> {
        self.caches.lock().unwrap().get(&entity_type).cloned()
    }

    fn table(&self, entity_type: EntityType) -> Vec<Value> {
        self.tables.get(&entity_type).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<(), StubError> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn matches(filter: &QueryFilter, row: &Value) -> bool {
    match (filter.field_type, row.get(&filter.field)) {
        (FieldType::Int, Some(Value::Number(n))) => {
            n.as_i64().map(|n| n.to_string()) == Some(filter.value.clone())
        }
        (FieldType::String, Some(Value::String(s))) => *s == filter.value,
        _ => false,
    }
}

#[async_trait]
impl QueryApi for StubApi {
    type Error = StubError;
    type Cache = StubCache;

    async fn query<T: Entity>(&self, filters: &[QueryFilter]) -> Result<Vec<T>, StubError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filters.lock().unwrap() = filters.to_vec();
        self.check()?;

        let rows = self.table(T::ENTITY_TYPE);
        let known: Vec<&QueryFilter> = filters
            .iter()
            .filter(|f| rows.iter().any(|r| r.get(&f.field).is_some()))
            .collect();

        Ok(rows
            .into_iter()
            .filter(|row| known.iter().all(|f| matches(f, row)))
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }

    fn has_cache(&self, entity_type: EntityType) -> bool {
        self.caches.lock().unwrap().contains_key(&entity_type)
    }

    async fn update_cache(&self, entity_types: &[EntityType]) -> Result<(), StubError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut caches = self.caches.lock().unwrap();
        for ty in entity_types {
            if self.drop_on_update {
                caches.remove(ty);
            } else if caches.contains_key(ty) {
                caches.insert(*ty, Arc::new(self.table(*ty)));
            }
        }
        Ok(())
    }

    fn get_cache(&self, entity_type: EntityType) -> Option<StubCache> {
        self.get_cache_calls.fetch_add(1, Ordering::SeqCst);
        self.peek_cache(entity_type)
    }

    async fn load_cache(&self, entity_type: EntityType) -> Result<StubCache, StubError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let cache = Arc::new(self.table(entity_type));
        self.caches
            .lock()
            .unwrap()
            .insert(entity_type, cache.clone());
        Ok(cache)
    }
}
