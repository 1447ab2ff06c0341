//! Company (tenant) context and its cache registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::cache::EntityCache;
use crate::entity::EntityType;

/// The company a client queries against, along with the caches loaded for
/// it.
///
/// The registry hands out `Arc` snapshots; storing a new cache for a type
/// replaces the registered snapshot without touching handles already given
/// out.
#[derive(Debug)]
pub struct Company {
    id: u32,
    name: Option<String>,
    caches: RwLock<HashMap<EntityType, Arc<EntityCache>>>,
}

impl Company {
    /// Create a company context with an empty cache registry.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The company id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The company display name, if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a cache is registered for `entity_type`.
    pub fn has_cache(&self, entity_type: EntityType) -> bool {
        self.caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&entity_type)
    }

    /// The registered cache for `entity_type`.
    pub fn cache(&self, entity_type: EntityType) -> Option<Arc<EntityCache>> {
        self.caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity_type)
            .cloned()
    }

    /// Register `cache`, replacing any snapshot for the same type.
    pub fn store(&self, cache: EntityCache) -> Arc<EntityCache> {
        let cache = Arc::new(cache);
        self.caches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache.entity_type(), cache.clone());
        cache
    }

    /// Unregister the cache for `entity_type`.
    pub fn evict(&self, entity_type: EntityType) -> Option<Arc<EntityCache>> {
        self.caches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&entity_type)
    }

    /// Entity types with a registered cache, sorted by name.
    pub fn cached_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ITEMS: EntityType = EntityType::new("InvItem");

    #[test]
    fn test_store_and_evict() {
        let company = Company::new(7).with_name("Demo ApS");
        assert!(!company.has_cache(ITEMS));

        let stored = company.store(EntityCache::new(ITEMS, vec![], Utc::now()));
        assert!(company.has_cache(ITEMS));
        assert!(Arc::ptr_eq(&stored, &company.cache(ITEMS).unwrap()));
        assert_eq!(company.cached_types(), vec![ITEMS]);

        company.evict(ITEMS);
        assert!(!company.has_cache(ITEMS));
        assert!(company.cache(ITEMS).is_none());
        assert_eq!(company.name(), Some("Demo ApS"));
    }

    #[test]
    fn test_store_replaces_snapshot() {
        let company = Company::new(1);
        let first = company.store(EntityCache::new(ITEMS, vec![], Utc::now()));
        let second = company.store(EntityCache::new(
            ITEMS,
            vec![serde_json::json!({"RowId": 1})],
            Utc::now(),
        ));

        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
        assert_eq!(company.cache(ITEMS).map(|c| c.len()), Some(1));
    }
}
