//! The query/cache client contract the lookup helpers are written against.

use async_trait::async_trait;

use crate::entity::{Entity, EntityType};
use crate::filter::QueryFilter;

/// A client for an ERP query API with a per-company entity cache.
///
/// [`crate::ErpClient`] implements this against the HTTP gateway; tests and
/// alternative backends can provide their own implementation. The helper
/// traits in [`crate::traits`] only ever call these methods, and propagate
/// `Self::Error` untouched.
///
/// Implementations own all synchronization of their cache state; the helpers
/// take no locks of their own.
#[async_trait]
pub trait QueryApi: Send + Sync {
    /// Error raised by remote calls.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Handle to one entity type's cache.
    type Cache: Send;

    /// Run a filtered query.
    ///
    /// An empty filter list, or a filter on a field the entity table does not
    /// have, yields the unfiltered result set.
    async fn query<T: Entity>(&self, filters: &[QueryFilter]) -> Result<Vec<T>, Self::Error>;

    /// Whether the current company has a cache registered for `entity_type`.
    fn has_cache(&self, entity_type: EntityType) -> bool;

    /// Incrementally refresh the already registered caches of `entity_types`.
    async fn update_cache(&self, entity_types: &[EntityType]) -> Result<(), Self::Error>;

    /// The current cache handle for `entity_type`, if one is registered.
    fn get_cache(&self, entity_type: EntityType) -> Option<Self::Cache>;

    /// Fully load the cache for `entity_type` and return its handle.
    async fn load_cache(&self, entity_type: EntityType) -> Result<Self::Cache, Self::Error>;
}
