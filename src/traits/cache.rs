//! Get-and-refresh access to an entity type's local cache.

use async_trait::async_trait;

use crate::api::QueryApi;
use crate::entity::Entity;

/// Bring an entity type's cache up to date before using it.
///
/// Both methods follow the same steps: if the company already has a cache
/// for the type, ask the client for an incremental update; then, if the
/// client still holds no cache handle, load the cache in full.
///
/// Incremental updates compare change stamps between this machine and the
/// server, so they only work when both clocks agree. Nothing here tries to
/// compensate for clock drift.
#[async_trait]
pub trait CacheRefresh: Entity {
    /// Refresh (or load) this type's cache and return its handle.
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged if the update or load fails.
    #[tracing::instrument(skip(client), fields(entity = %Self::ENTITY_TYPE))]
    async fn get_and_refresh_cache<C>(client: &C) -> Result<C::Cache, C::Error>
    where
        C: QueryApi,
    {
        let entity_type = Self::ENTITY_TYPE;

        if client.has_cache(entity_type) {
            tracing::debug!("cache registered, requesting update");
            client.update_cache(&[entity_type]).await?;
        }

        match client.get_cache(entity_type) {
            Some(cache) => Ok(cache),
            None => {
                tracing::debug!("no cache handle, loading");
                client.load_cache(entity_type).await
            }
        }
    }

    /// Refresh (or load) this type's cache without returning a handle.
    ///
    /// Use this before reading references on already fetched records that
    /// resolve through the cache, such as the item of a
    /// [`crate::DebtorOrderLine`].
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged if the update or load fails.
    #[tracing::instrument(skip(client), fields(entity = %Self::ENTITY_TYPE))]
    async fn refresh_cache<C>(client: &C) -> Result<(), C::Error>
    where
        C: QueryApi,
    {
        let entity_type = Self::ENTITY_TYPE;

        if client.has_cache(entity_type) {
            tracing::debug!("cache registered, requesting update");
            client.update_cache(&[entity_type]).await?;
        }

        if client.get_cache(entity_type).is_none() {
            tracing::debug!("no cache handle, loading");
            client.load_cache(entity_type).await?;
        }

        Ok(())
    }
}

impl<T: Entity> CacheRefresh for T {}
