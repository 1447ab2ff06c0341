//! Fetch a single entity by key string.

use async_trait::async_trait;

use crate::api::QueryApi;
use crate::entity::HasKeyStr;
use crate::filter::QueryFilter;

use super::single_or_none;

/// Fetch a single entity by its key string.
///
/// Same contract as [`crate::GetByRowId`], filtering on
/// [`HasKeyStr::KEY_FIELD`] instead.
#[async_trait]
pub trait GetByKeyStr: HasKeyStr {
    /// Fetch the record whose key equals `key`.
    ///
    /// Returns `Ok(None)` when no record, or more than one record, matches.
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged if the query fails.
    #[tracing::instrument(skip(client), fields(entity = %Self::ENTITY_TYPE))]
    async fn get_by_key_str<C>(client: &C, key: &str) -> Result<Option<Self>, C::Error>
    where
        C: QueryApi,
    {
        let filters = [QueryFilter::string(Self::KEY_FIELD, key)];
        let rows = client.query::<Self>(&filters).await?;
        Ok(single_or_none(Self::ENTITY_TYPE, rows))
    }
}

impl<T: HasKeyStr> GetByKeyStr for T {}
