//! Fetch a single entity by row id.

use async_trait::async_trait;

use crate::api::QueryApi;
use crate::entity::{HasRowId, ROW_ID_FIELD};
use crate::filter::QueryFilter;

use super::single_or_none;

/// Fetch a single entity by its integer row id.
///
/// The ERP API has no direct "get" call, so this issues a query with one
/// equality filter on the `RowId` field and keeps the only match.
///
/// If the backend table has no row id column, the query engine ignores the
/// filter and returns every record; the result is then `Some` only when the
/// table holds exactly one record. This is how the engine behaves and is not
/// corrected here.
///
/// # Example
///
/// ```ignore
/// use erplookup::{Debtor, ErpClient, GetByRowId};
///
/// let client = ErpClient::from_env()?;
/// if let Some(debtor) = Debtor::get_by_row_id(&client, 1042).await? {
///     println!("{}", debtor.name);
/// }
/// ```
#[async_trait]
pub trait GetByRowId: HasRowId {
    /// Fetch the record with `row_id`.
    ///
    /// Returns `Ok(None)` when no record, or more than one record, matches.
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged if the query fails.
    #[tracing::instrument(skip(client), fields(entity = %Self::ENTITY_TYPE))]
    async fn get_by_row_id<C>(client: &C, row_id: i32) -> Result<Option<Self>, C::Error>
    where
        C: QueryApi,
    {
        let filters = [QueryFilter::int(ROW_ID_FIELD, row_id)];
        let rows = client.query::<Self>(&filters).await?;
        Ok(single_or_none(Self::ENTITY_TYPE, rows))
    }
}

impl<T: HasRowId> GetByRowId for T {}
