//! Lookup and cache helpers.
//!
//! Each helper is a trait with default methods, blanket-implemented for every
//! entity type that has the required capability, so callers write
//! `Debtor::get_by_key_str(&client, "10001")` against any [`crate::QueryApi`].

mod cache;
mod key;
mod row_id;

#[cfg(test)]
pub(crate) mod stub;

pub use cache::CacheRefresh;
pub use key::GetByKeyStr;
pub use row_id::GetByRowId;

use crate::entity::EntityType;

/// Reduce a query result to its only element.
///
/// Zero matches and more than one match both give `None`; an ambiguous match
/// is logged but never treated as an error.
pub(crate) fn single_or_none<T>(entity_type: EntityType, rows: Vec<T>) -> Option<T> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (Some(only), None) => Some(only),
        (None, _) => None,
        (Some(_), Some(_)) => {
            tracing::warn!(%entity_type, count, "lookup matched more than one record");
            None
        }
    }
}
