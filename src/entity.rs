//! Entity identity and capability traits.
//!
//! An [`Entity`] is any record type the ERP query API can return. The
//! capability traits [`HasRowId`] and [`HasKeyStr`] declare which identifier
//! fields a type exposes, and gate the typed lookups in [`crate::traits`].

use std::fmt;

use serde::de::DeserializeOwned;

/// Name of an entity table on the ERP backend (e.g. `"Debtor"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType(&'static str);

impl EntityType {
    /// Create an entity type from its table name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The table name as sent on the wire.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Field every entity table is keyed by, both for row id filters and for
/// merging cache changes.
pub(crate) const ROW_ID_FIELD: &str = "RowId";

/// A record type that can be queried and cached through a [`crate::QueryApi`].
pub trait Entity: DeserializeOwned + Send + 'static {
    /// The backend table this type is read from.
    const ENTITY_TYPE: EntityType;
}

/// Entities identified by an integer row id.
pub trait HasRowId: Entity {
    /// The row id of this record.
    fn row_id(&self) -> i32;
}

/// Entities identified by a string key.
pub trait HasKeyStr: Entity {
    /// Field name used when filtering by key.
    const KEY_FIELD: &'static str = "KeyStr";

    /// The key string of this record.
    fn key_str(&self) -> &str;
}
