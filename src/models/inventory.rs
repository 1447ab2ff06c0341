//! Inventory item and order line models.

use serde::{Deserialize, Serialize};

use crate::api::QueryApi;
use crate::cache::EntityCache;
use crate::entity::{Entity, EntityType, HasKeyStr, HasRowId};
use crate::filter::QueryFilter;

/// An inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvItem {
    /// Row id.
    pub row_id: i32,

    /// Item number.
    #[serde(rename = "KeyStr", alias = "Item")]
    pub item: String,

    /// Item name.
    #[serde(default)]
    pub name: String,

    /// Unit of measure.
    #[serde(default)]
    pub unit: Option<String>,

    /// Sales price per unit.
    #[serde(default)]
    pub sales_price: Option<f64>,

    /// Cost price per unit.
    #[serde(default)]
    pub cost_price: Option<f64>,

    /// Quantity on stock.
    #[serde(default)]
    pub qty_on_stock: f64,

    /// Whether the item is blocked for sale.
    #[serde(default)]
    pub blocked: bool,
}

impl Entity for InvItem {
    const ENTITY_TYPE: EntityType = EntityType::new("InvItem");
}

impl HasRowId for InvItem {
    fn row_id(&self) -> i32 {
        self.row_id
    }
}

impl HasKeyStr for InvItem {
    fn key_str(&self) -> &str {
        &self.item
    }
}

/// A line on a debtor (sales) order.
///
/// The line only carries the item number; the [`InvItem`] itself is resolved
/// through the item cache, so refresh that cache before calling
/// [`DebtorOrderLine::inv_item`].
///
/// # Example
///
/// ```ignore
/// use erplookup::{CacheRefresh, DebtorOrderLine, InvItem};
///
/// let lines = DebtorOrderLine::for_order(&client, 5001).await?;
/// let items = InvItem::get_and_refresh_cache(&client).await?;
/// for line in &lines {
///     println!("{:?}", line.inv_item(&items).map(|i| i.name));
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DebtorOrderLine {
    /// Row id.
    pub row_id: i32,

    /// Number of the order this line belongs to.
    pub order_number: i32,

    /// Position of the line on the order.
    #[serde(default)]
    pub line_number: f64,

    /// Item number, if the line references an item.
    #[serde(default)]
    pub item: Option<String>,

    /// Free-text line description.
    #[serde(default)]
    pub text: Option<String>,

    /// Quantity.
    #[serde(default)]
    pub qty: f64,

    /// Unit price.
    #[serde(default)]
    pub price: f64,
}

impl DebtorOrderLine {
    /// Line amount before discounts.
    pub fn amount(&self) -> f64 {
        self.qty * self.price
    }

    /// Resolve the line's item from an item cache.
    ///
    /// Returns `None` if the line has no item, or the cache does not
    /// (yet) hold it.
    pub fn inv_item(&self, items: &EntityCache) -> Option<InvItem> {
        self.item
            .as_deref()
            .and_then(|item| items.get_by_key::<InvItem>(item))
    }

    /// Fetch all lines of an order.
    ///
    /// # Errors
    ///
    /// Returns the client's error unchanged if the query fails.
    #[tracing::instrument(skip(client))]
    pub async fn for_order<C>(client: &C, order_number: i32) -> Result<Vec<Self>, C::Error>
    where
        C: QueryApi,
    {
        let filters = [QueryFilter::int("OrderNumber", order_number)];
        client.query::<Self>(&filters).await
    }
}

impl Entity for DebtorOrderLine {
    const ENTITY_TYPE: EntityType = EntityType::new("DebtorOrderLine");
}

impl HasRowId for DebtorOrderLine {
    fn row_id(&self) -> i32 {
        self.row_id
    }
}
