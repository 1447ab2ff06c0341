//! ERP query API lookup and cache helpers.
//!
//! The ERP query API only offers a generic filtered query call and a
//! per-company entity cache. This library layers typed conveniences on top
//! of any client implementing [`QueryApi`]:
//!
//! - [`GetByRowId`] - Fetch a single entity by its integer row id
//! - [`GetByKeyStr`] - Fetch a single entity by its key string
//! - [`CacheRefresh`] - Load or refresh an entity type's cache
//!
//! The traits are implemented for every entity type with the matching
//! capability ([`HasRowId`], [`HasKeyStr`], [`Entity`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use erplookup::{CacheRefresh, Debtor, DebtorOrderLine, ErpClient, GetByKeyStr, InvItem};
//!
//! #[tokio::main]
//! async fn main() -> erplookup::Result<()> {
//!     // Create client from environment variables
//!     let client = ErpClient::from_env()?;
//!
//!     // Look up a debtor by account number
//!     if let Some(debtor) = Debtor::get_by_key_str(&client, "10001").await? {
//!         println!("Debtor: {}", debtor.name);
//!     }
//!
//!     // Resolve order line items through the item cache
//!     let lines = DebtorOrderLine::for_order(&client, 5001).await?;
//!     let items = InvItem::get_and_refresh_cache(&client).await?;
//!     for line in &lines {
//!         let name = line.inv_item(&items).map(|i| i.name);
//!         println!("{:?} x {}", name, line.qty);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Lookups
//!
//! Lookups return `Ok(None)` both when nothing matches and when more than
//! one record matches. Client errors are returned unchanged.
//!
//! # Configuration
//!
//! [`ErpClient::from_env`] reads:
//!
//! - `ERP_API_KEY` (required) - API key for the gateway
//! - `ERP_COMPANY_ID` (required) - Company the client is scoped to
//! - `ERP_API_URL` (optional) - Base URL (defaults to `https://erp.example.com/api`)

mod api;
mod cache;
mod client;
mod company;
mod entity;
mod error;
mod filter;
mod models;
mod output;
mod traits;

pub mod cli;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use api::QueryApi;
pub use cache::{CacheChanges, EntityCache};
pub use client::ErpClient;
pub use company::Company;
pub use entity::{Entity, EntityType, HasKeyStr, HasRowId};
pub use error::{ErpError, Result};
pub use filter::{FieldType, QueryFilter};
pub use output::PrettyPrint;

// Re-export traits
pub use traits::{CacheRefresh, GetByKeyStr, GetByRowId};

// Re-export models
pub use models::{Debtor, DebtorOrderLine, InvItem};
