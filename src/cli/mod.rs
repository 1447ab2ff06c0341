//! CLI argument parsing types and lookup dispatch.
//!
//! This module provides the command-line interface structure for the erplookup binary.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    Debtor, DebtorOrderLine, ErpClient, ErpError, GetByKeyStr, GetByRowId, HasKeyStr, HasRowId,
    InvItem, Result,
};

/// ERP lookup command-line interface.
#[derive(Parser, Debug)]
#[command(name = "erplookup", about = "ERP entity lookup and cache CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of pretty-printed text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by row id or key.
    Get {
        /// The type of entity to get.
        entity: Entity,

        #[command(flatten)]
        id: LookupId,
    },

    /// Load or refresh an entity cache and print its contents.
    Cache {
        /// The type of entity whose cache to refresh.
        entity: Entity,

        /// Only refresh the cache and report the row count.
        #[arg(long)]
        refresh_only: bool,
    },
}

/// How to identify the entity in a `get` command.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct LookupId {
    /// Integer row id.
    #[arg(long)]
    pub row_id: Option<i32>,

    /// Key string (account or item number).
    #[arg(long)]
    pub key: Option<String>,
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A debtor (customer) account.
    #[value(alias = "debtors")]
    Debtor,
    /// An inventory item.
    #[value(aliases = ["inv-items", "item", "items"])]
    InvItem,
    /// A debtor order line.
    #[value(alias = "order-lines")]
    OrderLine,
}

impl Entity {
    /// Human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Debtor => "debtor",
            Entity::InvItem => "item",
            Entity::OrderLine => "order line",
        }
    }
}

/// A record found by a `get` command.
#[derive(Debug, Clone)]
pub enum Found {
    Debtor(Debtor),
    InvItem(InvItem),
    OrderLine(DebtorOrderLine),
}

/// Run the lookup a `get` command asks for.
///
/// Returns `Ok(None)` when nothing, or more than one record, matches.
///
/// # Errors
///
/// Returns [`ErpError::InvalidArgument`] for a key lookup of an entity
/// without a key string, and client errors unchanged.
pub async fn lookup(client: &ErpClient, entity: &Entity, id: &LookupId) -> Result<Option<Found>> {
    match entity {
        Entity::Debtor => Ok(lookup_keyed::<Debtor>(client, id).await?.map(Found::Debtor)),
        Entity::InvItem => Ok(lookup_keyed::<InvItem>(client, id).await?.map(Found::InvItem)),
        Entity::OrderLine => {
            let row_id = id.row_id.ok_or_else(|| {
                ErpError::InvalidArgument("order lines can only be looked up by --row-id".to_string())
            })?;
            Ok(DebtorOrderLine::get_by_row_id(client, row_id)
                .await?
                .map(Found::OrderLine))
        }
    }
}

async fn lookup_keyed<T>(client: &ErpClient, id: &LookupId) -> Result<Option<T>>
where
    T: HasRowId + HasKeyStr,
{
    match (id.row_id, id.key.as_deref()) {
        (Some(row_id), _) => T::get_by_row_id(client, row_id).await,
        (None, Some(key)) => T::get_by_key_str(client, key).await,
        (None, None) => Err(ErpError::InvalidArgument(
            "either --row-id or --key is required".to_string(),
        )),
    }
}
