//! ERP lookup CLI binary.
//!
//! A command-line interface for single-entity lookups and cache refreshes
//! against the ERP query gateway.

use clap::Parser;
use erplookup::cli::{lookup, Cli, Command, Entity, Found, LookupId};
use erplookup::Entity as _;
use erplookup::{
    CacheRefresh, Debtor, DebtorOrderLine, EntityCache, ErpClient, InvItem, PrettyPrint, QueryApi,
};
use serde::Serialize;
use std::process::ExitCode;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match ErpClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set ERP_API_KEY and ERP_COMPANY_ID environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when a lookup found nothing.
async fn run(client: &ErpClient, cli: Cli) -> erplookup::Result<bool> {
    match cli.command {
        Command::Get { entity, id } => handle_get(client, entity, id, cli.json).await,
        Command::Cache {
            entity,
            refresh_only,
        } => {
            handle_cache(client, entity, refresh_only, cli.json).await?;
            Ok(true)
        }
    }
}

async fn handle_get(
    client: &ErpClient,
    entity: Entity,
    id: LookupId,
    json: bool,
) -> erplookup::Result<bool> {
    let what = entity.label();
    match lookup(client, &entity, &id).await? {
        None => {
            eprintln!("{what} not found");
            Ok(false)
        }
        Some(Found::Debtor(debtor)) => output_single(&debtor, json),
        Some(Found::InvItem(item)) => output_single(&item, json),
        Some(Found::OrderLine(line)) => output_single(&line, json),
    }
}

async fn handle_cache(
    client: &ErpClient,
    entity: Entity,
    refresh_only: bool,
    json: bool,
) -> erplookup::Result<()> {
    if refresh_only {
        let entity_type = match entity {
            Entity::Debtor => {
                Debtor::refresh_cache(client).await?;
                Debtor::ENTITY_TYPE
            }
            Entity::InvItem => {
                InvItem::refresh_cache(client).await?;
                InvItem::ENTITY_TYPE
            }
            Entity::OrderLine => {
                DebtorOrderLine::refresh_cache(client).await?;
                DebtorOrderLine::ENTITY_TYPE
            }
        };
        let rows = client.get_cache(entity_type).map(|c| c.len()).unwrap_or(0);
        println!("{entity_type}: {rows} cached rows");
        return Ok(());
    }

    match entity {
        Entity::Debtor => {
            let cache = Debtor::get_and_refresh_cache(client).await?;
            output_cache::<Debtor, DebtorRow>(&cache, json)
        }
        Entity::InvItem => {
            let cache = InvItem::get_and_refresh_cache(client).await?;
            output_cache::<InvItem, ItemRow>(&cache, json)
        }
        Entity::OrderLine => {
            let cache = DebtorOrderLine::get_and_refresh_cache(client).await?;
            output_cache::<DebtorOrderLine, OrderLineRow>(&cache, json)
        }
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> erplookup::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(true)
}

fn output_cache<T, R>(cache: &EntityCache, json: bool) -> erplookup::Result<()>
where
    T: erplookup::Entity + Serialize,
    R: Tabled + for<'a> From<&'a T>,
{
    let rows: Vec<T> = cache.rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let table_rows: Vec<R> = rows.iter().map(R::from).collect();
        println!("{}", Table::new(table_rows));
        println!(
            "\n{} rows, loaded {}",
            cache.len(),
            cache.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct DebtorRow {
    #[tabled(rename = "row id")]
    row_id: i32,
    account: String,
    name: String,
    country: String,
}

impl From<&Debtor> for DebtorRow {
    fn from(d: &Debtor) -> Self {
        Self {
            row_id: d.row_id,
            account: d.account.clone(),
            name: d.name.clone(),
            country: d.country.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "row id")]
    row_id: i32,
    item: String,
    name: String,
    #[tabled(rename = "on stock")]
    on_stock: f64,
}

impl From<&InvItem> for ItemRow {
    fn from(i: &InvItem) -> Self {
        Self {
            row_id: i.row_id,
            item: i.item.clone(),
            name: i.name.clone(),
            on_stock: i.qty_on_stock,
        }
    }
}

#[derive(Tabled)]
struct OrderLineRow {
    #[tabled(rename = "row id")]
    row_id: i32,
    order: i32,
    item: String,
    qty: f64,
    amount: String,
}

impl From<&DebtorOrderLine> for OrderLineRow {
    fn from(l: &DebtorOrderLine) -> Self {
        Self {
            row_id: l.row_id,
            order: l.order_number,
            item: l.item.clone().unwrap_or_default(),
            qty: l.qty,
            amount: format!("{:.2}", l.amount()),
        }
    }
}
