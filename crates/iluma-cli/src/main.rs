mod cart;
mod catalog;
mod checkout;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use iluma_backend::{BackendClient, TelegramNotifier};
use iluma_catalog::{CatalogService, CatalogSettings, CheckoutService, DEFAULT_SIMILAR_LIMIT};
use iluma_core::Highlight;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cart::{CartCommands, WishlistCommands};
use crate::checkout::CheckoutArgs;
use crate::store::LocalStore;

#[derive(Debug, Parser)]
#[command(name = "iluma-cli")]
#[command(about = "iluma storefront command line interface")]
struct Cli {
    /// Directory holding the local cart and wishlist
    #[arg(long, global = true, env = "ILUMA_STORE_DIR", default_value = ".iluma")]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List one category with filters, sort and paging
    Catalog {
        /// terea, iqos or devices; anything else lists terea
        category: String,
        /// Filter as key=value; repeat for several filters
        #[arg(long = "filter", value_parser = catalog::parse_filter)]
        filters: Vec<(String, String)>,
        /// price-asc, price-desc, name-asc or name-desc
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "12")]
        per_page: usize,
    },
    /// Show one product by ref, id or name slug
    Product { slug: String },
    /// Suggest other in-stock products of a category
    Similar {
        product_id: String,
        category: String,
        #[arg(long, default_value_t = DEFAULT_SIMILAR_LIMIT)]
        limit: usize,
    },
    /// In-stock products flagged as bestsellers, across every category
    Bestsellers {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// In-stock products flagged as new arrivals, across every category
    NewProducts {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Validate and print the filter facets file
    Facets {
        #[arg(long, env = "ILUMA_FACETS_PATH", default_value = "config/facets.yaml")]
        path: PathBuf,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Manage the local wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },
    /// Re-check stock and place an order for the cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Deliver instead of pickup; requires --city and --address
        #[arg(long, requires_all = ["city", "address"])]
        delivery: bool,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

struct Services {
    catalog: CatalogService,
    checkout: CheckoutService,
}

/// Builds the upstream-facing services from the environment.
fn build_services() -> anyhow::Result<Services> {
    let config = iluma_core::load_app_config()?;
    let backend = BackendClient::from_config(&config)?;
    let notifier = config
        .telegram
        .clone()
        .map(|telegram| TelegramNotifier::new(telegram, config.backend_timeout()))
        .transpose()?;
    Ok(Services {
        catalog: CatalogService::new(backend.clone(), CatalogSettings::from_config(&config)),
        checkout: CheckoutService::from_config(backend, notifier, &config),
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // stdout carries JSON; logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = LocalStore::open(&cli.store_dir);
    let Some(command) = cli.command else {
        println!("iluma-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Catalog {
            category,
            filters,
            sort,
            page,
            per_page,
        } => {
            let query = catalog::build_query(&category, &filters, sort.as_deref(), page, per_page)?;
            let services = build_services()?;
            print_json(&catalog::run_catalog(&services.catalog, &query).await)?;
        }
        Commands::Product { slug } => {
            let services = build_services()?;
            print_json(catalog::run_product(&services.catalog, &slug).await?.as_ref())?;
        }
        Commands::Similar {
            product_id,
            category,
            limit,
        } => {
            let services = build_services()?;
            let similar =
                catalog::run_similar(&services.catalog, &product_id, &category, limit).await?;
            print_json(&similar)?;
        }
        Commands::Bestsellers { limit } => {
            let services = build_services()?;
            print_json(
                &catalog::run_highlighted(&services.catalog, Highlight::Bestsellers, limit).await,
            )?;
        }
        Commands::NewProducts { limit } => {
            let services = build_services()?;
            print_json(
                &catalog::run_highlighted(&services.catalog, Highlight::NewProducts, limit).await,
            )?;
        }
        Commands::Facets { path } => print_json(&catalog::run_facets(&path)?)?,
        Commands::Cart {
            command: CartCommands::Add { slug, variant, qty },
        } => {
            let services = build_services()?;
            print_json(&cart::add_to_cart(&store, &services.catalog, &slug, variant, qty).await?)?;
        }
        Commands::Cart { command } => print_json(&cart::run_local_cart(&store, &command)?)?,
        Commands::Wishlist {
            command: WishlistCommands::Add { slug },
        } => {
            let services = build_services()?;
            print_json(&cart::add_to_wishlist(&store, &services.catalog, &slug).await?)?;
        }
        Commands::Wishlist { command } => {
            print_json(&cart::run_local_wishlist(&store, &command)?)?;
        }
        Commands::Checkout {
            name,
            phone,
            delivery,
            city,
            address,
        } => {
            let services = build_services()?;
            let args = CheckoutArgs {
                name,
                phone,
                delivery,
                city,
                address,
            };
            print_json(
                &checkout::run_checkout(&store, &services.catalog, &services.checkout, args).await?,
            )?;
        }
    }

    Ok(())
}
