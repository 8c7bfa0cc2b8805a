mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use medrush_core::{Catalog, ItemId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "medrush-cli")]
#[command(about = "Query the MedRush pharmacy catalog from the command line")]
struct Cli {
    /// Seed catalog with medicines and pharmacies
    #[arg(
        long,
        global = true,
        env = "MEDRUSH_CATALOG_PATH",
        default_value = "./config/catalog.yaml"
    )]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every pharmacy by distance from a point, nearest first
    Rank {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Find the nearest open pharmacy stocking every listed item
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Medicine id required in stock; repeat for each item
        #[arg(long = "item")]
        items: Vec<ItemId>,
    },
    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommands {
    /// Load and validate the catalog, then print a summary
    Check,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(std::env::var("MEDRUSH_LOG_LEVEL").unwrap_or_else(|_| "warn".into()))
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();

    match cli.command {
        Some(Commands::Rank { lat, lng }) => {
            let catalog = load_catalog(&cli.catalog)?;
            commands::run_rank(&catalog, lat, lng, &mut out)
        }
        Some(Commands::Nearest { lat, lng, items }) => {
            let catalog = load_catalog(&cli.catalog)?;
            commands::run_nearest(&catalog, lat, lng, &items, &mut out)
        }
        Some(Commands::Catalog {
            command: CatalogCommands::Check,
        }) => {
            let catalog = load_catalog(&cli.catalog)?;
            commands::run_catalog_check(&catalog, &mut out)
        }
        None => {
            println!("no command given; try `medrush-cli --help`");
            Ok(())
        }
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let catalog = medrush_core::load_catalog(path)
        .with_context(|| format!("failed to load catalog from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        medicines = catalog.medicines.len(),
        pharmacies = catalog.pharmacies.len(),
        "catalog loaded"
    );
    Ok(catalog)
}
