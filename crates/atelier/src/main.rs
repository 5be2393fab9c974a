//! Atelier CLI - product photo intake and gallery management.
//!
//! Uploads product photos into per-product galleries (three JPEG variants
//! per photo), keeps gallery order and cover photo consistent, and stores
//! landing-page hero and logo images. State is kept as JSON in the storage
//! root, so every invocation picks up where the last one left off.
//!
//! # Usage
//!
//! ```bash
//! # Register an atelier and a product
//! atelier catalog add-atelier --atelier 1 --user 7
//! atelier catalog add-product --product 3 --atelier 1
//!
//! # Upload photos and inspect the gallery
//! atelier photos upload --product 3 --user 7 front.jpg back.png
//! atelier photos list --product 3
//!
//! # View configuration
//! atelier config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Atelier - product photo intake and gallery management.
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "ATELIER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload, list and arrange product photos
    Photos(cli::photos::PhotosArgs),

    /// Upload landing-page hero and logo images
    Lp(cli::lp::LpArgs),

    /// Register ateliers and products
    Catalog(cli::catalog::CatalogArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::state::load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `atelier config path`."
            );
            atelier_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Atelier v{}", atelier_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Photos(args) => cli::photos::execute(args, config).await,
        Commands::Lp(args) => cli::lp::execute(args, config).await,
        Commands::Catalog(args) => cli::catalog::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config_path).await,
    }
}
