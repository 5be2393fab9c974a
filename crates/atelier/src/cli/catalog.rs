//! The `atelier catalog` command for registering ateliers and products.

use atelier_core::{AtelierId, Config, ProductId, UserId};
use clap::{Args, Subcommand};

use super::state::StateFiles;

/// Arguments for the `catalog` command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Register an atelier and its owning user
    AddAtelier {
        #[arg(long)]
        atelier: u64,
        #[arg(long)]
        user: u64,
    },

    /// Register a product under an atelier
    AddProduct {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        atelier: u64,
    },

    /// Print the catalog as JSON
    Show,
}

/// Execute the catalog command.
pub async fn execute(args: CatalogArgs, config: Config) -> anyhow::Result<()> {
    let files = StateFiles::new(&config);
    let mut catalog = files.load_catalog()?;

    match args.command {
        CatalogCommand::AddAtelier { atelier, user } => {
            let atelier = catalog.add_atelier(AtelierId(atelier), UserId(user));
            files.save_catalog(&catalog)?;
            tracing::info!("Atelier {} owned by user {}", atelier.id, atelier.user_id);
        }

        CatalogCommand::AddProduct { product, atelier } => {
            let product = catalog.add_product(ProductId(product), AtelierId(atelier))?;
            files.save_catalog(&catalog)?;
            tracing::info!("Product {} in atelier {}", product.id, product.atelier_id);
        }

        CatalogCommand::Show => {
            println!("{}", catalog.to_json()?);
        }
    }

    Ok(())
}
