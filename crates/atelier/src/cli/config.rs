//! The `atelier config` command for configuration management.

use atelier_core::Config;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::state::{load_config, StateFiles};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path and storage root
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command. `path` is the `--config` override, if any.
pub async fn execute(args: ConfigArgs, path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = path.clone().unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show => {
            let config = load_config(path.as_deref())?;
            let toml = config.to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            println!("{}", config_path.display());
            if let Ok(config) = load_config(path.as_deref()) {
                println!("storage: {}", StateFiles::new(&config).root().display());
            }
        }

        ConfigCommand::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    config_path.display()
                );
            }

            // Ensure parent directory exists
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Write default config
            let config = Config::default();
            let toml = config.to_toml()?;
            std::fs::write(&config_path, toml)?;

            tracing::info!("Config file created at: {}", config_path.display());
            println!("Configuration initialized at: {}", config_path.display());
        }
    }

    Ok(())
}
