//! The `atelier lp` command for landing-page images.

use atelier_core::{AtelierId, Config, LpImageKind, UserId};
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::photos::read_upload_file;
use super::state::StateFiles;

/// Arguments for the `lp` command.
#[derive(Args, Debug)]
pub struct LpArgs {
    #[command(subcommand)]
    pub command: LpCommand,
}

/// Landing-page image slot.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Kind {
    Hero,
    Logo,
}

impl From<Kind> for LpImageKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Hero => LpImageKind::Hero,
            Kind::Logo => LpImageKind::Logo,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum LpCommand {
    /// Store a hero or logo image for an atelier
    Upload {
        #[arg(long)]
        atelier: u64,
        #[arg(long)]
        user: u64,
        #[arg(long, value_enum)]
        kind: Kind,
        file: PathBuf,
    },
}

/// Execute the lp command.
pub async fn execute(args: LpArgs, config: Config) -> anyhow::Result<()> {
    let files = StateFiles::new(&config);
    let engine = files.open(config)?;

    match args.command {
        LpCommand::Upload {
            atelier,
            user,
            kind,
            file,
        } => {
            let atelier = engine.atelier(AtelierId(atelier))?;
            let upload = read_upload_file(&file)?;
            let image = engine
                .upload_lp_image(&atelier, UserId(user), kind.into(), upload)
                .await?;
            println!("{}", serde_json::to_string_pretty(&image)?);
        }
    }

    Ok(())
}
