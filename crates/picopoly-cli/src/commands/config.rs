//! Default configuration output.

use clap::Args;
use picopoly_config::{SynthConfig, default_config_path};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write to FILE instead of printing
    #[arg(short, long, value_name = "FILE")]
    write: Option<PathBuf>,

    /// Write to the user configuration path
    #[arg(long, conflicts_with = "write")]
    user: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,

    /// Show the user configuration path
    #[arg(long, conflicts_with_all = ["write", "user"])]
    path: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    if args.path {
        println!("{}", default_config_path().display());
        return Ok(());
    }

    let config = SynthConfig::factory();
    let target = if args.user {
        Some(default_config_path())
    } else {
        args.write
    };

    let Some(path) = target else {
        print!("{}", config.to_toml()?);
        return Ok(());
    };

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    config.save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
