//! Picopoly CLI - render, play and inspect the picopoly synthesizer.

mod commands;
mod score;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "picopoly")]
#[command(author, version, about = "Picopoly polyphonic synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note or a score to a WAV file
    Render(commands::render::RenderArgs),

    /// Play in real time from a MIDI input
    Play(commands::play::PlayArgs),

    /// List the patch bank
    Presets(commands::presets::PresetsArgs),

    /// List audio outputs and MIDI inputs
    Devices(commands::devices::DevicesArgs),

    /// Print or write the default configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
