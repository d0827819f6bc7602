//! Patch bank listing.

use super::common::load_config;
use clap::Args;
use picopoly_config::PatchConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetsArgs {
    /// Configuration file (defaults to the user configuration if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show envelope and vibrato settings
    #[arg(short, long)]
    verbose: bool,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    // validate the bank the engine would load
    config.patch_bank()?;

    let (title, patches) = if config.patches.is_empty() {
        ("Factory Patches", picopoly_config::factory_patch_configs())
    } else {
        ("Configured Patches", config.patches.clone())
    };

    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    for (program, patch) in patches.iter().enumerate() {
        let pitch = if patch.pitch.is_some() { ", pitch env" } else { "" };
        println!(
            "  [{:2}] {:20} {:8} level {:3}{}",
            program, patch.name, patch.waveform, patch.level, pitch
        );
        if args.verbose {
            print_details(patch);
        }
    }
    println!();
    println!("Programs above {} wrap around the bank.", patches.len() - 1);

    Ok(())
}

fn print_details(patch: &PatchConfig) {
    let amp = &patch.amp;
    println!(
        "         amp     A {:3}  D {:3}  S {:3}  R {:3}",
        amp.attack, amp.decay, amp.sustain, amp.release
    );
    if let Some(pitch) = &patch.pitch {
        println!(
            "         pitch   A {:3}  D {:3}  S {:3}  R {:3}  depth {:+}",
            pitch.attack, pitch.decay, pitch.sustain, pitch.release, pitch.depth
        );
    }
    let vib = &patch.vibrato;
    println!(
        "         vibrato {} rate {} depth {}",
        vib.waveform, vib.rate, vib.depth
    );
}
