//! Audio output and MIDI input listing.

use clap::Args;
use picopoly_io::{default_output_device, list_midi_ports, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// List audio outputs only
    #[arg(long, conflicts_with = "midi")]
    audio: bool,

    /// List MIDI inputs only
    #[arg(long)]
    midi: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    if !args.midi {
        list_audio()?;
    }
    if !args.audio {
        list_midi();
    }

    println!("Tip: Use an index or partial name with --device/--midi-port:");
    println!("  picopoly play --device 0 --midi-port \"Keystation\"");
    Ok(())
}

fn list_audio() -> anyhow::Result<()> {
    let devices = list_output_devices()?;
    let default_name = default_output_device()?.map(|d| d.name);

    println!("Audio Outputs");
    println!("=============");
    if devices.is_empty() {
        println!("  (none)");
    }
    for (idx, device) in devices.iter().enumerate() {
        let marker = if default_name.as_deref() == Some(device.name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        );
    }
    println!();
    Ok(())
}

fn list_midi() {
    println!("MIDI Inputs");
    println!("===========");
    match list_midi_ports() {
        Ok(ports) if ports.is_empty() => println!("  (none)"),
        Ok(ports) => {
            for port in ports {
                println!("  [{}] {}", port.index, port.name);
            }
        }
        Err(e) => println!("  unavailable: {}", e),
    }
    println!();
}
