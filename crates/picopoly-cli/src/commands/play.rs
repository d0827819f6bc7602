//! Real-time playback from a MIDI input.

use super::common::load_config;
use clap::Args;
use picopoly_io::{MidiIngest, OutputStage, SynthStream, SynthStreamConfig};
use picopoly_synth::SynthEngine;
use picopoly_synth::queue::heap_event_queue;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Args)]
pub struct PlayArgs {
    /// Configuration file (defaults to the user configuration if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output device (index or partial name); overrides audio.device
    #[arg(short, long)]
    device: Option<String>,

    /// MIDI input port (index or partial name); overrides midi.port
    #[arg(short, long)]
    midi_port: Option<String>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let bank = config.patch_bank()?;
    let sample_rate = config.audio.sample_rate;

    let (producer, consumer) = heap_event_queue(config.midi.queue_capacity);

    let midi_port = args.midi_port.or(config.midi.port.clone());
    let ingest = match MidiIngest::connect(midi_port.as_deref(), producer) {
        Ok(ingest) => Some(ingest),
        // without an explicit port, play on with no input
        Err(e) if midi_port.is_none() => {
            tracing::warn!(error = %e, "no MIDI input, output will be silent");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let engine: SynthEngine = SynthEngine::with_patches(sample_rate, bank);
    let stream_config = SynthStreamConfig {
        sample_rate,
        block_size: config.audio.block_size,
        stage: OutputStage::new(config.audio.output_shift),
        device: args.device.or(config.audio.device.clone()),
    };
    let stream = SynthStream::start(engine, consumer, &stream_config)?;

    println!("Playing {} patch(es)", config.patch_names().len());
    println!("  Output: {} ({} ch)", stream.device_name(), stream.channels());
    match &ingest {
        Some(ingest) => println!("  MIDI in: {}", ingest.port_name()),
        None => println!("  MIDI in: none"),
    }
    println!("  Sample rate: {} Hz", stream.sample_rate());
    println!("  Block size: {} frames", stream_config.block_size);
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    stream.stop();
    if let Some(ingest) = ingest {
        let dropped = ingest.dropped();
        if dropped > 0 {
            println!("{} MIDI event(s) dropped on a full queue", dropped);
        }
        ingest.close();
    }

    println!("Done!");
    Ok(())
}
