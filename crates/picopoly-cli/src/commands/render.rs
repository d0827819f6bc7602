//! Offline render to a WAV file.

use super::common::load_config;
use crate::score::{ScoreEntry, parse_score};
use clap::Args;
use picopoly_io::{OutputStage, ScheduledEvent, render_offline, write_wav_stereo};
use picopoly_synth::{MidiEvent, SynthEngine};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,

    /// Configuration file (defaults to the user configuration if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Score file: one `<ms> <status-hex> <data1> [data2]` event per line
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["note", "velocity", "channel", "program", "hold_ms"])]
    score: Option<PathBuf>,

    /// Note number for a single-note render
    #[arg(short, long, default_value_t = 69, value_parser = clap::value_parser!(u8).range(0..=127))]
    note: u8,

    /// Note velocity (1-127)
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=127))]
    velocity: u8,

    /// MIDI channel (0-15)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    channel: u8,

    /// Program (patch) number
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=127))]
    program: u8,

    /// How long the note is held, in milliseconds
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,

    /// Time rendered after the last event, in milliseconds
    #[arg(long, default_value_t = 1000)]
    tail_ms: u64,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let sample_rate = config.audio.sample_rate;
    let block_size = config.audio.block_size;
    let stage = OutputStage::new(config.audio.output_shift);

    let entries = match &args.score {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
            parse_score(&text)?
        }
        None => single_note(&args),
    };

    let last_ms = entries.iter().map(|e| e.ms).max().unwrap_or(0);
    let Some(end_frame) = last_ms
        .checked_add(args.tail_ms)
        .and_then(|ms| ms.checked_mul(u64::from(sample_rate)))
    else {
        anyhow::bail!("render too long: {} ms + {} ms tail", last_ms, args.tail_ms);
    };
    let total_frames = usize::try_from(end_frame / 1000)?;
    let schedule: Vec<ScheduledEvent> = entries.iter().map(|e| e.schedule(sample_rate)).collect();

    let bank = config.patch_bank()?;
    let mut engine: SynthEngine = SynthEngine::with_patches(sample_rate, bank);

    tracing::info!(
        events = schedule.len(),
        frames = total_frames,
        sample_rate,
        block_size,
        "rendering"
    );
    let samples = render_offline(&mut engine, &schedule, total_frames, block_size, stage);
    write_wav_stereo(&args.out, &samples, sample_rate)?;

    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    println!("Rendered {}", args.out.display());
    println!(
        "  {} events, {} frames, {} Hz, {:.2}s",
        schedule.len(),
        total_frames,
        sample_rate,
        total_frames as f64 / f64::from(sample_rate)
    );
    println!(
        "  Peak: {} ({:.1} dBFS)",
        peak,
        20.0 * (f64::from(peak.max(1)) / 32768.0).log10()
    );
    if peak >= i16::MAX.unsigned_abs() {
        println!("  Warning: output clipped; raise audio.output_shift");
    }

    Ok(())
}

fn single_note(args: &RenderArgs) -> Vec<ScoreEntry> {
    let channel = args.channel;
    vec![
        ScoreEntry {
            ms: 0,
            event: MidiEvent::program_change(channel, args.program),
        },
        ScoreEntry {
            ms: 0,
            event: MidiEvent::note_on(channel, args.note, args.velocity),
        },
        ScoreEntry {
            ms: args.hold_ms,
            event: MidiEvent::note_off(channel, args.note, 0),
        },
    ]
}
