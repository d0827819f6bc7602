//! Audio and MIDI I/O for the picopoly synthesizer.
//!
//! This crate provides:
//!
//! - **Output stage**: [`OutputStage`] truncates the engine's `i32` mix to
//!   16-bit or float samples
//! - **WAV file I/O**: [`write_wav_stereo`] and [`read_wav_stereo`]
//! - **Offline rendering**: [`render_offline`] plays a timed event schedule
//!   through an engine
//! - **Real-time output**: [`SynthStream`] hosts the render context in a cpal
//!   output callback
//! - **MIDI input**: [`MidiIngest`] hosts the ingest context in a midir
//!   callback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use picopoly_io::{OutputStage, ScheduledEvent, render_offline, write_wav_stereo};
//! use picopoly_synth::{MidiEvent, SynthEngine};
//!
//! let mut engine: SynthEngine = SynthEngine::new(44_100);
//! let schedule = [
//!     ScheduledEvent::new(0, MidiEvent::note_on(0, 69, 100)),
//!     ScheduledEvent::new(22_050, MidiEvent::note_off(0, 69, 0)),
//! ];
//! let samples = render_offline(&mut engine, &schedule, 44_100, 256, OutputStage::default());
//! write_wav_stereo("a4.wav", &samples, 44_100)?;
//! # Ok::<(), picopoly_io::Error>(())
//! ```

mod midi;
mod offline;
mod output;
mod stream;
mod wav;

pub use midi::{IngestSink, MidiIngest, MidiPortInfo, list_midi_ports};
pub use offline::{ScheduledEvent, render_offline};
pub use output::OutputStage;
pub use stream::{AudioDevice, SynthStream, SynthStreamConfig, default_output_device, list_output_devices};
pub use wav::{WavInfo, read_wav_info, read_wav_stereo, write_wav_stereo};

/// Error types for audio and MIDI I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device or MIDI port was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// MIDI backend error.
    #[error("MIDI error: {0}")]
    Midi(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio and MIDI I/O.
pub type Result<T> = std::result::Result<T, Error>;
