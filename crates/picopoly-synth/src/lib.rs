//! Picopoly Synth - fixed-point polyphonic synthesis engine
//!
//! A voice pool with allocation and stealing, block-rate envelopes,
//! wavetable oscillators on 11:16 phase accumulators, per-channel pitch bend,
//! vibrato and pan, all mixed additively into an interleaved stereo `i32`
//! buffer. The render path never allocates and every loop is bounded by the
//! pool size or the block size.
//!
//! # Components
//!
//! - [`SynthEngine`] - owns channels, voices and patches; dispatches events
//!   and renders blocks
//! - [`Channel`] - controller state with cached pan gains and bend multiplier
//! - [`Voice`] - one pool slot
//! - [`Envelope`] - block-rate ADSR
//! - [`Oscillator`] / [`Lfo`] / [`Waveform`] - wavetable oscillators
//! - [`Patch`] / [`PatchBank`] - immutable presets
//! - [`MidiEvent`] / [`MidiParser`] - event record and serial byte decoder
//! - [`queue`] - `ringbuf` SPSC queue between ingest and render contexts
//!
//! # Example
//!
//! ```rust
//! use picopoly_synth::SynthEngine;
//!
//! let mut synth: SynthEngine = SynthEngine::new(44_100);
//!
//! // note on, channel 0, A4, velocity 100
//! synth.midi_in(0x90, 69, 100);
//!
//! let mut block = vec![0i32; 2 * 256];
//! synth.render_block(&mut block);
//! assert!(block.iter().any(|&s| s != 0));
//!
//! synth.midi_in(0x80, 69, 0);
//! assert!(synth.voices()[0].releasable());
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! picopoly-synth = { version = "0.1", default-features = false }
//! ```
//!
//! The `tracing` feature logs voice steals, dropped notes and other
//! non-sample-rate events at debug level.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod engine;
pub mod envelope;
pub mod event;
pub mod oscillator;
pub mod patch;
pub mod queue;
pub mod voice;

pub use channel::{Channel, ChannelAction, DEFAULT_BEND_RANGE, MAX_BEND_RANGE, cc};
pub use engine::{CHANNELS, DEFAULT_VOICES, RENDER_CHUNK, SynthEngine};
pub use envelope::{ENVELOPE_MAX, Envelope, EnvelopePhase, EnvelopeRates};
pub use event::{MidiEvent, MidiParser};
pub use oscillator::{Lfo, Oscillator, Waveform};
pub use patch::{
    FACTORY_PATCH_NAMES, FACTORY_PATCHES, MAX_PATCHES, Patch, PatchBank, PitchEnvelope,
    VibratoSettings,
};
pub use queue::{EVENT_QUEUE_CAPACITY, EventQueue};
pub use voice::Voice;
