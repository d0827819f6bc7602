//! Picopoly Core - fixed-point building blocks for the picopoly synthesizer
//!
//! Everything in this crate is integer arithmetic over precomputed tables, so
//! it runs unchanged on microcontrollers without an FPU and never allocates.
//!
//! # Tables
//!
//! All tables are `static` and evaluated at compile time, so they are
//! immutable process-wide state that exists before any audio context starts:
//!
//! - [`POWER_TABLE`] - signed 14-bit modulation index → 1:15 frequency multiplier
//! - [`PAN_TABLE`] - 7-bit pan position → square-root pan-law gain
//! - [`SINE_TABLE`], [`SAW_TABLE`], [`SQUARE_TABLE`], [`TRIANGLE_TABLE`] -
//!   single-cycle 2048-entry waveforms
//!
//! # Pitch
//!
//! - [`NoteTable`] - per-note oscillator phase increments for a sample rate
//! - [`frequency_modulate`] / [`apply_multiplier`] - log-domain pitch modulation
//!
//! # Division
//!
//! - [`IntDivider`] - integer divider seam (hardware divider on MCUs)
//! - [`SoftDivider`] - portable software fallback
//!
//! # Example
//!
//! ```rust
//! use picopoly_core::{NoteTable, SoftDivider, frequency_modulate, step_to_hz};
//!
//! let notes = NoteTable::new(44_100, &SoftDivider);
//! let a4 = notes.step(69);
//! assert!((step_to_hz(a4, 44_100) - 440.0).abs() < 0.01);
//!
//! // +8192 is one octave up in the power table domain (clamped to 8191)
//! let up = frequency_modulate(a4, 8191);
//! assert!((step_to_hz(up, 44_100) - 880.0).abs() < 0.2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod divider;
pub mod fixed;
pub mod pitch;
pub mod tables;

pub use divider::{IntDivider, SoftDivider};
pub use fixed::{apply_multiplier, clamp_index, frequency_modulate};
pub use pitch::{NoteTable, step_for_note, step_to_hz};
pub use tables::{
    PAN_TABLE, PHASE_FRAC_BITS, PHASE_MASK, POWER_CENTER, POWER_TABLE, POWER_TABLE_LEN,
    SAW_TABLE, SINE_TABLE, SQUARE_TABLE, TRIANGLE_TABLE, UNITY, WAVE_LEN, WAVE_SHIFT, Wavetable,
    pan_gains, power,
};
