//! MIDI note to oscillator phase increment.
//!
//! A phase increment ("step") is the amount the 11:16 phase accumulator
//! advances per sample:
//!
//! ```text
//! step = hz · 2048 · 65536 / sample_rate
//! ```
//!
//! Steps are computed with integer math only. The note is folded into the
//! octave band around A4 (notes 57..=80), the semitone offset from A4 is
//! turned into a power table index with one division by 12, and the octave
//! fold is undone with shifts.

use crate::divider::IntDivider;
use crate::tables::{PHASE_FRAC_BITS, WAVE_SHIFT, power};

/// MIDI note number of the 440 Hz reference.
pub const A4_NOTE: u8 = 69;

/// Reference pitch in Hz.
pub const A4_HZ: u32 = 440;

const BAND_LOW: i32 = 57;
const BAND_HIGH: i32 = 80;

/// Phase increment for a MIDI note at the given sample rate.
///
/// The note is masked to 7 bits. A sample rate of zero yields a zero step.
pub fn step_for_note(note: u8, sample_rate: u32, divider: &impl IntDivider) -> u32 {
    if sample_rate == 0 {
        return 0;
    }

    let mut n = i32::from(note & 0x7f);
    let mut up = 0u32;
    let mut down = 0u32;
    while n < BAND_LOW {
        n += 12;
        down += 1;
    }
    while n > BAND_HIGH {
        n -= 12;
        up += 1;
    }

    let index = divider.quotient((n - i32::from(A4_NOTE)) * 8192, 12);
    // Hz in 16.16, scaled by the semitone offset within the band
    let hz_q16 = ((u64::from(A4_HZ) << 16) * u64::from(power(index))) >> 15;

    let numerator = (hz_q16 << WAVE_SHIFT) << up;
    let denominator = u64::from(sample_rate) << down;
    u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
}

/// Convert a phase increment back to Hz.
///
/// Only used for diagnostics and tests; the render path never leaves the
/// integer domain.
pub fn step_to_hz(step: u32, sample_rate: u32) -> f32 {
    let cycle = f64::from(1u32 << (WAVE_SHIFT + PHASE_FRAC_BITS));
    (f64::from(step) * f64::from(sample_rate) / cycle) as f32
}

/// Phase increments for all 128 MIDI notes at one sample rate.
///
/// Built once when the engine is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTable {
    steps: [u32; 128],
}

impl NoteTable {
    /// Build the table for `sample_rate`.
    pub fn new(sample_rate: u32, divider: &impl IntDivider) -> Self {
        let mut steps = [0u32; 128];
        for (note, step) in (0u8..).zip(steps.iter_mut()) {
            *step = step_for_note(note, sample_rate, divider);
        }
        Self { steps }
    }

    /// Phase increment for `note` (masked to 7 bits).
    #[inline]
    pub fn step(&self, note: u8) -> u32 {
        self.steps[usize::from(note & 0x7f)]
    }

    /// All 128 phase increments.
    pub fn steps(&self) -> &[u32; 128] {
        &self.steps
    }
}
