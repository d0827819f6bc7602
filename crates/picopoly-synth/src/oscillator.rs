//! Wavetable oscillators.
//!
//! Both oscillators here read single-cycle 2048-entry tables by the high bits
//! of a phase accumulator (nearest neighbour, no interpolation). The audio
//! oscillator uses an 11:16 accumulator advanced once per sample; the vibrato
//! LFO uses a full 32-bit accumulator advanced once per block.

use core::fmt;

use picopoly_core::{
    PHASE_FRAC_BITS, PHASE_MASK, SAW_TABLE, SINE_TABLE, SQUARE_TABLE, TRIANGLE_TABLE, WAVE_SHIFT,
    Wavetable,
};

/// Oscillator waveform.
///
/// A closed set resolved to a table once per block, so the per-sample loop
/// is a plain table read.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Sine.
    #[default]
    Sine,
    /// Falling sawtooth.
    Sawtooth,
    /// 50% square.
    Square,
    /// Triangle.
    Triangle,
    /// A caller-supplied single-cycle table.
    Custom(&'static Wavetable),
}

impl Waveform {
    /// Names accepted by [`Waveform::from_name`], in table order.
    pub const NAMES: [&'static str; 4] = ["sine", "sawtooth", "square", "triangle"];

    /// The wavetable this waveform reads.
    #[inline]
    pub fn table(self) -> &'static Wavetable {
        match self {
            Self::Sine => &SINE_TABLE,
            Self::Sawtooth => &SAW_TABLE,
            Self::Square => &SQUARE_TABLE,
            Self::Triangle => &TRIANGLE_TABLE,
            Self::Custom(table) => table,
        }
    }

    /// Look up a built-in waveform by name (case-insensitive, `saw` accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("sine") {
            Some(Self::Sine)
        } else if name.eq_ignore_ascii_case("sawtooth") || name.eq_ignore_ascii_case("saw") {
            Some(Self::Sawtooth)
        } else if name.eq_ignore_ascii_case("square") {
            Some(Self::Square)
        } else if name.eq_ignore_ascii_case("triangle") {
            Some(Self::Triangle)
        } else {
            None
        }
    }

    /// Canonical name. Custom tables report `"custom"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Sawtooth => "sawtooth",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sine => f.write_str("Sine"),
            Self::Sawtooth => f.write_str("Sawtooth"),
            Self::Square => f.write_str("Square"),
            Self::Triangle => f.write_str("Triangle"),
            // tables are 2048 entries; print the address instead
            Self::Custom(table) => write!(f, "Custom({:p})", *table),
        }
    }
}

/// Numerically controlled wavetable oscillator with an 11:16 phase
/// accumulator.
///
/// `step_base` is the unmodulated increment for the note; `step` is the
/// increment actually used, recomputed by the engine once per block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Oscillator {
    waveform: Waveform,
    phase: u32,
    step_base: u32,
    step: u32,
}

impl Oscillator {
    /// Restart at phase zero with a new waveform and base step.
    pub fn start(&mut self, waveform: Waveform, step_base: u32) {
        self.waveform = waveform;
        self.phase = 0;
        self.step_base = step_base;
        self.step = step_base;
    }

    /// Set the increment used by the next render.
    #[inline]
    pub fn set_step(&mut self, step: u32) {
        self.step = step;
    }

    /// Render `out.len()` samples.
    #[inline]
    pub fn render(&mut self, out: &mut [i16]) {
        let table = self.waveform.table();
        let step = self.step;
        let mut phase = self.phase;
        for sample in out.iter_mut() {
            *sample = table[(phase >> PHASE_FRAC_BITS) as usize];
            phase = phase.wrapping_add(step) & PHASE_MASK;
        }
        self.phase = phase;
    }

    /// Advance the phase as if `frames` samples had been rendered.
    #[inline]
    pub fn skip(&mut self, frames: usize) {
        let advance = self.step.wrapping_mul(frames as u32);
        self.phase = self.phase.wrapping_add(advance) & PHASE_MASK;
    }

    /// Waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current phase (11:16).
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Unmodulated increment for the current note.
    pub fn step_base(&self) -> u32 {
        self.step_base
    }

    /// Increment used by the last or next render.
    pub fn step(&self) -> u32 {
        self.step
    }
}

// top WAVE_SHIFT bits of a 32-bit phase index the table
const LFO_INDEX_SHIFT: u32 = 32 - WAVE_SHIFT;
const LFO_RATE_SHIFT: u32 = 13;

/// Block-rate vibrato oscillator.
///
/// The phase advances by `rate << 13` per frame, so rate 64 completes a cycle
/// every 8192 frames (about 5.4 Hz at 44.1 kHz).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lfo {
    waveform: Waveform,
    phase: u32,
    increment: u32,
}

impl Lfo {
    /// Create an LFO at phase zero. `rate` is masked to 7 bits.
    pub fn new(waveform: Waveform, rate: u8) -> Self {
        Self {
            waveform,
            phase: 0,
            increment: u32::from(rate & 0x7f) << LFO_RATE_SHIFT,
        }
    }

    /// Return the sample at the current phase, then advance by `frames`.
    #[inline]
    pub fn advance(&mut self, frames: usize) -> i16 {
        let sample = self.waveform.table()[(self.phase >> LFO_INDEX_SHIFT) as usize];
        self.phase = self
            .phase
            .wrapping_add(self.increment.wrapping_mul(frames as u32));
        sample
    }

    /// Current 32-bit phase.
    pub fn phase(&self) -> u32 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picopoly_core::WAVE_LEN;

    static RAMP: Wavetable = {
        let mut t = [0i16; WAVE_LEN];
        let mut i = 0;
        while i < WAVE_LEN {
            t[i] = i as i16;
            i += 1;
        }
        t
    };

    #[test]
    fn renders_table_at_phase_high_bits() {
        let mut osc = Oscillator::default();
        osc.start(Waveform::Custom(&RAMP), 3 << 16);
        let mut out = [0i16; 4];
        osc.render(&mut out);
        assert_eq!(out, [0, 3, 6, 9]);
        assert_eq!(osc.phase(), 12 << 16);
    }

    #[test]
    fn phase_wraps_at_table_length() {
        let mut osc = Oscillator::default();
        osc.start(Waveform::Custom(&RAMP), 1000 << 16);
        let mut out = [0i16; 3];
        osc.render(&mut out);
        assert_eq!(out, [0, 1000, 2000]);
        osc.render(&mut out[..1]);
        // 3000 - 2048
        assert_eq!(out[0], 952);
    }

    #[test]
    fn skip_matches_render() {
        let mut a = Oscillator::default();
        let mut b = Oscillator::default();
        a.start(Waveform::Sawtooth, 1_339_133);
        b.start(Waveform::Sawtooth, 1_339_133);
        let mut scratch = [0i16; 300];
        a.render(&mut scratch);
        b.skip(300);
        assert_eq!(a.phase(), b.phase());
    }

    #[test]
    fn start_resets_phase() {
        let mut osc = Oscillator::default();
        osc.start(Waveform::Square, 12345);
        osc.skip(1000);
        osc.start(Waveform::Sine, 777);
        assert_eq!(osc.phase(), 0);
        assert_eq!(osc.step(), 777);
        assert_eq!(osc.step_base(), 777);
    }

    #[test]
    fn lfo_completes_a_cycle() {
        let mut lfo = Lfo::new(Waveform::Sine, 64);
        // quarter cycle = 2048 frames
        assert_eq!(lfo.advance(2048), 0);
        assert_eq!(lfo.advance(2048), 32767);
        assert_eq!(lfo.advance(4096), 0);
        assert_eq!(lfo.advance(0), 0);
        assert_eq!(lfo.phase(), 0);
    }

    #[test]
    fn waveform_names_round_trip() {
        for name in Waveform::NAMES {
            let wave = Waveform::from_name(name).unwrap();
            assert_eq!(wave.name(), name);
        }
        assert_eq!(Waveform::from_name(" SAW "), Some(Waveform::Sawtooth));
        assert_eq!(Waveform::from_name("noise"), None);
        assert_eq!(Waveform::Custom(&RAMP).name(), "custom");
    }
}
