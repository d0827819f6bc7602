//! Patches and the preset bank.
//!
//! A [`Patch`] is a small `Copy` record. The [`PatchBank`] is built once at
//! startup and never mutated; voices hold the index of the patch they were
//! started with, so a program change never affects notes already sounding.

use crate::envelope::EnvelopeRates;
use crate::oscillator::Waveform;

/// Maximum number of patches in a bank.
pub const MAX_PATCHES: usize = 16;

/// Names of the built-in patches, in program order.
pub const FACTORY_PATCH_NAMES: [&str; 4] = ["sine-lead", "square-blip", "saw-vibrato", "triangle-flute"];

const FACTORY_AMP: EnvelopeRates = EnvelopeRates::new(30, 20, 80, 20);

/// Pitch envelope: rates plus a signed depth.
///
/// The envelope level (15 bits) times `depth` is shifted right by 9 to give
/// a power table index, so depth ±127 is just under ±1 octave at the peak.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PitchEnvelope {
    /// Envelope rates.
    pub rates: EnvelopeRates,
    /// Signed modulation depth.
    pub depth: i8,
}

/// Vibrato LFO settings.
///
/// Vibrato depth is further scaled by the channel's mod wheel, so a patch
/// with nonzero depth is still dry until the wheel moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VibratoSettings {
    /// LFO waveform.
    pub waveform: Waveform,
    /// LFO rate (7-bit).
    pub rate: u8,
    /// Depth (7-bit).
    pub depth: u8,
}

/// An immutable voice preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Patch {
    /// Oscillator waveform.
    pub waveform: Waveform,
    /// Master level (7-bit).
    pub level: u8,
    /// Amplitude envelope.
    pub amp: EnvelopeRates,
    /// Optional pitch envelope.
    pub pitch: Option<PitchEnvelope>,
    /// Vibrato.
    pub vibrato: VibratoSettings,
}

impl Default for Patch {
    fn default() -> Self {
        FACTORY_PATCHES[0]
    }
}

/// The built-in patches.
pub const FACTORY_PATCHES: [Patch; 4] = [
    Patch {
        waveform: Waveform::Sine,
        level: 127,
        amp: FACTORY_AMP,
        pitch: None,
        vibrato: VibratoSettings {
            waveform: Waveform::Sine,
            rate: 64,
            depth: 20,
        },
    },
    Patch {
        waveform: Waveform::Square,
        level: 100,
        amp: FACTORY_AMP,
        pitch: Some(PitchEnvelope {
            rates: EnvelopeRates::new(127, 40, 0, 0),
            depth: 24,
        }),
        vibrato: VibratoSettings {
            waveform: Waveform::Sine,
            rate: 64,
            depth: 127,
        },
    },
    Patch {
        waveform: Waveform::Sawtooth,
        level: 100,
        amp: FACTORY_AMP,
        pitch: None,
        vibrato: VibratoSettings {
            waveform: Waveform::Sine,
            rate: 64,
            depth: 127,
        },
    },
    Patch {
        waveform: Waveform::Triangle,
        level: 127,
        amp: FACTORY_AMP,
        pitch: None,
        vibrato: VibratoSettings {
            waveform: Waveform::Square,
            rate: 96,
            depth: 31,
        },
    },
];

/// Fixed-capacity, never-empty patch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchBank {
    patches: [Patch; MAX_PATCHES],
    len: usize,
}

impl Default for PatchBank {
    fn default() -> Self {
        Self::factory()
    }
}

impl PatchBank {
    /// The built-in bank.
    pub fn factory() -> Self {
        Self::from_slice(&FACTORY_PATCHES)
    }

    /// Build a bank from up to [`MAX_PATCHES`] patches.
    ///
    /// Extra patches are ignored. An empty slice yields a bank holding one
    /// default patch, so lookups always succeed.
    pub fn from_slice(patches: &[Patch]) -> Self {
        let mut bank = Self {
            patches: [Patch::default(); MAX_PATCHES],
            len: 0,
        };
        for (slot, patch) in bank.patches.iter_mut().zip(patches) {
            *slot = *patch;
            bank.len += 1;
        }
        if bank.len == 0 {
            bank.len = 1;
        }
        bank
    }

    /// Bank index for a program number (`program % len`).
    #[inline]
    pub fn resolve(&self, program: u8) -> u8 {
        (usize::from(program) % self.len) as u8
    }

    /// Patch at a bank index, wrapping out-of-range indices.
    #[inline]
    pub fn get(&self, index: u8) -> &Patch {
        &self.patches[usize::from(index) % self.len]
    }

    /// Number of patches (at least one).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a bank holds at least one patch.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the patches in program order.
    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches[..self.len].iter()
    }
}
