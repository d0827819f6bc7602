//! Block-rate ADSR envelope.
//!
//! Levels are 15-bit (`0..=0x7fff`) and advance once per audio block by a
//! fixed linear step derived from a 7-bit rate:
//!
//! | Phase | Step per block | Ends when |
//! |-------|----------------|-----------|
//! | Attack | `+attack << 7` | level reaches `0x7fff` |
//! | Decay | `-decay << 5` | level reaches `sustain << 8` |
//! | Sustain | none | `gate_off()` |
//! | Release | `-release << 4` | level reaches zero |
//!
//! A zero sustain level ends the envelope at the bottom of the decay instead
//! of holding a silent sustain.

/// Peak envelope level.
pub const ENVELOPE_MAX: u16 = 0x7fff;

const ATTACK_SHIFT: u32 = 7;
const DECAY_SHIFT: u32 = 5;
const RELEASE_SHIFT: u32 = 4;
const SUSTAIN_SHIFT: u32 = 8;

/// Envelope phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopePhase {
    /// Silent and finished.
    #[default]
    Off,
    /// Rising toward the peak.
    Attack,
    /// Falling from the peak toward the sustain level.
    Decay,
    /// Holding while the gate is on.
    Sustain,
    /// Falling to zero after the gate is released.
    Release,
}

/// The four 7-bit envelope parameters.
///
/// `attack`, `decay` and `release` are rates (larger is faster); `sustain`
/// is a level. Values above 127 are masked when an [`Envelope`] is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeRates {
    /// Attack rate.
    pub attack: u8,
    /// Decay rate.
    pub decay: u8,
    /// Sustain level.
    pub sustain: u8,
    /// Release rate.
    pub release: u8,
}

impl EnvelopeRates {
    /// Bundle four envelope parameters.
    pub const fn new(attack: u8, decay: u8, sustain: u8, release: u8) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

/// ADSR envelope generator.
///
/// # Example
///
/// ```rust
/// use picopoly_synth::{Envelope, EnvelopePhase, EnvelopeRates};
///
/// let mut env = Envelope::new(EnvelopeRates::new(127, 127, 0, 127));
/// env.gate_on();
/// let mut blocks = 0;
/// while env.active() {
///     env.update();
///     blocks += 1;
/// }
/// assert_eq!(env.phase(), EnvelopePhase::Off);
/// assert!(blocks < 20);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    phase: EnvelopePhase,
    level: u16,
    attack_step: i32,
    decay_step: i32,
    release_step: i32,
    sustain_level: i32,
}

impl Envelope {
    /// Create an idle envelope with the given rates.
    pub fn new(rates: EnvelopeRates) -> Self {
        Self {
            phase: EnvelopePhase::Off,
            level: 0,
            attack_step: step(rates.attack, ATTACK_SHIFT),
            decay_step: step(rates.decay, DECAY_SHIFT),
            release_step: step(rates.release, RELEASE_SHIFT),
            sustain_level: i32::from(rates.sustain & 0x7f) << SUSTAIN_SHIFT,
        }
    }

    /// Start (or restart) the attack. The current level is kept so a
    /// retrigger does not click.
    pub fn gate_on(&mut self) {
        self.phase = EnvelopePhase::Attack;
    }

    /// Move to the release phase from whatever phase the envelope is in.
    pub fn gate_off(&mut self) {
        self.phase = EnvelopePhase::Release;
    }

    /// Advance one block and return the new level.
    pub fn update(&mut self) -> u16 {
        let mut level = i32::from(self.level);
        match self.phase {
            EnvelopePhase::Off | EnvelopePhase::Sustain => {}
            EnvelopePhase::Attack => {
                level += self.attack_step;
                if level >= i32::from(ENVELOPE_MAX) {
                    level = i32::from(ENVELOPE_MAX);
                    self.phase = EnvelopePhase::Decay;
                }
            }
            EnvelopePhase::Decay => {
                level -= self.decay_step;
                if level <= self.sustain_level {
                    level = self.sustain_level;
                    self.phase = if self.sustain_level == 0 {
                        EnvelopePhase::Off
                    } else {
                        EnvelopePhase::Sustain
                    };
                }
            }
            EnvelopePhase::Release => {
                level -= self.release_step;
                if level <= 0 {
                    level = 0;
                    self.phase = EnvelopePhase::Off;
                }
            }
        }
        self.level = level as u16;
        self.level
    }

    /// True until the envelope reaches [`EnvelopePhase::Off`].
    #[inline]
    pub fn active(&self) -> bool {
        self.phase != EnvelopePhase::Off
    }

    /// Current level without advancing.
    #[inline]
    pub fn level(&self) -> u16 {
        self.level
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }
}

// rate 0 would stall a phase forever
fn step(rate: u8, shift: u32) -> i32 {
    i32::from((rate & 0x7f).max(1)) << shift
}
