//! Per-MIDI-channel controller state.
//!
//! A [`Channel`] mirrors the channel's controllers and keeps the values the
//! render loop needs (pan gains, pitch-bend multiplier) derived and cached.
//! Derived state is recomputed inside the write that changes its source, so
//! it is never stale.

use picopoly_core::{IntDivider, UNITY, clamp_index, pan_gains, power};

/// Controller numbers with special handling.
pub mod cc {
    /// Modulation wheel (scales vibrato depth).
    pub const MOD_WHEEL: u8 = 1;
    /// Data entry MSB (RPN value).
    pub const DATA_ENTRY: u8 = 6;
    /// Channel volume.
    pub const VOLUME: u8 = 7;
    /// Pan.
    pub const PAN: u8 = 10;
    /// Sustain (damper) pedal.
    pub const SUSTAIN: u8 = 64;
    /// NRPN parameter LSB.
    pub const NRPN_LSB: u8 = 98;
    /// NRPN parameter MSB.
    pub const NRPN_MSB: u8 = 99;
    /// RPN parameter LSB.
    pub const RPN_LSB: u8 = 100;
    /// RPN parameter MSB.
    pub const RPN_MSB: u8 = 101;
    /// All sound off.
    pub const ALL_SOUND_OFF: u8 = 120;
    /// Reset all controllers.
    pub const RESET_ALL_CONTROLLERS: u8 = 121;
    /// All notes off.
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// Default pitch-bend range in semitones.
pub const DEFAULT_BEND_RANGE: u8 = 2;

/// Largest accepted pitch-bend range in semitones.
pub const MAX_BEND_RANGE: u8 = 12;

const DEFAULT_VOLUME: u8 = 100;
const DEFAULT_PAN: u8 = 64;
const BEND_CENTER: i32 = 8192;
const RPN_NULL: u8 = 127;

/// Voice-level follow-up a controller write asks the engine to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelAction {
    /// Nothing further.
    None,
    /// The sustain pedal went up; gate off the voices it was holding.
    SustainReleased,
    /// Silence every voice on the channel immediately.
    AllSoundOff,
    /// Release every voice on the channel.
    AllNotesOff,
}

/// Controller state for one MIDI channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    controllers: [u8; 128],
    pan_left: u8,
    pan_right: u8,
    bend: i32,
    bend_index: i32,
    bend_multiplier: u16,
    bend_range: u8,
    program: u8,
    pressure: u8,
    rpn: (u8, u8),
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    /// Power-on state: volume 100, pan centered, bend centered with a
    /// two-semitone range, program 0.
    pub fn new() -> Self {
        let mut controllers = [0u8; 128];
        controllers[usize::from(cc::VOLUME)] = DEFAULT_VOLUME;
        controllers[usize::from(cc::PAN)] = DEFAULT_PAN;
        let (pan_left, pan_right) = pan_gains(DEFAULT_PAN);
        Self {
            controllers,
            pan_left,
            pan_right,
            bend: 0,
            bend_index: 0,
            bend_multiplier: UNITY,
            bend_range: DEFAULT_BEND_RANGE,
            program: 0,
            pressure: 0,
            rpn: (RPN_NULL, RPN_NULL),
        }
    }

    /// Store a controller value and update anything derived from it.
    ///
    /// Controller number and value are masked to 7 bits.
    pub fn apply_control_change(
        &mut self,
        controller: u8,
        value: u8,
        divider: &impl IntDivider,
    ) -> ChannelAction {
        let controller = controller & 0x7f;
        let value = value & 0x7f;
        let was_held = self.sustain_pedal();
        self.controllers[usize::from(controller)] = value;

        match controller {
            cc::PAN => {
                (self.pan_left, self.pan_right) = pan_gains(value);
            }
            cc::RPN_MSB => self.rpn.0 = value,
            cc::RPN_LSB => self.rpn.1 = value,
            cc::NRPN_MSB | cc::NRPN_LSB => self.rpn = (RPN_NULL, RPN_NULL),
            cc::DATA_ENTRY if self.rpn == (0, 0) => {
                self.set_bend_range(value, divider);
            }
            cc::SUSTAIN if was_held && !self.sustain_pedal() => {
                return ChannelAction::SustainReleased;
            }
            cc::ALL_SOUND_OFF => return ChannelAction::AllSoundOff,
            cc::RESET_ALL_CONTROLLERS => {
                self.reset_controllers(divider);
                if was_held {
                    return ChannelAction::SustainReleased;
                }
            }
            cc::ALL_NOTES_OFF => return ChannelAction::AllNotesOff,
            _ => {}
        }
        ChannelAction::None
    }

    /// Apply a 14-bit pitch bend split into 7-bit halves.
    ///
    /// The bend index and multiplier are recomputed only when the raw value
    /// changes.
    pub fn apply_pitch_bend(&mut self, lsb: u8, msb: u8, divider: &impl IntDivider) {
        let raw = ((i32::from(msb & 0x7f) << 7) | i32::from(lsb & 0x7f)) - BEND_CENTER;
        if raw != self.bend {
            self.bend = raw;
            self.update_bend(divider);
        }
    }

    /// Select the program for future notes on this channel.
    pub fn apply_program_change(&mut self, program: u8) {
        self.program = program & 0x7f;
    }

    /// Store channel pressure.
    pub fn apply_channel_pressure(&mut self, pressure: u8) {
        self.pressure = pressure & 0x7f;
    }

    /// Reset All Controllers: mod wheel, sustain pedal, pressure, pitch bend
    /// and RPN selection return to their defaults. Volume, pan, program and
    /// controllers without special handling are kept.
    pub fn reset_controllers(&mut self, divider: &impl IntDivider) {
        self.controllers[usize::from(cc::MOD_WHEEL)] = 0;
        self.controllers[usize::from(cc::SUSTAIN)] = 0;
        self.pressure = 0;
        self.rpn = (RPN_NULL, RPN_NULL);
        if self.bend != 0 {
            self.bend = 0;
            self.update_bend(divider);
        }
    }

    /// Set the pitch-bend range in semitones (clamped to 0..=12).
    pub fn set_bend_range(&mut self, semitones: u8, divider: &impl IntDivider) {
        let semitones = semitones.min(MAX_BEND_RANGE);
        if semitones != self.bend_range {
            self.bend_range = semitones;
            self.update_bend(divider);
            #[cfg(feature = "tracing")]
            tracing::debug!(semitones, "pitch bend range changed");
        }
    }

    fn update_bend(&mut self, divider: &impl IntDivider) {
        let scaled = divider.quotient(self.bend * i32::from(self.bend_range), 12);
        self.bend_index = clamp_index(scaled);
        self.bend_multiplier = power(self.bend_index);
    }

    /// Latest value of a controller (masked to 7 bits).
    #[inline]
    pub fn controller(&self, controller: u8) -> u8 {
        self.controllers[usize::from(controller & 0x7f)]
    }

    /// Channel volume.
    #[inline]
    pub fn volume(&self) -> u8 {
        self.controller(cc::VOLUME)
    }

    /// Modulation wheel.
    #[inline]
    pub fn mod_wheel(&self) -> u8 {
        self.controller(cc::MOD_WHEEL)
    }

    /// Pan-law gains `(left, right)`.
    #[inline]
    pub fn pan_gains(&self) -> (u8, u8) {
        (self.pan_left, self.pan_right)
    }

    /// True while the sustain pedal is down (CC 64 ≥ 64).
    #[inline]
    pub fn sustain_pedal(&self) -> bool {
        self.controller(cc::SUSTAIN) >= 64
    }

    /// Signed bend value, `-8192..=8191`.
    pub fn bend(&self) -> i32 {
        self.bend
    }

    /// Power table index for the current bend.
    #[inline]
    pub fn bend_index(&self) -> i32 {
        self.bend_index
    }

    /// 1:15 frequency multiplier for the current bend.
    #[inline]
    pub fn bend_multiplier(&self) -> u16 {
        self.bend_multiplier
    }

    /// Pitch-bend range in semitones.
    pub fn bend_range(&self) -> u8 {
        self.bend_range
    }

    /// Selected program.
    pub fn program(&self) -> u8 {
        self.program
    }

    /// Channel pressure.
    pub fn pressure(&self) -> u8 {
        self.pressure
    }
}
