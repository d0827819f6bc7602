//! One polyphonic voice slot.
//!
//! Voices refer to their channel and patch by index, and those indices are
//! only meaningful while the voice is in use. A voice at rest is exactly
//! `Voice::default()`.

use crate::envelope::Envelope;
use crate::oscillator::{Lfo, Oscillator};
use crate::patch::Patch;

/// A voice slot in the engine's pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    in_use: bool,
    releasable: bool,
    sustained: bool,
    note: u8,
    velocity: u8,
    channel: u8,
    patch: u8,
    amp_env: Envelope,
    pitch_env: Option<Envelope>,
    osc: Oscillator,
    vibrato: Lfo,
}

impl Voice {
    pub(crate) fn claim(&mut self) {
        self.in_use = true;
        self.releasable = false;
        self.sustained = false;
    }

    /// Bind to a note and start both envelopes and the oscillator from zero.
    pub(crate) fn start(
        &mut self,
        channel: u8,
        note: u8,
        velocity: u8,
        patch_index: u8,
        patch: &Patch,
        step_base: u32,
    ) {
        self.claim();
        self.channel = channel;
        self.note = note;
        self.velocity = velocity;
        self.patch = patch_index;

        self.amp_env = Envelope::new(patch.amp);
        self.amp_env.gate_on();
        self.pitch_env = patch.pitch.map(|pitch| {
            let mut env = Envelope::new(pitch.rates);
            env.gate_on();
            env
        });

        self.osc.start(patch.waveform, step_base);
        self.vibrato = Lfo::new(patch.vibrato.waveform, patch.vibrato.rate);
    }

    /// Gate both envelopes off and make the voice stealable.
    pub(crate) fn release(&mut self) {
        self.amp_env.gate_off();
        if let Some(env) = self.pitch_env.as_mut() {
            env.gate_off();
        }
        self.releasable = true;
        self.sustained = false;
    }

    /// Note-off under a held sustain pedal: stealable, but still sounding.
    pub(crate) fn hold(&mut self) {
        if !self.releasable {
            self.releasable = true;
            self.sustained = true;
        }
    }

    /// Return to the at-rest state.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn amp_env_mut(&mut self) -> &mut Envelope {
        &mut self.amp_env
    }

    pub(crate) fn pitch_env_mut(&mut self) -> Option<&mut Envelope> {
        self.pitch_env.as_mut()
    }

    pub(crate) fn osc_mut(&mut self) -> &mut Oscillator {
        &mut self.osc
    }

    pub(crate) fn vibrato_mut(&mut self) -> &mut Lfo {
        &mut self.vibrato
    }

    /// Allocated to a note.
    #[inline]
    pub fn in_use(&self) -> bool {
        self.in_use
    }

    /// Note-off received; may be stolen.
    #[inline]
    pub fn releasable(&self) -> bool {
        self.releasable
    }

    /// Held by the sustain pedal after its note-off.
    #[inline]
    pub fn sustained(&self) -> bool {
        self.sustained
    }

    /// MIDI note.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Note-on velocity.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Channel index.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Patch bank index captured at note-on.
    pub fn patch(&self) -> u8 {
        self.patch
    }

    /// Amplitude envelope.
    pub fn amp_env(&self) -> &Envelope {
        &self.amp_env
    }

    /// Pitch envelope, if the patch has one.
    pub fn pitch_env(&self) -> Option<&Envelope> {
        self.pitch_env.as_ref()
    }

    /// Oscillator state.
    pub fn osc(&self) -> &Oscillator {
        &self.osc
    }

    /// Vibrato LFO state.
    pub fn vibrato(&self) -> &Lfo {
        &self.vibrato
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopePhase;
    use crate::patch::FACTORY_PATCHES;

    #[test]
    fn start_gates_envelopes() {
        let mut voice = Voice::default();
        voice.start(2, 60, 90, 1, &FACTORY_PATCHES[1], 1000);
        assert!(voice.in_use());
        assert!(!voice.releasable());
        assert_eq!(voice.amp_env().phase(), EnvelopePhase::Attack);
        assert_eq!(voice.pitch_env().map(Envelope::phase), Some(EnvelopePhase::Attack));
        assert_eq!(voice.osc().step_base(), 1000);
        assert_eq!((voice.channel(), voice.note(), voice.velocity(), voice.patch()), (2, 60, 90, 1));
    }

    #[test]
    fn release_and_hold() {
        let mut voice = Voice::default();
        voice.start(0, 60, 90, 0, &FACTORY_PATCHES[0], 1000);
        voice.hold();
        assert!(voice.releasable() && voice.sustained());
        assert_eq!(voice.amp_env().phase(), EnvelopePhase::Attack);

        voice.release();
        assert!(voice.releasable() && !voice.sustained());
        assert_eq!(voice.amp_env().phase(), EnvelopePhase::Release);

        // a released voice is not re-held
        voice.hold();
        assert!(!voice.sustained());
    }

    #[test]
    fn reset_restores_rest_state() {
        let mut voice = Voice::default();
        voice.start(3, 70, 100, 2, &FACTORY_PATCHES[2], 5000);
        voice.osc_mut().skip(100);
        voice.reset();
        assert_eq!(voice, Voice::default());
    }
}
