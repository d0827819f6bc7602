//! The polyphonic synthesis engine.
//!
//! [`SynthEngine`] owns the channel array, the voice pool, the patch bank and
//! the note-step table. It is driven from a single render context: events
//! are applied between blocks with [`SynthEngine::midi_in`] (or drained from
//! an SPSC queue with [`SynthEngine::drain_events`]) and audio is produced
//! with [`SynthEngine::render_block`]. Nothing here allocates or blocks.
//!
//! ## Gain staging
//!
//! Each voice's gain is built with fixed bit widths so overflow behaviour is
//! reproducible:
//!
//! ```text
//! env(15) × master(7) >> 7   → 15 bits
//!         × velocity(7)      → 22 bits
//!         × volume(7) >> 4   → 25 bits
//!         × pan(7) >> 16     → 16-bit left/right gains
//! out += (gain × sample) >> 16
//! ```
//!
//! A single voice therefore adds less than `2^15` in magnitude per sample,
//! and a full pool of `VOICES` stays far inside `i32`.
//!
//! ## Pitch
//!
//! The oscillator step is recomputed once per block from the note's base
//! step by up to three log-domain multiplications: channel pitch bend, the
//! patch pitch envelope (`level × depth >> 9`) and vibrato
//! (`lfo × mod_wheel × depth >> 18`).

use picopoly_core::{IntDivider, NoteTable, SoftDivider, apply_multiplier, frequency_modulate};
use ringbuf::traits::Consumer;

use crate::channel::{Channel, ChannelAction};
use crate::event::MidiEvent;
use crate::patch::PatchBank;
use crate::voice::Voice;

/// Number of MIDI channels.
pub const CHANNELS: usize = 16;

/// Default voice pool size.
pub const DEFAULT_VOICES: usize = 32;

/// Frames rendered per inner chunk; bounds the on-stack scratch buffer.
pub const RENDER_CHUNK: usize = 64;

const PITCH_ENV_SHIFT: u32 = 9;
const VIBRATO_SHIFT: u32 = 18;

/// Fixed-point polyphonic synthesizer.
///
/// `VOICES` is the size of the voice pool; `D` performs the few integer
/// divisions pitch math needs.
///
/// # Example
///
/// ```rust
/// use picopoly_synth::SynthEngine;
///
/// let mut synth: SynthEngine = SynthEngine::new(44_100);
/// synth.midi_in(0x90, 69, 100);
///
/// let mut block = [0i32; 2 * 256];
/// synth.render_block(&mut block);
/// assert!(block.iter().any(|&s| s != 0));
/// ```
#[derive(Debug, Clone)]
pub struct SynthEngine<const VOICES: usize = DEFAULT_VOICES, D: IntDivider = SoftDivider> {
    voices: [Voice; VOICES],
    channels: [Channel; CHANNELS],
    patches: PatchBank,
    notes: NoteTable,
    divider: D,
    sample_rate: u32,
}

impl<const VOICES: usize> SynthEngine<VOICES, SoftDivider> {
    /// Engine with the factory patch bank.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_divider(sample_rate, PatchBank::factory(), SoftDivider)
    }

    /// Engine with a custom patch bank.
    pub fn with_patches(sample_rate: u32, patches: PatchBank) -> Self {
        Self::with_divider(sample_rate, patches, SoftDivider)
    }
}

impl<const VOICES: usize, D: IntDivider> SynthEngine<VOICES, D> {
    /// Engine with a custom patch bank and integer divider.
    pub fn with_divider(sample_rate: u32, patches: PatchBank, divider: D) -> Self {
        let notes = NoteTable::new(sample_rate, &divider);
        Self {
            voices: [Voice::default(); VOICES],
            channels: core::array::from_fn(|_| Channel::new()),
            patches,
            notes,
            divider,
            sample_rate,
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Apply one channel-voice message.
    ///
    /// Dispatches on the status high nibble; system messages and bytes
    /// without the status bit are ignored. Data bytes are masked to 7 bits.
    pub fn midi_in(&mut self, status: u8, data1: u8, data2: u8) {
        let channel = status & 0x0f;
        let data1 = data1 & 0x7f;
        let data2 = data2 & 0x7f;

        match status >> 4 {
            0x8 => self.note_off(channel, data1),
            0x9 => {
                if data2 == 0 {
                    self.note_off(channel, data1);
                } else {
                    self.note_on(channel, data1, data2);
                }
            }
            0xb => self.control_change(channel, data1, data2),
            0xc => self.channels[usize::from(channel)].apply_program_change(data1),
            0xd => self.channels[usize::from(channel)].apply_channel_pressure(data1),
            0xe => self.channels[usize::from(channel)].apply_pitch_bend(data1, data2, &self.divider),
            _ => {}
        }
    }

    /// Apply a [`MidiEvent`].
    #[inline]
    pub fn dispatch(&mut self, event: MidiEvent) {
        self.midi_in(event.status, event.data1, event.data2);
    }

    /// Apply the events pending in a queue.
    ///
    /// At most the number of events present when the drain starts is
    /// consumed, so a producer that keeps pushing cannot hold up the block.
    /// Returns the number of events applied.
    pub fn drain_events<C>(&mut self, events: &mut C) -> usize
    where
        C: Consumer<Item = MidiEvent>,
    {
        let pending = events.occupied_len();
        let mut applied = 0;
        while applied < pending {
            let Some(event) = events.try_pop() else {
                break;
            };
            self.dispatch(event);
            applied += 1;
        }
        applied
    }

    /// Drain pending events, then render one block into `out`.
    ///
    /// `out` is accumulated into, not overwritten.
    pub fn process_block<C>(&mut self, events: &mut C, out: &mut [i32]) -> usize
    where
        C: Consumer<Item = MidiEvent>,
    {
        let applied = self.drain_events(events);
        self.render_block(out);
        applied
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        let action =
            self.channels[usize::from(channel)].apply_control_change(controller, value, &self.divider);
        match action {
            ChannelAction::None => {}
            ChannelAction::SustainReleased => {
                for voice in self.voices.iter_mut() {
                    if voice.in_use() && voice.channel() == channel && voice.sustained() {
                        voice.release();
                    }
                }
            }
            ChannelAction::AllSoundOff => self.all_sound_off(channel),
            ChannelAction::AllNotesOff => self.all_notes_off(channel),
        }
    }

    // ------------------------------------------------------------------
    // Voice pool
    // ------------------------------------------------------------------

    /// Claim a voice slot.
    ///
    /// Returns the first free slot in index order; failing that, the
    /// lowest-index releasable voice is reset and reused; failing that,
    /// `None`.
    pub fn allocate(&mut self) -> Option<usize> {
        if let Some(index) = self.voices.iter().position(|v| !v.in_use()) {
            self.voices[index].claim();
            return Some(index);
        }

        let index = self.voices.iter().position(Voice::releasable)?;
        self.deallocate(index);
        self.voices[index].claim();
        #[cfg(feature = "tracing")]
        tracing::debug!(voice = index, "voice stolen");
        Some(index)
    }

    /// Return a voice to the at-rest state. Out-of-range indices are ignored.
    pub fn deallocate(&mut self, index: usize) {
        if let Some(voice) = self.voices.get_mut(index) {
            voice.reset();
        }
    }

    /// Start a note. Returns the voice index, or `None` when the pool is
    /// exhausted and nothing is stealable (the note is dropped).
    ///
    /// Velocity zero is treated as a note-off.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Option<usize> {
        let channel = channel & 0x0f;
        let note = note & 0x7f;
        let velocity = velocity & 0x7f;
        if velocity == 0 {
            self.note_off(channel, note);
            return None;
        }

        let Some(index) = self.allocate() else {
            #[cfg(feature = "tracing")]
            tracing::debug!(channel, note, "voice pool exhausted, note dropped");
            return None;
        };

        let patch_index = self
            .patches
            .resolve(self.channels[usize::from(channel)].program());
        let patch = *self.patches.get(patch_index);
        let step = self.notes.step(note);
        self.voices[index].start(channel, note, velocity, patch_index, &patch, step);
        Some(index)
    }

    /// Release every in-use voice playing `note` on `channel`.
    ///
    /// While the channel's sustain pedal is down the voices are only marked
    /// releasable; their envelopes keep running until the pedal comes up.
    pub fn note_off(&mut self, channel: u8, note: u8) {
        let channel = channel & 0x0f;
        let note = note & 0x7f;
        let held = self.channels[usize::from(channel)].sustain_pedal();
        for voice in self.voices.iter_mut() {
            if voice.in_use() && voice.channel() == channel && voice.note() == note {
                if held {
                    voice.hold();
                } else {
                    voice.release();
                }
            }
        }
    }

    /// Release every voice on `channel`, ignoring the sustain pedal.
    pub fn all_notes_off(&mut self, channel: u8) {
        let channel = channel & 0x0f;
        for voice in self.voices.iter_mut() {
            if voice.in_use() && voice.channel() == channel {
                voice.release();
            }
        }
    }

    /// Silence every voice on `channel` immediately.
    pub fn all_sound_off(&mut self, channel: u8) {
        let channel = channel & 0x0f;
        for voice in self.voices.iter_mut() {
            if voice.in_use() && voice.channel() == channel {
                voice.reset();
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(channel, "all sound off");
    }

    // ------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------

    /// Render one block of interleaved stereo into `out`.
    ///
    /// `out.len() / 2` frames are rendered; a trailing odd sample is left
    /// untouched. Output is added to what is already in `out`, so the caller
    /// clears it between blocks.
    pub fn render_block(&mut self, out: &mut [i32]) {
        let frames = out.len() / 2;
        let out = &mut out[..frames * 2];

        // envelopes first: voices that fall silent are freed before rendering
        for voice in self.voices.iter_mut() {
            if !voice.in_use() {
                continue;
            }
            voice.amp_env_mut().update();
            if !voice.amp_env().active() {
                voice.reset();
            }
        }

        let Self {
            voices,
            channels,
            patches,
            ..
        } = self;

        let mut scratch = [0i16; RENDER_CHUNK];

        for voice in voices.iter_mut() {
            if !voice.in_use() {
                continue;
            }
            let channel = &channels[usize::from(voice.channel() & 0x0f)];
            let patch = patches.get(voice.patch());

            // pitch
            let mut step = voice.osc().step_base();
            if channel.bend_index() != 0 {
                step = apply_multiplier(step, channel.bend_multiplier());
            }
            if let (Some(env), Some(pitch)) = (voice.pitch_env_mut(), patch.pitch) {
                let level = i32::from(env.update());
                let index = (level * i32::from(pitch.depth)) >> PITCH_ENV_SHIFT;
                if index != 0 {
                    step = frequency_modulate(step, index);
                }
            }
            let lfo = i32::from(voice.vibrato_mut().advance(frames));
            let depth = i32::from(patch.vibrato.depth & 0x7f) * i32::from(channel.mod_wheel());
            if depth != 0 {
                step = frequency_modulate(step, (lfo * depth) >> VIBRATO_SHIFT);
            }
            voice.osc_mut().set_step(step);

            // gain
            let mut gain = u32::from(voice.amp_env().level());
            gain = (gain * u32::from(patch.level & 0x7f)) >> 7;
            gain *= u32::from(voice.velocity());
            gain = (gain * u32::from(channel.volume())) >> 4;
            let (pan_left, pan_right) = channel.pan_gains();
            let gain_left = ((gain * u32::from(pan_left)) >> 16) as i32;
            let gain_right = ((gain * u32::from(pan_right)) >> 16) as i32;

            if gain_left == 0 && gain_right == 0 {
                voice.osc_mut().skip(frames);
                continue;
            }

            for chunk in out.chunks_mut(2 * RENDER_CHUNK) {
                let mono = &mut scratch[..chunk.len() / 2];
                voice.osc_mut().render(mono);
                for (frame, &sample) in chunk.chunks_exact_mut(2).zip(mono.iter()) {
                    let sample = i32::from(sample);
                    frame[0] += (gain_left * sample) >> 16;
                    frame[1] += (gain_right * sample) >> 16;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The voice pool.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// One voice, if `index` is in range.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// All sixteen channels.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// One channel (index masked to 4 bits).
    pub fn channel(&self, channel: u8) -> &Channel {
        &self.channels[usize::from(channel & 0x0f)]
    }

    /// The patch bank.
    pub fn patches(&self) -> &PatchBank {
        &self.patches
    }

    /// The note-step table for this engine's sample rate.
    pub fn note_table(&self) -> &NoteTable {
        &self.notes
    }

    /// Number of voices currently in use.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.in_use()).count()
    }

    /// Sample rate the note table was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::cc;

    type Small = SynthEngine<4>;

    #[test]
    fn allocation_is_in_index_order() {
        let mut synth = Small::new(44_100);
        for (i, note) in (60..64).enumerate() {
            assert_eq!(synth.note_on(0, note, 100), Some(i));
        }
        assert_eq!(synth.note_on(0, 70, 100), None);
        assert_eq!(synth.active_voice_count(), 4);
    }

    #[test]
    fn velocity_zero_is_note_off() {
        let mut synth = Small::new(44_100);
        synth.midi_in(0x90, 60, 100);
        synth.midi_in(0x90, 60, 0);
        assert!(synth.voices()[0].releasable());
    }

    #[test]
    fn program_change_does_not_touch_sounding_voices() {
        let mut synth = Small::new(44_100);
        synth.midi_in(0x90, 60, 100);
        synth.midi_in(0xc0, 2, 0);
        synth.midi_in(0x90, 61, 100);
        assert_eq!(synth.voices()[0].patch(), 0);
        assert_eq!(synth.voices()[1].patch(), 2);
    }

    #[test]
    fn system_and_data_status_are_ignored() {
        let mut synth = Small::new(44_100);
        synth.midi_in(0xf0, 1, 2);
        synth.midi_in(0x45, 60, 100);
        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn silent_voice_still_advances_phase() {
        let mut synth = Small::new(44_100);
        synth.midi_in(0xb0, cc::VOLUME, 0);
        synth.midi_in(0x90, 69, 100);
        let mut block = [0i32; 2 * 100];
        synth.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 0));
        let expected = synth.note_table().step(69).wrapping_mul(100) & picopoly_core::PHASE_MASK;
        assert_eq!(synth.voices()[0].osc().phase(), expected);
    }

    #[test]
    fn odd_buffer_leaves_trailing_sample() {
        let mut synth = Small::new(44_100);
        synth.midi_in(0x90, 69, 127);
        let mut block = [7i32; 2 * 64 + 1];
        synth.render_block(&mut block);
        assert_eq!(block[2 * 64], 7);
    }

    #[test]
    fn deallocate_out_of_range_is_ignored() {
        let mut synth = Small::new(44_100);
        synth.deallocate(99);
        assert!(synth.voice(99).is_none());
    }
}
