//! Offline rendering of a timed event schedule.

use picopoly_core::IntDivider;
use picopoly_synth::{MidiEvent, SynthEngine};

use crate::OutputStage;

/// An event applied at a frame offset from the start of the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// Frame offset.
    pub frame: u64,
    /// Event to dispatch.
    pub event: MidiEvent,
}

impl ScheduledEvent {
    /// Schedule `event` at `frame`.
    pub const fn new(frame: u64, event: MidiEvent) -> Self {
        Self { frame, event }
    }

    /// Schedule `event` at a time in milliseconds.
    pub fn at_ms(ms: u64, sample_rate: u32, event: MidiEvent) -> Self {
        Self::new(ms * u64::from(sample_rate) / 1000, event)
    }
}

/// Render `total_frames` frames through `engine`, returning interleaved
/// 16-bit stereo.
///
/// Rendering proceeds in blocks of `block_size` frames (at least 1). Before
/// each block, every scheduled event whose frame is at or before the block
/// start is dispatched, so an event lands on the first block boundary at or
/// after its frame. The schedule need not be sorted; events with equal frames
/// keep their order.
pub fn render_offline<const VOICES: usize, D: IntDivider>(
    engine: &mut SynthEngine<VOICES, D>,
    schedule: &[ScheduledEvent],
    total_frames: usize,
    block_size: usize,
    stage: OutputStage,
) -> Vec<i16> {
    let block_size = block_size.max(1);

    let mut schedule = schedule.to_vec();
    schedule.sort_by_key(|e| e.frame);
    let mut pending = schedule.iter().peekable();

    let mut out = vec![0i16; total_frames * 2];
    let mut block = vec![0i32; block_size * 2];
    let mut start = 0usize;

    while start < total_frames {
        let frames = block_size.min(total_frames - start);

        while let Some(scheduled) = pending.next_if(|e| e.frame <= start as u64) {
            engine.dispatch(scheduled.event);
        }

        let block = &mut block[..frames * 2];
        block.fill(0);
        engine.render_block(block);
        stage.write_i16(block, &mut out[start * 2..(start + frames) * 2]);

        start += frames;
    }

    tracing::debug!(
        frames = total_frames,
        events = schedule.len(),
        unplayed = pending.count(),
        "offline render finished"
    );
    out
}
