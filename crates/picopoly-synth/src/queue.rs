//! Single-producer/single-consumer event queue between the ingest and render
//! contexts.
//!
//! The queue is a `ringbuf` ring of [`MidiEvent`]s. On `no_std` targets use a
//! [`EventQueue`] (inline storage, split by reference); on hosts a heap ring
//! split into owned halves that can move to separate threads.
//!
//! ```rust
//! use picopoly_synth::queue::{EventQueue, Producer, SplitRef};
//! use picopoly_synth::{MidiEvent, SynthEngine};
//!
//! let mut queue = EventQueue::<64>::default();
//! let (mut tx, mut rx) = queue.split_ref();
//! tx.try_push(MidiEvent::note_on(0, 69, 100)).ok();
//!
//! let mut engine: SynthEngine = SynthEngine::new(44_100);
//! let mut block = [0i32; 2 * 128];
//! engine.process_block(&mut rx, &mut block);
//! assert_eq!(engine.active_voice_count(), 1);
//! ```

pub use ringbuf::StaticRb;
pub use ringbuf::traits::{Consumer, Observer, Producer, Split, SplitRef};

#[cfg(feature = "std")]
pub use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::event::MidiEvent;

/// Default queue capacity in events.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Statically sized event ring.
pub type EventQueue<const N: usize = EVENT_QUEUE_CAPACITY> = StaticRb<MidiEvent, N>;

/// Heap-allocated event ring, split into [`HeapProd`]/[`HeapCons`].
#[cfg(feature = "std")]
pub fn heap_event_queue(capacity: usize) -> (HeapProd<MidiEvent>, HeapCons<MidiEvent>) {
    HeapRb::<MidiEvent>::new(capacity.max(1)).split()
}
