//! MIDI input via midir.
//!
//! The midir callback thread is the ingest context. It decodes incoming bytes
//! with a [`MidiParser`] and pushes events into the producer half of the
//! event queue. A full queue is retried with a short bounded back-off; after
//! that the event is dropped and logged.

use crate::{Error, Result};
use midir::{Ignore, MidiInput, MidiInputConnection};
use picopoly_synth::queue::{HeapProd, Producer};
use picopoly_synth::{MidiEvent, MidiParser};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const CLIENT_NAME: &str = "picopoly";

/// Push attempts after the first before an event is dropped.
const PUSH_RETRIES: u32 = 4;

/// Wait between push attempts.
const PUSH_BACKOFF: Duration = Duration::from_micros(250);

/// MIDI input port information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortInfo {
    /// Port index (for connection).
    pub index: usize,
    /// Port name.
    pub name: String,
}

/// List available MIDI input ports.
pub fn list_midi_ports() -> Result<Vec<MidiPortInfo>> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| Error::Midi(e.to_string()))?;

    let ports = midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(index, port)| MidiPortInfo {
            index,
            name: midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Port {}", index)),
        })
        .collect();

    Ok(ports)
}

/// Decodes bytes into events and queues them for the render context.
///
/// This is the whole ingest path; [`MidiIngest`] runs one inside the midir
/// callback.
pub struct IngestSink {
    parser: MidiParser,
    producer: HeapProd<MidiEvent>,
    dropped: Arc<AtomicU64>,
}

impl IngestSink {
    /// Create a sink feeding `producer`.
    pub fn new(producer: HeapProd<MidiEvent>) -> Self {
        Self {
            parser: MidiParser::new(),
            producer,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Decode `bytes` and queue every complete event.
    pub fn feed(&mut self, bytes: &[u8]) {
        let Self {
            parser,
            producer,
            dropped,
        } = self;
        parser.feed(bytes, |event| push_with_backoff(producer, dropped, event));
    }

    /// Events dropped because the queue stayed full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn dropped_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }
}

fn push_with_backoff(producer: &mut HeapProd<MidiEvent>, dropped: &AtomicU64, event: MidiEvent) {
    let mut event = event;
    for attempt in 0..=PUSH_RETRIES {
        match producer.try_push(event) {
            Ok(()) => return,
            Err(rejected) => event = rejected,
        }
        if attempt < PUSH_RETRIES {
            std::thread::sleep(PUSH_BACKOFF);
        }
    }

    let total = dropped.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::warn!(
        status = event.status,
        data1 = event.data1,
        data2 = event.data2,
        dropped = total,
        "event queue full, MIDI event dropped"
    );
}

/// An open MIDI input connection feeding the event queue.
///
/// The port stays open until this value is dropped or closed.
pub struct MidiIngest {
    connection: MidiInputConnection<()>,
    port_name: String,
    dropped: Arc<AtomicU64>,
}

impl MidiIngest {
    /// Connect to an input port and start queueing its events.
    ///
    /// `port` is a case-insensitive name substring or a port index; `None`
    /// selects the first port.
    pub fn connect(port: Option<&str>, producer: HeapProd<MidiEvent>) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| Error::Midi(e.to_string()))?;
        // the parser drops these as well
        midi_in.ignore(Ignore::Sysex | Ignore::Time);

        let ports = midi_in.ports();
        let selected = match port {
            None => ports.first(),
            Some(search) => {
                let by_index = search.parse::<usize>().ok().and_then(|i| ports.get(i));
                let search_lower = search.to_lowercase();
                by_index.or_else(|| {
                    ports.iter().find(|p| {
                        midi_in
                            .port_name(p)
                            .map(|n| n.to_lowercase().contains(&search_lower))
                            .unwrap_or(false)
                    })
                })
            }
        };
        let Some(selected) = selected.cloned() else {
            return Err(Error::DeviceNotFound(match port {
                Some(search) => format!("no MIDI input matching '{}'", search),
                None => "no MIDI input ports".to_string(),
            }));
        };

        let port_name = midi_in
            .port_name(&selected)
            .unwrap_or_else(|_| "unknown".to_string());

        let mut sink = IngestSink::new(producer);
        let dropped = sink.dropped_counter();

        let connection = midi_in
            .connect(
                &selected,
                "picopoly-in",
                move |_stamp, message, _| sink.feed(message),
                (),
            )
            .map_err(|e| Error::Midi(e.to_string()))?;

        tracing::info!(port = %port_name, "MIDI input connected");

        Ok(Self {
            connection,
            port_name,
            dropped,
        })
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Events dropped because the queue stayed full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Close the port.
    pub fn close(self) {
        tracing::info!(port = %self.port_name, dropped = self.dropped(), "MIDI input closed");
        self.connection.close();
    }
}

impl std::fmt::Debug for MidiIngest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiIngest")
            .field("port_name", &self.port_name)
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picopoly_synth::queue::{Consumer, heap_event_queue};

    #[test]
    fn sink_decodes_running_status() {
        let (tx, mut rx) = heap_event_queue(8);
        let mut sink = IngestSink::new(tx);

        sink.feed(&[0x90, 60, 100]);
        sink.feed(&[62, 90, 0xF8, 64, 0]);

        assert_eq!(rx.try_pop(), Some(MidiEvent::note_on(0, 60, 100)));
        assert_eq!(rx.try_pop(), Some(MidiEvent::note_on(0, 62, 90)));
        assert_eq!(rx.try_pop(), Some(MidiEvent::new(0x90, 64, 0)));
        assert_eq!(rx.try_pop(), None);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn full_queue_drops_after_backoff() {
        let (tx, mut rx) = heap_event_queue(2);
        let mut sink = IngestSink::new(tx);

        sink.feed(&[0x90, 60, 100, 61, 100, 62, 100]);

        assert_eq!(sink.dropped(), 1);
        assert_eq!(rx.try_pop(), Some(MidiEvent::note_on(0, 60, 100)));
        assert_eq!(rx.try_pop(), Some(MidiEvent::note_on(0, 61, 100)));
        assert_eq!(rx.try_pop(), None);

        // space again: the next event goes through
        sink.feed(&[63, 100]);
        assert_eq!(rx.try_pop(), Some(MidiEvent::note_on(0, 63, 100)));
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn port_listing_does_not_panic() {
        // availability depends on the system
        let _ = list_midi_ports();
    }
}
