//! MIDI event record and byte-stream parser.
//!
//! The engine consumes plain 3-byte channel-voice tuples. [`MidiParser`]
//! turns a serial byte stream (running status, interleaved real-time bytes,
//! SysEx) into those tuples; [`MidiEvent::from_usb_packet`] does the same for
//! 4-byte USB-MIDI event packets.

/// One channel-voice message.
///
/// Messages with a single data byte (program change, channel pressure)
/// carry `data2 = 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MidiEvent {
    /// Status byte (`0x80..=0xEF` for channel-voice messages).
    pub status: u8,
    /// First data byte.
    pub data1: u8,
    /// Second data byte.
    pub data2: u8,
}

impl MidiEvent {
    /// Build from raw bytes.
    #[inline]
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Note off.
    pub const fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(0x80 | (channel & 0x0f), note & 0x7f, velocity & 0x7f)
    }

    /// Note on. Velocity zero is a note off by convention.
    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(0x90 | (channel & 0x0f), note & 0x7f, velocity & 0x7f)
    }

    /// Control change.
    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(0xb0 | (channel & 0x0f), controller & 0x7f, value & 0x7f)
    }

    /// Program change.
    pub const fn program_change(channel: u8, program: u8) -> Self {
        Self::new(0xc0 | (channel & 0x0f), program & 0x7f, 0)
    }

    /// Channel pressure.
    pub const fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::new(0xd0 | (channel & 0x0f), pressure & 0x7f, 0)
    }

    /// Pitch bend from a 14-bit value (`8192` is center).
    pub const fn pitch_bend(channel: u8, value: u16) -> Self {
        Self::new(
            0xe0 | (channel & 0x0f),
            (value & 0x7f) as u8,
            ((value >> 7) & 0x7f) as u8,
        )
    }

    /// Decode a USB-MIDI event packet.
    ///
    /// Only cable 0 channel-voice packets (code index 0x8 to 0xE) are
    /// accepted; everything else returns `None`.
    pub fn from_usb_packet(packet: [u8; 4]) -> Option<Self> {
        let cable = packet[0] >> 4;
        let code = packet[0] & 0x0f;
        if cable != 0 || !(0x8..=0xe).contains(&code) {
            return None;
        }
        // the code index repeats the status high nibble
        if packet[1] >> 4 != code {
            return None;
        }
        Some(Self::new(packet[1], packet[2], packet[3]))
    }

    /// Status high nibble (`0x8..=0xF` for status bytes).
    #[inline]
    pub const fn command(&self) -> u8 {
        self.status >> 4
    }

    /// Channel (low nibble of the status).
    #[inline]
    pub const fn channel(&self) -> u8 {
        self.status & 0x0f
    }
}

/// Number of data bytes following a channel-voice status.
const fn data_len(status: u8) -> u8 {
    match status >> 4 {
        0xc | 0xd => 1,
        _ => 2,
    }
}

/// Serial MIDI byte-stream decoder.
///
/// - Running status is honoured for channel-voice messages.
/// - Real-time bytes (`0xF8..=0xFF`) are ignored and do not disturb a
///   message in progress.
/// - SysEx (`0xF0 .. 0xF7`) is skipped.
/// - System common messages cancel running status; their data bytes are
///   dropped along with any other stray data byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MidiParser {
    running: u8,
    data: [u8; 2],
    count: u8,
    in_sysex: bool,
}

impl MidiParser {
    /// New parser with no running status.
    pub const fn new() -> Self {
        Self {
            running: 0,
            data: [0; 2],
            count: 0,
            in_sysex: false,
        }
    }

    /// Feed one byte; returns an event when a message completes.
    pub fn push(&mut self, byte: u8) -> Option<MidiEvent> {
        match byte {
            0xf8..=0xff => None,
            0xf0 => {
                self.in_sysex = true;
                self.cancel();
                None
            }
            0xf1..=0xf7 => {
                self.in_sysex = false;
                self.cancel();
                None
            }
            0x80..=0xef => {
                self.in_sysex = false;
                self.running = byte;
                self.count = 0;
                None
            }
            _ => self.data_byte(byte),
        }
    }

    /// Feed a slice, calling `sink` for every completed event.
    pub fn feed(&mut self, bytes: &[u8], mut sink: impl FnMut(MidiEvent)) {
        for &byte in bytes {
            if let Some(event) = self.push(byte) {
                sink(event);
            }
        }
    }

    /// Forget running status and any partial message.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn cancel(&mut self) {
        self.running = 0;
        self.count = 0;
    }

    fn data_byte(&mut self, byte: u8) -> Option<MidiEvent> {
        if self.in_sysex || self.running == 0 {
            return None;
        }
        self.data[usize::from(self.count)] = byte;
        self.count += 1;
        if self.count < data_len(self.running) {
            return None;
        }
        self.count = 0;
        let data2 = if data_len(self.running) == 2 { self.data[1] } else { 0 };
        Some(MidiEvent::new(self.running, self.data[0], data2))
    }
}
