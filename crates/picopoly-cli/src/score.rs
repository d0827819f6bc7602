//! Plain-text event scores for offline rendering.
//!
//! One event per line:
//!
//! ```text
//! # time-ms  status  data1  [data2]
//! 0          90      69     100     # note on, channel 1
//! 0          c1      1              # program change, channel 2
//! 1000       80      69     0
//! ```
//!
//! The status byte is hexadecimal (with or without `0x`); data bytes are
//! decimal, or hexadecimal with `0x`. Everything after `#` is a comment.

use picopoly_io::ScheduledEvent;
use picopoly_synth::MidiEvent;

/// A score line that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("score line {line}: {message}")]
pub struct ScoreError {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub message: String,
}

impl ScoreError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Event time in milliseconds.
    pub ms: u64,
    /// The event.
    pub event: MidiEvent,
}

impl ScoreEntry {
    /// Schedule this entry at `sample_rate`.
    pub fn schedule(&self, sample_rate: u32) -> ScheduledEvent {
        ScheduledEvent::at_ms(self.ms, sample_rate, self.event)
    }
}

/// Parse a whole score.
pub fn parse_score(text: &str) -> Result<Vec<ScoreEntry>, ScoreError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        entries.push(parse_line(i + 1, line)?);
    }
    Ok(entries)
}

fn parse_line(number: usize, line: &str) -> Result<ScoreEntry, ScoreError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if !(3..=4).contains(&fields.len()) {
        return Err(ScoreError::new(
            number,
            format!("expected '<ms> <status> <data1> [data2]', got {} fields", fields.len()),
        ));
    }

    let ms = fields[0]
        .parse::<u64>()
        .map_err(|_| ScoreError::new(number, format!("invalid time '{}'", fields[0])))?;

    let status_text = fields[1]
        .strip_prefix("0x")
        .or_else(|| fields[1].strip_prefix("0X"))
        .unwrap_or(fields[1]);
    let status = u8::from_str_radix(status_text, 16)
        .map_err(|_| ScoreError::new(number, format!("invalid status '{}'", fields[1])))?;
    if !(0x80..=0xef).contains(&status) {
        return Err(ScoreError::new(
            number,
            format!("status {status:#04x} is not a channel-voice message"),
        ));
    }

    let data1 = parse_data(number, fields[2])?;
    let data2 = match fields.get(3) {
        Some(field) => parse_data(number, field)?,
        None => 0,
    };

    Ok(ScoreEntry {
        ms,
        event: MidiEvent::new(status, data1, data2),
    })
}

fn parse_data(number: usize, field: &str) -> Result<u8, ScoreError> {
    let value = match field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => field.parse::<u8>(),
    }
    .map_err(|_| ScoreError::new(number, format!("invalid data byte '{}'", field)))?;

    if value > 0x7f {
        return Err(ScoreError::new(number, format!("data byte {value} exceeds 127")));
    }
    Ok(value)
}
