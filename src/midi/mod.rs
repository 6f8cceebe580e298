/// MIDI wire messages and the seams the engine talks through:
/// an output sink with timestamped delivery, a clock, and a host that
/// lists and opens output ports.
pub mod output;

use std::time::Instant;

use crate::error::Result;

pub use output::{MidirHost, MidirSink};

pub const ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    TimingClock,
    Start,
    Stop,
}

impl MidiMessage {
    pub fn all_notes_off(channel: u8) -> Self {
        MidiMessage::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            value: 0,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOff { channel, note } => vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
            MidiMessage::ControlChange { channel, controller, value } => {
                vec![0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F]
            }
            MidiMessage::TimingClock => vec![0xF8],
            MidiMessage::Start => vec![0xFA],
            MidiMessage::Stop => vec![0xFC],
        }
    }

    /// Parse a channel-voice or realtime message the engine emits
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [0xF8] => Some(MidiMessage::TimingClock),
            [0xFA] => Some(MidiMessage::Start),
            [0xFC] => Some(MidiMessage::Stop),
            [status, a, b] => {
                let channel = status & 0x0F;
                match status & 0xF0 {
                    0x90 => Some(MidiMessage::NoteOn { channel, note: a, velocity: b }),
                    0x80 => Some(MidiMessage::NoteOff { channel, note: a }),
                    0xB0 => Some(MidiMessage::ControlChange { channel, controller: a, value: b }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Accepts a message plus the absolute time it should go out.
/// Delivery is fire-and-forget; the sink honors the timestamp.
pub trait OutputSink {
    /// Current time in the sink's own timestamp domain, milliseconds
    fn now_ms(&self) -> f64;

    fn send(&mut self, bytes: &[u8], timestamp_ms: f64) -> Result<()>;
}

/// Monotonic time reference in seconds
pub trait ClockSource {
    fn now(&self) -> f64;
}

pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// The environment's MIDI backend: reports support, lists ports, opens one.
pub trait MidiHost {
    fn is_supported(&self) -> bool;

    fn output_names(&self) -> Result<Vec<String>>;

    fn open(&mut self, index: usize) -> Result<Box<dyn OutputSink>>;
}

/// Pick the first port whose name contains a preferred token (case-insensitive),
/// trying tokens in order; otherwise the first port. `None` when there are no ports.
pub fn select_port<S: AsRef<str>>(names: &[String], preferences: &[S]) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    preferences
        .iter()
        .map(|token| token.as_ref().to_lowercase())
        .filter(|token| !token.is_empty())
        .find_map(|token| lowered.iter().position(|name| name.contains(&token)))
        .or(Some(0))
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}
