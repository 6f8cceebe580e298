/// GRIDSEQ - A pattern-sequencing engine for external MIDI devices
///
/// This library provides the core components:
/// - Pattern grid of 4 groups x 12 pads x 64 steps
/// - Chord resolution with inversion, voicing and random flux
/// - Lookahead scheduler emitting timestamped MIDI with swing and humanize
/// - MIDI output for production use

pub mod config;
pub mod error;
pub mod harmony;
pub mod midi;
pub mod pattern;
pub mod sequencer;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::EngineError;
pub use midi::{midi_note_name, ClockSource, MidiHost, MidiMessage, MidirHost, OutputSink};
pub use pattern::{Pad, Project, StepSymbol};
pub use sequencer::playback::PlaybackEvent;
pub use sequencer::Sequencer;
