/// Deterministic clock, recording sink and fake host for driving the engine in tests.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::midi::{ClockSource, MidiHost, MidiMessage, OutputSink};

use super::Sequencer;

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn set(&self, secs: f64) {
        self.0.set(secs);
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sent {
    pub message: MidiMessage,
    pub timestamp_ms: f64,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Rc<RefCell<Vec<Sent>>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.borrow().clone()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }

    pub fn filtered(&self, keep: impl Fn(&MidiMessage) -> bool) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| keep(&s.message)).collect()
    }

    pub fn note_ons(&self) -> Vec<Sent> {
        self.filtered(|m| matches!(m, MidiMessage::NoteOn { .. }))
    }

    pub fn note_offs(&self) -> Vec<Sent> {
        self.filtered(|m| matches!(m, MidiMessage::NoteOff { .. }))
    }

    pub fn count(&self, message: MidiMessage) -> usize {
        self.filtered(|m| *m == message).len()
    }
}

impl OutputSink for RecordingSink {
    fn now_ms(&self) -> f64 {
        0.0
    }

    fn send(&mut self, bytes: &[u8], timestamp_ms: f64) -> Result<()> {
        let message = MidiMessage::from_bytes(bytes)
            .ok_or_else(|| EngineError::Send(format!("unexpected bytes {:?}", bytes)))?;
        self.sent.borrow_mut().push(Sent { message, timestamp_ms });
        Ok(())
    }
}

pub struct FakeHost {
    pub supported: bool,
    pub names: Vec<String>,
    pub sink: RecordingSink,
    pub opened: Option<usize>,
}

impl FakeHost {
    pub fn with_ports(names: &[&str]) -> Self {
        Self {
            supported: true,
            names: names.iter().map(|n| n.to_string()).collect(),
            sink: RecordingSink::default(),
            opened: None,
        }
    }
}

impl MidiHost for FakeHost {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn output_names(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn open(&mut self, index: usize) -> Result<Box<dyn OutputSink>> {
        self.opened = Some(index);
        Ok(Box::new(self.sink.clone()))
    }
}

/// Connected engine at t = 0 with a seeded random source and an empty sink log
pub fn connected_engine(config: EngineConfig) -> (Sequencer, ManualClock, RecordingSink) {
    let clock = ManualClock::default();
    let mut seq = Sequencer::with_clock(config, Box::new(clock.clone()));
    seq.seed_rng(0x5eed);
    let mut host = FakeHost::with_ports(&["Test Port"]);
    seq.connect(&mut host).unwrap();
    let sink = host.sink.clone();
    sink.clear();
    seq.poll_events();
    (seq, clock, sink)
}
