/// MIDI output using midir
/// midir sends immediately, so the sink hands messages to a dispatcher
/// thread that holds them until their timestamp comes due.
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use midir::{MidiOutput, MidiOutputConnection};

use super::{MidiHost, OutputSink};
use crate::error::{EngineError, Result};

pub struct MidirHost {
    client_name: String,
}

impl MidirHost {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn midi_out(&self) -> Result<MidiOutput> {
        MidiOutput::new(&self.client_name)
            .map_err(|e| EngineError::Init(format!("Failed to create MIDI output: {}", e)))
    }
}

impl MidiHost for MidirHost {
    fn is_supported(&self) -> bool {
        MidiOutput::new(&self.client_name).is_ok()
    }

    fn output_names(&self) -> Result<Vec<String>> {
        let midi_out = self.midi_out()?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect())
    }

    fn open(&mut self, index: usize) -> Result<Box<dyn OutputSink>> {
        let midi_out = self.midi_out()?;
        let ports = midi_out.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| EngineError::Init(format!("Invalid port index: {}", index)))?;
        let connection = midi_out
            .connect(port, &self.client_name)
            .map_err(|e| EngineError::Init(format!("Failed to connect: {}", e)))?;
        Ok(Box::new(MidirSink::spawn(connection)))
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    at: Instant,
    seq: u64,
    bytes: Vec<u8>,
}

enum Command {
    Send(Pending),
    Shutdown,
}

pub struct MidirSink {
    epoch: Instant,
    sender: Sender<Command>,
    seq: u64,
    worker: Option<JoinHandle<()>>,
}

impl MidirSink {
    fn spawn(connection: MidiOutputConnection) -> Self {
        let (sender, receiver) = channel();
        let worker = thread::spawn(move || dispatch(connection, receiver));
        Self {
            epoch: Instant::now(),
            sender,
            seq: 0,
            worker: Some(worker),
        }
    }
}

impl OutputSink for MidirSink {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn send(&mut self, bytes: &[u8], timestamp_ms: f64) -> Result<()> {
        let offset = Duration::from_secs_f64(timestamp_ms.max(0.0) / 1000.0);
        self.seq += 1;
        self.sender
            .send(Command::Send(Pending {
                at: self.epoch + offset,
                seq: self.seq,
                bytes: bytes.to_vec(),
            }))
            .map_err(|_| EngineError::Send("MIDI dispatcher has shut down".to_string()))
    }
}

impl Drop for MidirSink {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn dispatch(mut connection: MidiOutputConnection, receiver: Receiver<Command>) {
    let mut queue: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();

    loop {
        let now = Instant::now();
        while queue.peek().is_some_and(|Reverse(p)| p.at <= now) {
            if let Some(Reverse(pending)) = queue.pop() {
                if let Err(e) = connection.send(&pending.bytes) {
                    log::warn!(target: "gridseq::midi", "Failed to send MIDI message: {}", e);
                }
            }
        }

        let command = match queue.peek() {
            Some(Reverse(next)) => receiver.recv_timeout(next.at.saturating_duration_since(now)),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match command {
            Ok(Command::Send(pending)) => queue.push(Reverse(pending)),
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    connection.close();
    log::debug!(target: "gridseq::midi", "MIDI dispatcher stopped");
}
