/// Core sequencer logic - lookahead scheduling of the pattern grid
/// The engine is driven by periodic `tick` calls at any cadence; every tick
/// that falls inside the lookahead window is sent with its exact timestamp.
use fastrand::Rng;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::harmony::resolve_chord;
use crate::midi::{select_port, ClockSource, MidiHost, MidiMessage, OutputSink, SystemClock};
use crate::pattern::{Pad, PlayMode, Project, StepSymbol, GROUP_COUNT, STEPS};

pub mod playback;
pub mod velocity;

#[cfg(test)]
mod test_support;

use playback::{PlaybackEvent, PlaybackEvents};
use velocity::resolve_velocity;

/// Clock pulses per 16th note (24 per quarter)
pub const PULSES_PER_STEP: usize = 6;
pub const STEPS_PER_BAR: u64 = 16;

/// Nominal 16th-note duration in seconds
pub fn step_duration_secs(bpm: u32) -> f64 {
    60.0 / bpm.max(1) as f64 * 0.25
}

/// Swing delay for a tick. Applies to odd tick indices only.
pub fn swing_offset_secs(step: u64, bpm: u32, swing: f32) -> f64 {
    if step % 2 == 0 {
        return 0.0;
    }
    step_duration_secs(bpm) * swing.clamp(0.0, 100.0) as f64 / 100.0
}

#[derive(Debug, Clone)]
pub struct Transport {
    step: u64,
    is_running: bool,
    bpm: u32,
    swing: f32,
    humanize: bool,
    global_bars: u32,
    send_transport: bool,
    suppress_transport_once: bool,
}

impl Transport {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            step: 0,
            is_running: false,
            bpm: config.bpm.max(1),
            swing: sanitize_swing(config.swing),
            humanize: config.humanize,
            global_bars: config.global_bars.max(1),
            send_transport: config.send_transport,
            suppress_transport_once: false,
        }
    }

    /// Ticks scheduled since `start`
    pub fn step_counter(&self) -> u64 {
        self.step
    }

    /// Position within the 64-step pattern
    pub fn pattern_step(&self) -> usize {
        (self.step % STEPS as u64) as usize
    }

    pub fn total_steps(&self) -> u64 {
        self.global_bars as u64 * STEPS_PER_BAR
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn swing(&self) -> f32 {
        self.swing
    }

    pub fn humanize(&self) -> bool {
        self.humanize
    }

    pub fn global_bars(&self) -> u32 {
        self.global_bars
    }

    pub fn send_transport(&self) -> bool {
        self.send_transport
    }

    pub fn suppress_transport_once(&self) -> bool {
        self.suppress_transport_once
    }

    fn sends_transport(&self) -> bool {
        self.send_transport && !self.suppress_transport_once
    }
}

fn sanitize_swing(swing: f32) -> f32 {
    if swing.is_finite() {
        swing.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub struct Sequencer {
    project: Project,
    transport: Transport,
    config: EngineConfig,
    clock: Box<dyn ClockSource>,
    sink: Option<Box<dyn OutputSink>>,
    /// Added to engine-clock milliseconds to get sink timestamps
    sink_offset_ms: f64,
    next_step_time: f64,
    events: PlaybackEvents,
    rng: Rng,
}

impl Sequencer {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: EngineConfig, clock: Box<dyn ClockSource>) -> Self {
        Self {
            project: Project::new(),
            transport: Transport::from_config(&config),
            config,
            clock,
            sink: None,
            sink_offset_ms: 0.0,
            next_step_time: 0.0,
            events: PlaybackEvents::new(),
            rng: Rng::new(),
        }
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = Rng::with_seed(seed);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Pad edits are picked up by the next scheduled tick, last write wins
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn pad_mut(&mut self, group: usize, pad: usize) -> Option<&mut Pad> {
        self.project.pad_mut(group, pad)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running
    }

    pub fn current_step(&self) -> usize {
        self.transport.pattern_step()
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.transport.bpm = bpm.max(1);
    }

    pub fn set_swing(&mut self, swing: f32) {
        self.transport.swing = sanitize_swing(swing);
    }

    pub fn set_global_bars(&mut self, bars: u32) {
        self.transport.global_bars = bars.max(1);
    }

    pub fn set_humanize(&mut self, humanize: bool) {
        self.transport.humanize = humanize;
    }

    pub fn set_send_transport(&mut self, send: bool) {
        self.transport.send_transport = send;
    }

    /// Skip start/stop transport messages until the next `stop`
    pub fn set_suppress_transport_once(&mut self, suppress: bool) {
        self.transport.suppress_transport_once = suppress;
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    /// Pick an output from the host's port list and link it.
    /// On failure the engine stays usable with sends as no-ops.
    pub fn connect(&mut self, host: &mut dyn MidiHost) -> Result<String> {
        self.disconnect();
        match self.open_output(host) {
            Ok((name, sink)) => {
                self.attach_sink(sink);
                self.log(format!("Connected to MIDI output: {}", name));
                Ok(name)
            }
            Err(e) => {
                self.warn(format!("MIDI unavailable: {}", e));
                Err(e)
            }
        }
    }

    fn open_output(&self, host: &mut dyn MidiHost) -> Result<(String, Box<dyn OutputSink>)> {
        if !host.is_supported() {
            return Err(EngineError::Unsupported);
        }
        let names = host.output_names()?;
        let index =
            select_port(&names, &self.config.port_preferences).ok_or(EngineError::NoDevices)?;
        let sink = host.open(index)?;
        Ok((names[index].clone(), sink))
    }

    /// Link a sink directly, capturing its clock offset
    pub fn attach_sink(&mut self, sink: Box<dyn OutputSink>) {
        if self.transport.is_running {
            self.stop();
        }
        self.sink_offset_ms = sink.now_ms() - self.clock.now() * 1000.0;
        self.sink = Some(sink);
    }

    pub fn disconnect(&mut self) {
        if self.transport.is_running {
            self.stop();
        }
        if self.sink.take().is_some() {
            log::debug!(target: "gridseq::sequencer", "MIDI output disconnected");
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.transport.is_running {
            self.stop();
        }
        if self.sink.is_none() {
            self.warn("Cannot start: no MIDI output connected");
            return Err(EngineError::NotConnected);
        }

        let now = self.clock.now();
        self.transport.step = 0;
        self.next_step_time = now + self.config.start_offset_secs;
        // Stamped at "now" so a stop issued during the start offset can never
        // reach the device ahead of it
        if self.transport.sends_transport() {
            self.dispatch(MidiMessage::Start, now);
        }
        self.transport.is_running = true;
        self.log(format!(
            "Playback started: {} BPM, {} bars",
            self.transport.bpm, self.transport.global_bars
        ));

        self.tick();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.halt();
        self.log("Playback stopped");
    }

    fn finish(&mut self) {
        self.halt();
        self.log(format!(
            "Playback complete after {} bars",
            self.transport.global_bars
        ));
    }

    /// Notes already handed to the sink keep their timestamps; only new
    /// scheduling stops. All-notes-off goes out immediately on every channel.
    fn halt(&mut self) {
        self.transport.is_running = false;
        let now = self.clock.now();
        if self.transport.sends_transport() {
            self.dispatch(MidiMessage::Stop, now);
        }
        for channel in 0..GROUP_COUNT as u8 {
            self.dispatch(MidiMessage::all_notes_off(channel), now);
        }
        self.transport.suppress_transport_once = false;
        self.events.discard_scheduled();
    }

    /// Schedule every tick whose time falls inside the lookahead window.
    pub fn tick(&mut self) {
        if !self.transport.is_running {
            return;
        }
        let now = self.clock.now();
        let horizon = now + self.config.lookahead_secs;

        while self.transport.is_running && self.next_step_time < horizon {
            if self.transport.step >= self.transport.total_steps() {
                self.finish();
                break;
            }
            self.schedule_step(self.transport.step, self.next_step_time);
            self.next_step_time += step_duration_secs(self.transport.bpm);
            self.transport.step += 1;
        }

        // Advisory events a lookahead window overdue are of no use to anyone
        self.events.prune(now - self.config.lookahead_secs);
    }

    fn schedule_step(&mut self, step: u64, time: f64) {
        let bpm = self.transport.bpm;
        let duration = step_duration_secs(bpm);
        let mut outgoing = Vec::new();

        for pulse in 0..PULSES_PER_STEP {
            let at = time + duration * pulse as f64 / PULSES_PER_STEP as f64;
            outgoing.push((MidiMessage::TimingClock, at));
        }

        let mut musical_time = time + swing_offset_secs(step, bpm, self.transport.swing);
        if self.transport.humanize {
            musical_time += self.rng.f64() * self.config.humanize_max_ms / 1000.0;
        }

        let index = (step % STEPS as u64) as usize;
        let mut triggered = Vec::new();
        for (g, group) in self.project.groups.iter().enumerate() {
            for (p, pad) in group.pads.iter().enumerate() {
                if pad.muted {
                    continue;
                }
                let symbol = pad.step(index);
                if let Some(velocity) =
                    pad_messages(pad, g as u8, symbol, musical_time, &mut self.rng, &mut outgoing)
                {
                    triggered.push((g, p, velocity));
                }
            }
        }

        log::debug!(
            target: "gridseq::sequencer",
            "step {} at {:.4}s: {} pads",
            index,
            musical_time,
            triggered.len()
        );

        for (message, at) in outgoing {
            self.dispatch(message, at);
        }
        for (group, pad, velocity) in triggered {
            self.events.push(
                musical_time,
                PlaybackEvent::StepTriggered { group, pad, velocity },
            );
        }
        self.events.push(musical_time, PlaybackEvent::ClockTick(index));
    }

    /// Fire one pad right away as if its step were High, outside the transport.
    pub fn preview_pad(&mut self, group: usize, pad: usize) -> Result<()> {
        if self.sink.is_none() {
            self.warn("Cannot preview: no MIDI output connected");
            return Err(EngineError::NotConnected);
        }
        let Some(target) = self.project.pad(group, pad) else {
            let err = EngineError::InvalidPad { group, pad };
            self.warn(format!("Cannot preview: {}", err));
            return Err(err);
        };
        let time = self.clock.now() + self.config.start_offset_secs;
        let mut outgoing = Vec::new();
        let velocity = pad_messages(
            target,
            group as u8,
            StepSymbol::High,
            time,
            &mut self.rng,
            &mut outgoing,
        );

        for (message, at) in outgoing {
            self.dispatch(message, at);
        }
        if let Some(velocity) = velocity {
            self.events
                .push(time, PlaybackEvent::StepTriggered { group, pad, velocity });
        }
        Ok(())
    }

    /// Step, clock and log events still waiting to be polled
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Events whose time has come, oldest first
    pub fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        let now = self.clock.now();
        self.events.drain_due(now)
    }

    fn dispatch(&mut self, message: MidiMessage, time: f64) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let timestamp_ms = time * 1000.0 + self.sink_offset_ms;
        if let Err(e) = sink.send(&message.to_bytes(), timestamp_ms) {
            log::warn!(target: "gridseq::sequencer", "{}", e);
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!(target: "gridseq::sequencer", "{}", message);
        let now = self.clock.now();
        self.events.push(now, PlaybackEvent::Log(message));
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!(target: "gridseq::sequencer", "{}", message);
        let now = self.clock.now();
        self.events.push(now, PlaybackEvent::Log(message));
    }
}

/// Queue the messages for one firing pad. Returns the resolved velocity,
/// or `None` when the step is Off.
fn pad_messages(
    pad: &Pad,
    channel: u8,
    symbol: StepSymbol,
    time: f64,
    rng: &mut Rng,
    outgoing: &mut Vec<(MidiMessage, f64)>,
) -> Option<u8> {
    let velocity = resolve_velocity(pad.velocity_mode, pad.velocity_params(), symbol, rng)?;
    let gate = pad.gate_ms() / 1000.0;

    match pad.play_mode {
        PlayMode::Single => push_note(outgoing, channel, pad.base_note(), velocity, time, gate),
        PlayMode::Chord => {
            for note in resolve_chord(&pad.chord, velocity, rng) {
                let at = time + note.delay_ms / 1000.0;
                push_note(outgoing, channel, note.note, note.velocity, at, gate);
            }
        }
    }
    Some(velocity)
}

fn push_note(
    outgoing: &mut Vec<(MidiMessage, f64)>,
    channel: u8,
    note: u8,
    velocity: u8,
    at: f64,
    gate: f64,
) {
    outgoing.push((MidiMessage::NoteOn { channel, note, velocity }, at));
    outgoing.push((MidiMessage::NoteOff { channel, note }, at + gate));
}
