/// Log lines kept for a caller that is not polling
pub const MAX_PENDING_LOGS: usize = 64;

/// Playback events - advisory notifications for the UI
/// Events carry the engine time they describe and are released once the
/// clock reaches it. Nothing in scheduling waits on them, and events nobody
/// polls are pruned so the queue stays bounded.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StepTriggered { group: usize, pad: usize, velocity: u8 },
    ClockTick(usize),
    Log(String),
}

#[derive(Debug)]
struct Scheduled {
    due: f64,
    seq: u64,
    event: PlaybackEvent,
}

#[derive(Debug, Default)]
pub struct PlaybackEvents {
    pending: Vec<Scheduled>,
    seq: u64,
}

impl PlaybackEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: f64, event: PlaybackEvent) {
        self.seq += 1;
        self.pending.push(Scheduled {
            due,
            seq: self.seq,
            event,
        });
    }

    /// Take every event due at or before `now`, oldest first
    pub fn drain_due(&mut self, now: f64) -> Vec<PlaybackEvent> {
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = later;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.event).collect()
    }

    /// Drop undelivered step and clock events, keeping log lines
    pub fn discard_scheduled(&mut self) {
        self.pending.retain(|s| matches!(s.event, PlaybackEvent::Log(_)));
    }

    /// Drop step and clock events due before `cutoff` and keep only the
    /// newest `MAX_PENDING_LOGS` log lines
    pub fn prune(&mut self, cutoff: f64) {
        self.pending
            .retain(|s| matches!(s.event, PlaybackEvent::Log(_)) || s.due >= cutoff);

        let logs = self
            .pending
            .iter()
            .filter(|s| matches!(s.event, PlaybackEvent::Log(_)))
            .count();
        let mut excess = logs.saturating_sub(MAX_PENDING_LOGS);
        if excess > 0 {
            // pending is in push order, so the first logs are the oldest
            self.pending.retain(|s| {
                if excess > 0 && matches!(s.event, PlaybackEvent::Log(_)) {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
