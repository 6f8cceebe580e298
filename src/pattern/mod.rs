/// Pattern data model - groups of pads, each with a 64-step lane
/// Sizes are fixed; indices never change after creation
pub mod chord;

pub use chord::{ChordExtension, ChordQuality, ChordSpec, Voicing};

pub const STEPS: usize = 64;
pub const PADS_PER_GROUP: usize = 12;
pub const GROUP_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepSymbol {
    #[default]
    Off,
    High,
    Mid,
    Low,
}

impl StepSymbol {
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'X' => StepSymbol::High,
            'M' => StepSymbol::Mid,
            'L' => StepSymbol::Low,
            _ => StepSymbol::Off,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            StepSymbol::Off => 'O',
            StepSymbol::High => 'X',
            StepSymbol::Mid => 'M',
            StepSymbol::Low => 'L',
        }
    }

    /// Next symbol when a step is clicked
    pub fn next(self) -> Self {
        match self {
            StepSymbol::Off => StepSymbol::High,
            StepSymbol::High => StepSymbol::Mid,
            StepSymbol::Mid => StepSymbol::Low,
            StepSymbol::Low => StepSymbol::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self != StepSymbol::Off
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VelocityMode {
    /// High/Mid/Low map to fixed velocities
    #[default]
    Symbol,
    /// Velocity parameter A verbatim
    Fixed,
    /// Uniform random between the two parameters
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Single,
    Chord,
}

#[derive(Debug, Clone)]
pub struct Pad {
    steps: [StepSymbol; STEPS],
    automation: [u8; STEPS],
    /// Controller id the automation lane targets
    pub automation_target: u8,
    base_note: u8,
    gate_ms: f64,
    pub velocity_mode: VelocityMode,
    velocity_a: u8,
    velocity_b: u8,
    pub muted: bool,
    pub play_mode: PlayMode,
    pub chord: ChordSpec,
}

impl Pad {
    pub fn new(base_note: u8) -> Self {
        Self {
            steps: [StepSymbol::Off; STEPS],
            automation: [0; STEPS],
            automation_target: 1,
            base_note: base_note.min(127),
            gate_ms: 100.0,
            velocity_mode: VelocityMode::Symbol,
            velocity_a: 100,
            velocity_b: 127,
            muted: false,
            play_mode: PlayMode::Single,
            chord: ChordSpec::default(),
        }
    }

    pub fn steps(&self) -> &[StepSymbol; STEPS] {
        &self.steps
    }

    /// Step at `index`, wrapping modulo the lane length
    pub fn step(&self, index: usize) -> StepSymbol {
        self.steps[index % STEPS]
    }

    pub fn set_step(&mut self, index: usize, symbol: StepSymbol) {
        if let Some(step) = self.steps.get_mut(index) {
            *step = symbol;
        }
    }

    pub fn cycle_step(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            *step = step.next();
        }
    }

    pub fn clear(&mut self) {
        self.steps = [StepSymbol::Off; STEPS];
    }

    /// Load a pattern string such as `"XOOO"`, tiling it across all 64 steps.
    /// Longer input is cut at 64; empty input clears the pad.
    pub fn load_pattern(&mut self, pattern: &str) {
        let symbols: Vec<StepSymbol> = pattern.chars().map(StepSymbol::from_char).collect();
        if symbols.is_empty() {
            self.clear();
            return;
        }
        for (i, step) in self.steps.iter_mut().enumerate() {
            *step = symbols[i % symbols.len()];
        }
    }

    pub fn pattern_string(&self) -> String {
        self.steps.iter().map(|s| s.to_char()).collect()
    }

    pub fn automation(&self) -> &[u8; STEPS] {
        &self.automation
    }

    pub fn set_automation(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.automation.get_mut(index) {
            *slot = value.min(127);
        }
    }

    pub fn base_note(&self) -> u8 {
        self.base_note
    }

    pub fn set_base_note(&mut self, note: u8) {
        self.base_note = note.min(127);
    }

    pub fn gate_ms(&self) -> f64 {
        self.gate_ms
    }

    /// Gate must stay positive; non-finite or non-positive values are ignored
    pub fn set_gate_ms(&mut self, gate_ms: f64) {
        if gate_ms.is_finite() && gate_ms > 0.0 {
            self.gate_ms = gate_ms;
        }
    }

    pub fn velocity_params(&self) -> (u8, u8) {
        (self.velocity_a, self.velocity_b)
    }

    pub fn set_velocity_params(&mut self, a: u8, b: u8) {
        self.velocity_a = a.clamp(1, 127);
        self.velocity_b = b.clamp(1, 127);
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub pads: [Pad; PADS_PER_GROUP],
}

impl Group {
    fn new() -> Self {
        // Pads default to a chromatic run from C1, the usual drum-map origin
        Self {
            pads: std::array::from_fn(|i| Pad::new(36 + i as u8)),
        }
    }
}

/// The whole grid: four groups, one per output channel.
#[derive(Debug, Clone)]
pub struct Project {
    pub groups: [Group; GROUP_COUNT],
}

impl Project {
    pub fn new() -> Self {
        Self {
            groups: std::array::from_fn(|_| Group::new()),
        }
    }

    pub fn pad(&self, group: usize, pad: usize) -> Option<&Pad> {
        self.groups.get(group)?.pads.get(pad)
    }

    pub fn pad_mut(&mut self, group: usize, pad: usize) -> Option<&mut Pad> {
        self.groups.get_mut(group)?.pads.get_mut(pad)
    }

    /// Load one pattern string per pad of a group; missing entries leave pads untouched
    pub fn load_group_patterns(&mut self, group: usize, patterns: &[&str]) {
        if let Some(group) = self.groups.get_mut(group) {
            for (pad, pattern) in group.pads.iter_mut().zip(patterns) {
                pad.load_pattern(pattern);
            }
        }
    }

    pub fn clear(&mut self) {
        for group in &mut self.groups {
            for pad in &mut group.pads {
                pad.clear();
            }
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_has_fixed_shape() {
        let project = Project::new();
        assert_eq!(project.groups.len(), 4);
        assert!(project.groups.iter().all(|g| g.pads.len() == 12));
        assert!(project.pad(4, 0).is_none());
        assert!(project.pad(0, 12).is_none());
        assert_eq!(project.pad(0, 0).unwrap().base_note(), 36);
    }

    #[test]
    fn short_pattern_tiles_sixteen_times() {
        let mut pad = Pad::new(36);
        pad.load_pattern("XOOO");
        let steps = pad.steps();
        assert_eq!(steps.len(), 64);
        for (i, step) in steps.iter().enumerate() {
            let expected = if i % 4 == 0 { StepSymbol::High } else { StepSymbol::Off };
            assert_eq!(*step, expected);
        }
        assert_eq!(pad.pattern_string(), "XOOO".repeat(16));
    }

    #[test]
    fn long_pattern_truncates_and_empty_clears() {
        let mut pad = Pad::new(36);
        let long = "ML".repeat(40);
        pad.load_pattern(&long);
        assert_eq!(pad.pattern_string(), "ML".repeat(32));

        pad.load_pattern("");
        assert!(pad.steps().iter().all(|s| *s == StepSymbol::Off));
    }

    #[test]
    fn step_cycles_through_symbols() {
        let mut pad = Pad::new(36);
        pad.cycle_step(3);
        assert_eq!(pad.step(3), StepSymbol::High);
        pad.cycle_step(3);
        pad.cycle_step(3);
        assert_eq!(pad.step(3), StepSymbol::Low);
        pad.cycle_step(3);
        assert_eq!(pad.step(3), StepSymbol::Off);
        assert_eq!(pad.step(64 + 3), pad.step(3));
    }

    #[test]
    fn setters_hold_invariants() {
        let mut pad = Pad::new(200);
        assert_eq!(pad.base_note(), 127);

        pad.set_velocity_params(0, 200);
        assert_eq!(pad.velocity_params(), (1, 127));

        pad.set_gate_ms(-5.0);
        assert_eq!(pad.gate_ms(), 100.0);
        pad.set_gate_ms(250.0);
        assert_eq!(pad.gate_ms(), 250.0);

        pad.set_automation(0, 255);
        assert_eq!(pad.automation()[0], 127);
    }

    #[test]
    fn group_patterns_load_in_pad_order() {
        let mut project = Project::new();
        project.load_group_patterns(2, &["X", "OX"]);
        assert_eq!(project.pad(2, 0).unwrap().step(1), StepSymbol::High);
        assert_eq!(project.pad(2, 1).unwrap().step(1), StepSymbol::High);
        assert_eq!(project.pad(2, 1).unwrap().step(0), StepSymbol::Off);
        assert_eq!(project.pad(2, 2).unwrap().step(0), StepSymbol::Off);
    }
}
