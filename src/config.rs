/// Engine configuration, loadable from TOML.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Output-port name tokens tried in order before falling back to the first port.
pub const DEFAULT_PORT_PREFERENCES: [&str; 4] = ["op-xy", "op-z", "op-1", "teenage"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Client name announced to the MIDI backend
    pub client_name: String,
    /// How far ahead of "now" ticks are committed to the sink
    pub lookahead_secs: f64,
    /// Delay between `start` and the first tick
    pub start_offset_secs: f64,
    /// Upper bound of the uniform timing jitter when humanize is on
    pub humanize_max_ms: f64,
    pub bpm: u32,
    /// Swing amount, 0-100 %
    pub swing: f32,
    pub global_bars: u32,
    pub humanize: bool,
    pub send_transport: bool,
    pub port_preferences: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client_name: "gridseq".to_string(),
            lookahead_secs: 0.1,
            start_offset_secs: 0.1,
            humanize_max_ms: 15.0,
            bpm: 120,
            swing: 0.0,
            global_bars: 4,
            humanize: false,
            send_transport: true,
            port_preferences: DEFAULT_PORT_PREFERENCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Timing values must be finite; the lookahead must be positive.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("lookahead_secs", self.lookahead_secs, self.lookahead_secs > 0.0),
            ("start_offset_secs", self.start_offset_secs, self.start_offset_secs >= 0.0),
            ("humanize_max_ms", self.humanize_max_ms, self.humanize_max_ms >= 0.0),
        ];
        for (name, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(EngineError::InvalidValue(format!("{} = {}", name, value)));
            }
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
