use fastrand::Rng;

use crate::pattern::{StepSymbol, VelocityMode};

pub const HIGH_VELOCITY: u8 = 120;
pub const MID_VELOCITY: u8 = 85;
pub const LOW_VELOCITY: u8 = 50;

/// Velocity for a firing step, always in 1..=127. `None` for an Off step.
pub fn resolve_velocity(
    mode: VelocityMode,
    (a, b): (u8, u8),
    symbol: StepSymbol,
    rng: &mut Rng,
) -> Option<u8> {
    let velocity = match (mode, symbol) {
        (_, StepSymbol::Off) => return None,
        (VelocityMode::Symbol, StepSymbol::High) => HIGH_VELOCITY,
        (VelocityMode::Symbol, StepSymbol::Mid) => MID_VELOCITY,
        (VelocityMode::Symbol, StepSymbol::Low) => LOW_VELOCITY,
        (VelocityMode::Fixed, _) => a,
        (VelocityMode::Range, _) => rng.u8(a.min(b)..=a.max(b)),
    };
    Some(velocity.clamp(1, 127))
}
