/// Chord resolution: turns a `ChordSpec` into concrete, strummed notes.
///
/// The chain is interval table -> flux -> inversion -> voicing -> emission.
/// Everything here is pure apart from the caller-supplied random source.
use fastrand::Rng;

use crate::pattern::{ChordExtension, ChordQuality, ChordSpec, Voicing};

/// One resolved chord tone, relative to the chord's trigger time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordNote {
    pub note: u8,
    pub delay_ms: f64,
    pub velocity: u8,
}

/// Inversion and octave placement after the random flux pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluxOutcome {
    pub inversion: u8,
    pub octave_shift: i32,
}

/// Semitone offsets from the root for a quality and extension.
pub fn chord_intervals(quality: ChordQuality, extension: ChordExtension) -> Vec<i32> {
    let third = match quality {
        ChordQuality::Minor | ChordQuality::Diminished => 3,
        ChordQuality::Sus2 => 2,
        ChordQuality::Sus4 => 5,
        _ => 4,
    };
    let fifth = match quality {
        ChordQuality::Diminished => 6,
        ChordQuality::Augmented => 8,
        _ => 7,
    };
    let mut intervals = vec![0, third, fifth];

    match extension {
        ChordExtension::None => {}
        // A sixth chord swaps the fifth for the sixth instead of stacking
        ChordExtension::Sixth => {
            if let Some(last) = intervals.last_mut() {
                *last = 9;
            }
        }
        ChordExtension::Ninth | ChordExtension::Eleventh | ChordExtension::Thirteenth => {
            let seventh = match quality {
                ChordQuality::Major | ChordQuality::Augmented => 11,
                ChordQuality::Diminished => 9,
                _ => 10,
            };
            intervals.push(seventh);
            intervals.push(14);
            if matches!(extension, ChordExtension::Eleventh | ChordExtension::Thirteenth) {
                intervals.push(17);
            }
            if extension == ChordExtension::Thirteenth {
                intervals.push(21);
            }
        }
    }

    intervals
}

/// Rotate left `count` times; each rotated-out interval comes back an octave up.
pub fn invert(intervals: &[i32], count: u8) -> Vec<i32> {
    let mut notes = intervals.to_vec();
    for _ in 0..count {
        if notes.is_empty() {
            break;
        }
        let lowest = notes.remove(0);
        notes.push(lowest + 12);
    }
    notes
}

pub fn apply_voicing(mut intervals: Vec<i32>, voicing: Voicing) -> Vec<i32> {
    match voicing {
        Voicing::Close => {}
        Voicing::Wide => {
            if let Some(second) = intervals.get_mut(1) {
                *second += 12;
            }
        }
        Voicing::Open => {
            if let Some(second) = intervals.get_mut(1) {
                *second += 12;
            }
            if let Some(third) = intervals.get_mut(2) {
                *third += 24;
            }
        }
    }
    intervals
}

/// Note number of the chord root; octave 3, pitch class 0 is 48.
pub fn base_note(spec: &ChordSpec) -> i32 {
    (spec.octave() as i32 + 1) * 12 + spec.root() as i32
}

/// Randomly perturb inversion and octave with probability `flux%`.
pub fn apply_flux(spec: &ChordSpec, rng: &mut Rng) -> FluxOutcome {
    let mut outcome = FluxOutcome {
        inversion: spec.inversion(),
        octave_shift: 0,
    };
    let amount = spec.flux() as f64 / 100.0;
    if amount <= 0.0 || rng.f64() >= amount {
        return outcome;
    }

    if rng.f64() < 0.5 {
        outcome.inversion = (outcome.inversion + 1) % 4;
    }
    if spec.flux() > 60.0 && rng.f64() < 0.8 {
        outcome.octave_shift = if rng.bool() { 12 } else { -12 };
    }
    outcome
}

/// Resolve a chord trigger into strummed notes with per-note velocity spread.
/// Tones pushed outside the 0-127 note range are dropped.
pub fn resolve_chord(spec: &ChordSpec, base_velocity: u8, rng: &mut Rng) -> Vec<ChordNote> {
    let flux = apply_flux(spec, rng);
    let intervals = chord_intervals(spec.quality, spec.extension);
    let voiced = apply_voicing(invert(&intervals, flux.inversion), spec.voicing);
    let root = base_note(spec) + flux.octave_shift;

    let amount = spec.flux() as f64 / 100.0;
    let strum_ms = 5.0 + amount * 20.0;
    let spread = 20.0 * amount;

    voiced
        .iter()
        .enumerate()
        .filter_map(|(i, interval)| {
            let note = root + interval;
            if !(0..=127).contains(&note) {
                return None;
            }
            let jitter = if spread > 0.0 {
                (rng.f64() * 2.0 - 1.0) * spread
            } else {
                0.0
            };
            let velocity = (base_velocity as f64 + jitter).round().clamp(1.0, 127.0) as u8;
            Some(ChordNote {
                note: note as u8,
                delay_ms: i as f64 * strum_ms,
                velocity,
            })
        })
        .collect()
}
