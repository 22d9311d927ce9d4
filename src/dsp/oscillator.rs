//! Naive phase-driven oscillators.
//!
//! Every oscillator maps an unbounded phase (in cycles) to an amplitude.
//! There is no band limiting: the player relies on the exact, cheap shapes.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::SonantError;

/// Supported waveform shapes, encoded in songs as 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Waveform {
    #[default]
    Sine = 0,
    Square = 1,
    Sawtooth = 2,
    Triangle = 3,
}

/// Oscillator functions indexed by `Waveform as usize`.
const OSCILLATORS: [fn(f64) -> f64; 4] = [osc_sine, osc_square, osc_saw, osc_triangle];

impl Waveform {
    /// Evaluate the waveform at `phase` (in cycles).
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        OSCILLATORS[self as usize](phase)
    }
}

impl TryFrom<u8> for Waveform {
    type Error = SonantError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Waveform::Sine),
            1 => Ok(Waveform::Square),
            2 => Ok(Waveform::Sawtooth),
            3 => Ok(Waveform::Triangle),
            other => Err(SonantError::UnknownWaveform(other)),
        }
    }
}

impl From<Waveform> for u8 {
    fn from(w: Waveform) -> u8 {
        w as u8
    }
}

fn osc_sine(phase: f64) -> f64 {
    (phase * TAU).sin()
}

fn osc_square(phase: f64) -> f64 {
    if phase % 1.0 < 0.5 { 1.0 } else { -1.0 }
}

/// Ramp from -0.5 to 0.5 over one cycle.
fn osc_saw(phase: f64) -> f64 {
    (phase % 1.0) - 0.5
}

fn osc_triangle(phase: f64) -> f64 {
    let v = (phase % 1.0) * 4.0;
    if v < 2.0 { v - 1.0 } else { 3.0 - v }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_zero_at_start() {
        let s = Waveform::Sine.sample(0.0);
        assert!(s.abs() < 1e-12, "Sine should start at 0, got {s}");
        let peak = Waveform::Sine.sample(0.25);
        assert!((peak - 1.0).abs() < 1e-12, "Sine peak at quarter cycle, got {peak}");
    }

    #[test]
    fn square_switches_at_half_cycle() {
        assert_eq!(Waveform::Square.sample(0.0), 1.0);
        assert_eq!(Waveform::Square.sample(0.49), 1.0);
        assert_eq!(Waveform::Square.sample(0.5), -1.0);
        assert_eq!(Waveform::Square.sample(3.75), -1.0);
    }

    #[test]
    fn saw_ramps_over_cycle() {
        assert_eq!(Waveform::Sawtooth.sample(0.0), -0.5);
        assert!((Waveform::Sawtooth.sample(2.25) - (-0.25)).abs() < 1e-12);
        assert!((Waveform::Sawtooth.sample(0.75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn triangle_shape() {
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 0.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.75), 0.0);
    }

    #[test]
    fn all_waveforms_bounded() {
        for w in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            for i in 0..10_000 {
                let s = w.sample(i as f64 * 0.0137);
                assert!((-1.0..=1.0).contains(&s), "{w:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn selector_round_trips_through_u8() {
        for code in 0u8..4 {
            let w = Waveform::try_from(code).unwrap();
            assert_eq!(u8::from(w), code);
        }
        assert!(matches!(
            Waveform::try_from(4),
            Err(SonantError::UnknownWaveform(4))
        ));
    }

    #[test]
    fn decodes_from_json_integer() {
        let w: Waveform = serde_json::from_str("3").unwrap();
        assert_eq!(w, Waveform::Triangle);
        assert!(serde_json::from_str::<Waveform>("9").is_err());
    }
}
