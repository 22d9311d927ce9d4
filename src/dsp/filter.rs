//! Chamberlin state-variable filter.
//!
//! One feedback network yields lowpass, highpass and bandpass outputs at the
//! same time; the instrument's [`FilterMode`] picks which one is heard.

use serde::{Deserialize, Serialize};

use crate::error::SonantError;

/// Filter output selector, encoded in songs as 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FilterMode {
    /// Pass the dry signal. The network still runs.
    #[default]
    Off = 0,
    Highpass = 1,
    Lowpass = 2,
    Bandpass = 3,
    Notch = 4,
}

impl TryFrom<u8> for FilterMode {
    type Error = SonantError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterMode::Off),
            1 => Ok(FilterMode::Highpass),
            2 => Ok(FilterMode::Lowpass),
            3 => Ok(FilterMode::Bandpass),
            4 => Ok(FilterMode::Notch),
            other => Err(SonantError::UnknownFilter(other)),
        }
    }
}

impl From<FilterMode> for u8 {
    fn from(m: FilterMode) -> u8 {
        m as u8
    }
}

/// Filter state for a single note. Construct a fresh one per note.
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    pub mode: FilterMode,
    /// Feedback scale in [0, 1].
    pub resonance: f64,
    low: f64,
    band: f64,
}

impl StateVariableFilter {
    pub fn new(mode: FilterMode, resonance: f64) -> Self {
        StateVariableFilter {
            mode,
            resonance,
            low: 0.0,
            band: 0.0,
        }
    }

    /// Convert a pre-warped angular cutoff to the tuning coefficient.
    #[inline]
    pub fn coefficient(angle: f64) -> f64 {
        1.5 * angle.sin()
    }

    /// Run one sample through the network with tuning coefficient `f`.
    #[inline]
    pub fn process(&mut self, input: f64, f: f64) -> f64 {
        self.low += f * self.band;
        let high = self.resonance * (input - self.band) - self.low;
        self.band += f * high;
        match self.mode {
            FilterMode::Off => input,
            FilterMode::Highpass => high,
            FilterMode::Lowpass => self.low,
            FilterMode::Bandpass => self.band,
            FilterMode::Notch => self.low + high,
        }
    }
}
