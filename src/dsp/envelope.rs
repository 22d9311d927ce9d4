//! Attack / sustain / release note envelope.
//!
//! Durations are sample counts. The envelope is a pure function of the
//! sample position inside the note, so voices can evaluate it without state.

/// Linear attack-sustain-release ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envelope {
    pub attack: u32,
    pub sustain: u32,
    pub release: u32,
}

impl Envelope {
    pub fn new(attack: u32, sustain: u32, release: u32) -> Self {
        Envelope {
            attack,
            sustain,
            release,
        }
    }

    /// Total note length in samples.
    pub fn len(&self) -> usize {
        self.attack as usize + self.sustain as usize + self.release as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Amplitude at `pos` samples after note onset.
    ///
    /// Rises from 0 over the attack, holds 1 during sustain and falls
    /// towards 0 over the release. Zero-length stages are skipped.
    #[inline]
    pub fn level(&self, pos: usize) -> f64 {
        let attack = self.attack as usize;
        let release_start = attack + self.sustain as usize;
        if pos < attack {
            pos as f64 / self.attack as f64
        } else if pos >= release_start {
            1.0 - (pos - release_start) as f64 / self.release as f64
        } else {
            1.0
        }
    }
}
