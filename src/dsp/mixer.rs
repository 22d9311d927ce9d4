//! Mixer — the master accumulation buffer.
//!
//! Instruments are rendered one at a time into a private channel buffer and
//! summed here once finished. The words are atomics so a [`MixMeter`] on
//! another thread can read levels while rendering is still in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use super::note::{CHANNELS, SAMPLE_RATE};

/// Interleaved stereo `i32` accumulator shared with meters.
#[derive(Debug)]
pub struct MixBuffer {
    words: Arc<[AtomicI32]>,
}

impl MixBuffer {
    /// A zeroed buffer holding `frames` stereo frames.
    pub fn new(frames: usize) -> Self {
        let words: Vec<AtomicI32> = (0..frames * CHANNELS).map(|_| AtomicI32::new(0)).collect();
        MixBuffer {
            words: words.into(),
        }
    }

    /// Number of interleaved words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Add a finished channel buffer into the mix.
    ///
    /// The sum saturates; clamping to 16 bits happens at export.
    pub fn accumulate(&self, channel: &[i32]) {
        for (word, &s) in self.words.iter().zip(channel) {
            if s != 0 {
                let v = word.load(Ordering::Relaxed);
                word.store(v.saturating_add(s), Ordering::Relaxed);
            }
        }
    }

    /// Snapshot of the accumulated words.
    pub fn to_vec(&self) -> Vec<i32> {
        self.words.iter().map(|w| w.load(Ordering::Relaxed)).collect()
    }

    pub fn meter(&self) -> MixMeter {
        MixMeter {
            words: Arc::clone(&self.words),
        }
    }
}

/// Read-only view of a mix buffer for level metering.
#[derive(Debug, Clone)]
pub struct MixMeter {
    words: Arc<[AtomicI32]>,
}

impl MixMeter {
    /// `frames` stereo frames starting `t` seconds into the render, scaled so
    /// full 16-bit level reads as 1.0 (the mix can reach about ±2).
    ///
    /// Frames before the start or past the end of the buffer read as silence.
    /// Regions not rendered yet read as whatever has been accumulated so far.
    pub fn window(&self, t: f64, frames: usize) -> Vec<[f32; 2]> {
        if t.is_nan() || t < 0.0 {
            return vec![[0.0; 2]; frames];
        }
        let start = (t * SAMPLE_RATE as f64).floor() as usize * CHANNELS;
        (0..frames)
            .map(|f| {
                let k = start + f * CHANNELS;
                [self.level(k), self.level(k + 1)]
            })
            .collect()
    }

    fn level(&self, k: usize) -> f32 {
        self.words
            .get(k)
            .map_or(0.0, |w| w.load(Ordering::Relaxed) as f32 / 32768.0)
    }
}
