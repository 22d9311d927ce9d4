//! Note numbering and equal-tempered frequency table.

/// Sample rate every song is rendered at.
pub const SAMPLE_RATE: u32 = 44100;

/// Output channel count (interleaved stereo).
pub const CHANNELS: usize = 2;

/// Note index the table is anchored at.
const REFERENCE_NOTE: f64 = 128.0;

/// Phase increment (cycles per sample) of the reference note.
const REFERENCE_FREQ: f64 = 0.00390625;

const SEMITONE: f64 = 1.059463094;

/// Phase increment per sample for note index `n`.
///
/// `n` may carry fractional or negative offsets; no bounds are applied.
#[inline]
pub fn note_frequency(n: f64) -> f64 {
    REFERENCE_FREQ * SEMITONE.powf(n - REFERENCE_NOTE)
}
