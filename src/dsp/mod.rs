//! DSP — note synthesis, effects, mixing and WAVE packaging.
//!
//! Everything runs at a fixed 44.1 kHz on interleaved stereo `i32` buffers,
//! so a render is bit-for-bit reproducible for a given song, range and seed.

pub mod delay;
pub mod engine;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod note;
pub mod oscillator;
pub mod voice;
pub mod wave;
