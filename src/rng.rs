//! Seedable randomness for the noise oscillator.
//!
//! Noise is the only non-deterministic input to a render. Routing it through
//! an explicit PCG32 stream makes every render reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x5eed_50aa_a17e;

/// Default generator type used by render sessions.
pub type NoiseRng = Pcg32;

/// Create the noise generator for `seed`.
pub fn create_rng(seed: u64) -> NoiseRng {
    Pcg32::seed_from_u64(seed)
}

/// Uniform white noise sample in [-1, 1).
#[inline]
pub fn white_noise<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    2.0 * rng.random::<f64>() - 1.0
}
