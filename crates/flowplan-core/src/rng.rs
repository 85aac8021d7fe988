//! Deterministic PRNG for solver reseeding.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, and identical on
//! every platform, so a given seed always perturbs a problem the same way.

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRng {
    state: u64,
}

impl SeedRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplier in `[1 - magnitude, 1 + magnitude)`.
    pub fn jitter(&mut self, magnitude: f64) -> f64 {
        1.0 + magnitude * (2.0 * self.next_f64() - 1.0)
    }
}
