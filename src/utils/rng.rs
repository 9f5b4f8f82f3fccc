//! Seeded random number generator for reproducible runs.
//!
//! This module provides a lightweight xorshift-based PRNG that doesn't require
//! external dependencies. Weight initialization and dropout masks both draw
//! from it, so a fixed seed reproduces a training run exactly.

/// Simple RNG for reproducibility without external crates.
///
/// Uses the xorshift algorithm for fast, deterministic random number generation.
#[derive(Clone, Debug)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with an explicit seed (if zero, a fixed value is used).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    /// Basic xorshift to generate a u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Derive a new generator seeded from this one's stream.
    ///
    /// Gives each dropout layer its own stream, so a layer's mask sequence
    /// does not depend on how often sibling layers draw.
    pub fn fork(&mut self) -> Self {
        let a = self.next_u32() as u64;
        let b = self.next_u32() as u64;
        Self::new((a << 32) | b)
    }

    /// Convert to [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// Bernoulli trial: true with probability `p`.
    pub fn gen_bool(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}
