//! Deterministic Random Number Generator
//!
//! Uses the SplitMix64 algorithm for fast, well-distributed, deterministic
//! randomness. Given the same seed, produces an identical sequence on all
//! platforms, which makes every food placement in a session reproducible
//! from the recorded seed.

use serde::{Deserialize, Serialize};

/// Deterministic PRNG seeded from a 32-bit value.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of values on any platform (x86, ARM, WASM).
///
/// # Example
///
/// ```
/// use gridsnake::core::rng::GameRng;
///
/// let mut rng = GameRng::new(42);
/// assert_eq!(rng.next_below(10), 7); // Always the same!
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    seed: u32,
    state: u64,
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameRng {
    /// Create a new RNG from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            state: seed as u64,
        }
    }

    /// The seed this generator was created from, kept for audit trails.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Reset the generator to the start of a new seeded sequence.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
        self.state = seed as u64;
    }

    /// Generate the next 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        splitmix64(&mut self.state)
    }

    /// Generate a float in `[0, 1)` from the top 53 bits of the next value.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Generate an integer in `[0, max)`.
    ///
    /// Returns 0 when `max` is 0.
    #[inline]
    pub fn next_below(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_f64() * max as f64) as u32
    }
}

/// SplitMix64 step. Produces well-distributed values even from weak
/// sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================
