//! Seeded pseudo-random number generation for the simulation.
//!
//! The simulation never touches system randomness. All variation
//! (spawn positions, barrage sizes, side picks) flows from a single
//! xorshift64 generator seeded at construction, so two simulations
//! with the same seed draw identical sequences.

use crate::math::Fixed;
use serde::{Deserialize, Serialize};

/// Deterministic xorshift64 generator.
///
/// Fast, compact and more than random enough for gameplay variation.
/// The internal state is serialized with the rest of the simulation,
/// so a restored snapshot continues the exact same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a generator from a seed.
    ///
    /// Xorshift cannot leave the all-zero state, so seed 0 is nudged.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniformly distributed integer in `[min, max]` inclusive.
    ///
    /// Returns `min` when the range is empty or inverted.
    pub fn next_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + u32::try_from(self.next_u64() % span).unwrap_or(0)
    }

    /// Fixed-point value in `[min, max)`.
    ///
    /// Draws 32 fractional bits, which maps exactly onto the
    /// fractional half of the fixed-point representation.
    pub fn next_fixed_range(&mut self, min: Fixed, max: Fixed) -> Fixed {
        if min >= max {
            return min;
        }
        let frac_bits = self.next_u64() & 0xFFFF_FFFF;
        // Bits land in [0, 1) by construction.
        let unit = Fixed::from_bits(frac_bits as i64);
        min + (max - min) * unit
    }

    /// Fair coin flip.
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// Raw generator state, for inclusion in state hashes.
    #[must_use]
    pub fn state_bits(&self) -> u64 {
        self.state
    }
}
