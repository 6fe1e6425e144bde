//! 64-bit linear congruential generator used by Gen 5 games
//!
//! Every bounded draw of the console RNG scales the upper 32 bits of the state
//! with a 64-bit multiply followed by a 32-bit shift.

use crate::constants::{LCG_INCREMENT, LCG_MULTIPLIER};

/// Console RNG (BW / BW2 LCG)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BwRng {
    seed: u64,
}

impl BwRng {
    /// Create a generator positioned at `seed`
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Current internal state
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Step once and return the new 64-bit state
    #[inline]
    pub fn next(&mut self) -> u64 {
        self.seed = self
            .seed
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.seed
    }

    /// Step once and return the upper 32 bits
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    /// Step once and scale the upper 32 bits into `0..bound`
    #[inline]
    pub fn next_u32_bounded(&mut self, bound: u32) -> u32 {
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }

    /// Apply the step function `advances` times
    pub fn advance(&mut self, advances: u32) {
        for _ in 0..advances {
            self.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_matches_formula() {
        let mut rng = BwRng::new(0);
        assert_eq!(rng.next(), LCG_INCREMENT);
        assert_eq!(
            rng.next(),
            LCG_INCREMENT
                .wrapping_mul(LCG_MULTIPLIER)
                .wrapping_add(LCG_INCREMENT)
        );
    }

    #[test]
    fn test_next_u32_is_upper_half() {
        let mut a = BwRng::new(0x1234_5678_9ABC_DEF0);
        let mut b = a;
        assert_eq!(a.next_u32(), (b.next() >> 32) as u32);
    }

    #[test]
    fn test_bounded_draw_stays_in_range() {
        let mut rng = BwRng::new(0xDEAD_BEEF);
        for _ in 0..1000 {
            assert!(rng.next_u32_bounded(25) < 25);
        }
    }

    #[test]
    fn test_bounded_draw_is_multiply_shift() {
        let mut a = BwRng::new(0xCAFE_BABE);
        let mut b = a;
        let high = b.next_u32() as u64;
        assert_eq!(a.next_u32_bounded(101) as u64, (high * 101) >> 32);
    }

    #[test]
    fn test_advance_matches_repeated_next() {
        let mut a = BwRng::new(42);
        let mut b = BwRng::new(42);
        a.advance(17);
        for _ in 0..17 {
            b.next();
        }
        assert_eq!(a, b);
    }
}
