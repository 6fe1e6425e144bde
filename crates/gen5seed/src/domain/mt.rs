//! MT19937 random number generator and the buffered IV list
//!
//! Gen 5 games draw IVs from a Mersenne Twister seeded with 32 bits of the
//! console seed. Each IV is the top 5 bits of one output, read through an
//! 8-entry ring buffer that slides forward by one output per advance.

use crate::constants::{IV_LIST_SHIFT, IV_LIST_SIZE};

/// State size (32-bit words)
const N: usize = 624;

/// Twist offset
const M: usize = 397;

const MATRIX_A: u32 = 0x9908_B0DF;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7FFF_FFFF;

/// Tempering masks
const TEMPERING_MASK_B: u32 = 0x9D2C_5680;
const TEMPERING_MASK_C: u32 = 0xEFC6_0000;

/// MT19937 random number generator
#[derive(Clone)]
pub struct Mt {
    state: [u32; N],
    idx: usize,
}

impl Mt {
    /// Create a new generator from a 32-bit seed
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1812433253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { state, idx: N }
    }

    /// Generate a tempered 32-bit value
    pub fn next(&mut self) -> u32 {
        if self.idx >= N {
            self.twist();
        }

        let mut y = self.state[self.idx];
        self.idx += 1;

        y ^= y >> 11;
        y ^= (y << 7) & TEMPERING_MASK_B;
        y ^= (y << 15) & TEMPERING_MASK_C;
        y ^= y >> 18;
        y
    }

    /// Discard `advances` outputs
    pub fn advance(&mut self, advances: u32) {
        let mut remaining = advances as usize;
        while remaining > 0 {
            if self.idx >= N {
                self.twist();
            }
            let step = remaining.min(N - self.idx);
            self.idx += step;
            remaining -= step;
        }
    }

    fn twist(&mut self) {
        for i in 0..N {
            let y = (self.state[i] & UPPER_MASK) | (self.state[(i + 1) % N] & LOWER_MASK);
            let mag = if y & 1 != 0 { MATRIX_A } else { 0 };
            self.state[i] = self.state[(i + M) % N] ^ (y >> 1) ^ mag;
        }
        self.idx = 0;
    }
}

/// Ring buffer of 5-bit MT outputs
///
/// Values are read with [`IvList::next_value`]; [`IvList::advance_state`] must be
/// called exactly once per advance, after that advance's values were consumed.
pub struct IvList {
    mt: Mt,
    list: [u8; IV_LIST_SIZE],
    head: usize,
    pointer: usize,
}

impl IvList {
    /// Fill the buffer from the generator's next outputs
    pub fn new(mut mt: Mt) -> Self {
        let list = std::array::from_fn(|_| (mt.next() >> IV_LIST_SHIFT) as u8);
        Self {
            mt,
            list,
            head: 0,
            pointer: 0,
        }
    }

    /// Read the value under the cursor and move the cursor forward
    #[inline]
    pub fn next_value(&mut self) -> u8 {
        let value = self.list[self.pointer];
        self.pointer = (self.pointer + 1) % IV_LIST_SIZE;
        value
    }

    /// Skip `count` buffered values
    #[inline]
    pub fn skip(&mut self, count: usize) {
        self.pointer = (self.pointer + count) % IV_LIST_SIZE;
    }

    /// Replace the oldest value with a fresh MT output and rewind the cursor
    pub fn advance_state(&mut self) {
        self.list[self.head] = (self.mt.next() >> IV_LIST_SHIFT) as u8;
        self.head = (self.head + 1) % IV_LIST_SIZE;
        self.pointer = self.head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mt_reference_seed_5489() {
        // First outputs of the reference implementation for the default seed
        let mut mt = Mt::new(5489);
        assert_eq!(mt.next(), 3499211612);
        assert_eq!(mt.next(), 581869302);
        assert_eq!(mt.next(), 3890346734);
    }

    #[test]
    fn test_advance_matches_sequential() {
        for skip in [0u32, 1, 100, 623, 624, 625, 1500] {
            let mut fast = Mt::new(0x1234_5678);
            let mut slow = Mt::new(0x1234_5678);
            fast.advance(skip);
            for _ in 0..skip {
                slow.next();
            }
            assert_eq!(fast.next(), slow.next(), "mismatch after skipping {}", skip);
        }
    }

    #[test]
    fn test_iv_list_values_are_five_bits() {
        let mut list = IvList::new(Mt::new(0xDEAD_BEEF));
        for _ in 0..50 {
            for _ in 0..6 {
                assert!(list.next_value() < 32);
            }
            list.advance_state();
        }
    }

    #[test]
    fn test_iv_list_slides_by_one_per_advance() {
        let mut list = IvList::new(Mt::new(99));
        let first: Vec<u8> = (0..7).map(|_| list.next_value()).collect();
        list.advance_state();
        let second: Vec<u8> = (0..6).map(|_| list.next_value()).collect();
        assert_eq!(&first[1..7], &second[..]);
    }

    #[test]
    fn test_iv_list_skip_moves_cursor() {
        let mut a = IvList::new(Mt::new(7));
        let mut b = IvList::new(Mt::new(7));
        a.skip(1);
        b.next_value();
        assert_eq!(a.next_value(), b.next_value());
    }
}
