//! Packed C-Gear seeds
//!
//! A C-Gear boot seed is not hashed: it is assembled from a date/time
//! checksum, the hour and a delay counter, offset by the low 24 bits of the
//! MAC address.
//!
//! Decomposition does not validate its input. A reading that was not produced
//! by [`PackedSeed::compose`] with the same MAC wraps silently into
//! meaningless components.

use crate::constants::{BASE_YEAR, MAC_PACKED_MASK};

/// Components of a packed seed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedSeed {
    /// `(month * day + minute + second) & 0xFF`
    pub a: u32,
    /// Hour
    pub b: u32,
    /// Delay counter (already includes the year offset)
    pub delay: u32,
}

impl PackedSeed {
    /// Assemble the seed value
    pub fn compose(&self, mac: u64) -> u64 {
        let seed = ((self.a as u64) << 24) + ((self.b as u64) << 16) + self.delay as u64;
        seed + (mac & MAC_PACKED_MASK)
    }

    /// Split a seed back into its components
    pub fn decompose(seed: u32, mac: u64) -> Self {
        let value = seed.wrapping_sub((mac & MAC_PACKED_MASK) as u32);
        Self {
            a: value >> 24,
            b: (value >> 16) & 0xFF,
            delay: value & 0xFFFF,
        }
    }
}

/// Delay counter with the year offset removed
pub fn delay_without_year(delay: u32, year: i32) -> u32 {
    delay.wrapping_add((BASE_YEAR - year) as u32)
}

/// Delay counter with the year offset applied
pub fn delay_with_year(delay: u32, year: i32) -> u32 {
    delay.wrapping_add((year - BASE_YEAR) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_compose_formula() {
        let packed = PackedSeed { a: 0x12, b: 0x05, delay: 0x0345 };
        assert_eq!(packed.compose(0), 0x1205_0345);
        assert_eq!(packed.compose(0x0009_BF00_0001), 0x1205_0346);
    }

    #[test]
    fn test_round_trip_random_components() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let packed = PackedSeed {
                a: rng.gen_range(1..=255),
                b: rng.gen_range(0..=23),
                delay: rng.gen_range(0..=0xFFFF),
            };
            let mac: u64 = rng.gen_range(0..(1u64 << 48));
            let seed = packed.compose(mac) as u32;
            assert_eq!(PackedSeed::decompose(seed, mac), packed);
        }
    }

    #[test]
    fn test_year_offset_round_trip() {
        for year in [2000, 2011, 2023, 2099] {
            assert_eq!(delay_without_year(delay_with_year(600, year), year), 600);
        }
    }
}
