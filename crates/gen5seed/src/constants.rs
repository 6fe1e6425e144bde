//! Engine-wide constants
//!
//! Note: SHA-1 round constants live in domain/sha1.rs and MT19937 parameters in domain/mt.rs.

// =============================================================================
// Console RNG (64-bit LCG)
// =============================================================================

/// LCG multiplier
pub const LCG_MULTIPLIER: u64 = 0x5D58_8B65_6C07_8965;

/// LCG increment
pub const LCG_INCREMENT: u64 = 0x0026_9EC3;

// =============================================================================
// IV list stream
// =============================================================================

/// Number of buffered values in the IV list
pub const IV_LIST_SIZE: usize = 8;

/// Right shift applied to each MT output (keeps the top 5 bits)
pub const IV_LIST_SHIFT: u32 = 27;

/// Extra MT advances applied before the C-Gear IV list is filled
pub const CGEAR_IV_SKIP: u32 = 2;

/// Extra MT advances of the stationary C-Gear IV protocol
pub const CGEAR_STATIONARY_SKIP: u32 = 6;

/// IV list offset used by Black 2 / White 2 boot searches
pub const BW2_IV_OFFSET: u32 = 2;

// =============================================================================
// Personality post-processing
// =============================================================================

/// Personality bit that carries the ability slot
pub const ABILITY_BIT: u32 = 0x10000;

/// Shiny value distance below which a match counts as a star
pub const STAR_THRESHOLD: u16 = 8;

/// Bound of the 13-bit seed snapshot draw
pub const SNAPSHOT_BOUND: u32 = 0x1FFF;

/// Cute Charm trigger threshold (after scaling by 656)
pub const CUTE_CHARM_THRESHOLD: u32 = 67;

/// Cute Charm scaling divisor
pub const CUTE_CHARM_DIVISOR: u32 = 656;

/// Number of natures
pub const NATURE_COUNT: u32 = 25;

/// Gender ratio value of genderless species
pub const GENDERLESS: u8 = 255;

/// Gender ratio value of female-only species
pub const FEMALE_ONLY: u8 = 254;

/// Gender ratio value of male-only species
pub const MALE_ONLY: u8 = 0;

// =============================================================================
// Search spaces
// =============================================================================

/// Packed seed component `a` range (month * day + minute + second checksum)
pub const PACKED_A_MIN: u32 = 1;
pub const PACKED_A_MAX: u32 = 255;

/// Packed seed component `b` range (hour)
pub const PACKED_B_MAX: u32 = 23;

/// Base year of delay offsets
pub const BASE_YEAR: i32 = 2000;

/// Mask applied to the MAC address for packed seeds
pub const MAC_PACKED_MASK: u64 = 0xFF_FFFF;
