//! Console and save-file profile
//!
//! A profile pins down every boot-hash input that does not vary between
//! boots, plus the trainer identity and the key presses the player is willing
//! to hold.

use crate::domain::keypress::{Buttons, key_combinations};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game version
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Game {
    Black,
    White,
    Black2,
    White2,
}

impl Game {
    /// True for the first sub-generation (Black / White)
    pub fn is_bw(self) -> bool {
        matches!(self, Game::Black | Game::White)
    }
}

/// Console model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DsType {
    Ds,
    DsLite,
    Dsi,
    ThreeDs,
}

/// Profile validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("timer0 range is empty: min {min:#x} > max {max:#x}")]
    EmptyTimer0Range { min: u16, max: u16 },

    #[error("no key press count is enabled")]
    NoKeypresses,

    #[error("MAC address {0:#x} does not fit in 48 bits")]
    InvalidMac(u64),
}

/// Hardware profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub version: Game,
    pub ds_type: DsType,
    /// 48-bit MAC address
    pub mac: u64,
    /// Five game-specific words fed to the boot hash
    pub nazo: [u32; 5],
    pub timer0_min: u16,
    pub timer0_max: u16,
    pub vcount: u8,
    #[serde(default = "default_gxstat")]
    pub gxstat: u8,
    #[serde(default)]
    pub vframe: u8,
    #[serde(default)]
    pub soft_reset: bool,
    /// Memory Link enabled (BW2 only)
    #[serde(default)]
    pub memory_link: bool,
    /// `keypresses[n]` enables combinations of n simultaneous buttons
    #[serde(default = "default_keypresses")]
    pub keypresses: [bool; 4],
    #[serde(default)]
    pub skip_lr: bool,
    pub tid: u16,
    pub sid: u16,
}

fn default_gxstat() -> u8 {
    6
}

fn default_keypresses() -> [bool; 4] {
    [true, false, false, false]
}

impl Profile {
    /// Check the invariants the searchers rely on
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.timer0_min > self.timer0_max {
            return Err(ProfileError::EmptyTimer0Range {
                min: self.timer0_min,
                max: self.timer0_max,
            });
        }
        if !self.keypresses.iter().any(|&k| k) {
            return Err(ProfileError::NoKeypresses);
        }
        if self.mac >> 48 != 0 {
            return Err(ProfileError::InvalidMac(self.mac));
        }
        Ok(())
    }

    /// Button combinations enabled by this profile
    pub fn buttons(&self) -> Vec<Buttons> {
        key_combinations(self.keypresses, self.skip_lr)
    }

    /// Trainer shiny value
    pub fn tsv(&self) -> u16 {
        self.tid ^ self.sid
    }
}
