//! Projected encounter outcome
//!
//! An [`Outcome`] is produced once per advance by the generator and is never
//! modified afterwards.

use crate::constants::{FEMALE_ONLY, GENDERLESS, MALE_ONLY, STAR_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Stat order used by hidden power (HP, Atk, Def, Spe, SpA, SpD)
const HIDDEN_POWER_ORDER: [usize; 6] = [0, 1, 2, 5, 3, 4];

/// Gender of the encounter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Genderless,
}

impl Gender {
    /// Classify the low personality byte against the species gender ratio
    pub fn from_personality(value: u8, ratio: u8) -> Self {
        match ratio {
            GENDERLESS => Gender::Genderless,
            FEMALE_ONLY => Gender::Female,
            MALE_ONLY => Gender::Male,
            _ if value < ratio => Gender::Female,
            _ => Gender::Male,
        }
    }
}

/// Shininess class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shiny {
    #[default]
    None,
    Star,
    Square,
}

impl Shiny {
    /// Compare the trainer shiny value with the folded personality
    pub fn classify(tsv: u16, psv: u16) -> Self {
        if tsv == psv {
            Shiny::Square
        } else if (tsv ^ psv) < STAR_THRESHOLD {
            Shiny::Star
        } else {
            Shiny::None
        }
    }

    /// Fold a personality value into its shiny value
    #[inline]
    pub fn fold(pid: u32) -> u16 {
        ((pid >> 16) ^ (pid & 0xFFFF)) as u16
    }
}

/// Six IVs with the derived hidden power
///
/// IVs are stored as HP, Atk, Def, SpA, SpD, Spe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvSet {
    pub ivs: [u8; 6],
    pub hidden_power: u8,
    pub power: u8,
}

impl IvSet {
    pub fn new(ivs: [u8; 6]) -> Self {
        let mut h = 0u32;
        let mut p = 0u32;
        for (i, &stat) in HIDDEN_POWER_ORDER.iter().enumerate() {
            h += ((ivs[stat] & 1) as u32) << i;
            p += (((ivs[stat] >> 1) & 1) as u32) << i;
        }
        Self {
            ivs,
            hidden_power: (h * 15 / 63) as u8,
            power: (30 + p * 40 / 63) as u8,
        }
    }
}

/// Personality-derived properties
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub pid: u32,
    pub nature: u8,
    pub ability: u8,
    pub gender: Gender,
    pub shiny: Shiny,
}

impl Personality {
    /// Derive ability and gender from `pid`; shininess starts at [`Shiny::None`]
    pub fn new(pid: u32, nature: u8, gender_ratio: u8) -> Self {
        Self {
            pid,
            nature,
            ability: ((pid >> 16) & 1) as u8,
            gender: Gender::from_personality((pid & 0xFF) as u8, gender_ratio),
            shiny: Shiny::None,
        }
    }

    /// Classify shininess against the trainer shiny value
    pub fn with_shiny(mut self, tsv: u16) -> Self {
        self.shiny = Shiny::classify(tsv, Shiny::fold(self.pid));
        self
    }
}

/// One projected advance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Absolute advance index
    pub advances: u32,
    /// IVs (IV protocols only)
    pub ivs: Option<IvSet>,
    /// Personality (PID protocols only)
    pub personality: Option<Personality>,
    /// C-Gear timer reading in frames, 0 on a skipped tick
    pub cgear_time: Option<u32>,
    /// 13-bit seed snapshot
    pub snapshot: Option<u16>,
}

impl Outcome {
    pub fn with_ivs(advances: u32, ivs: [u8; 6]) -> Self {
        Self {
            advances,
            ivs: Some(IvSet::new(ivs)),
            personality: None,
            cgear_time: None,
            snapshot: None,
        }
    }

    pub fn with_personality(advances: u32, personality: Personality) -> Self {
        Self {
            advances,
            ivs: None,
            personality: Some(personality),
            cgear_time: None,
            snapshot: None,
        }
    }
}
