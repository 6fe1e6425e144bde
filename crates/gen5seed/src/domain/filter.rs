//! Outcome acceptance predicates
//!
//! The generator treats a filter as an opaque boolean function. [`StateFilter`]
//! is the stock implementation covering IV ranges, hidden power, personality
//! ranges, nature, ability, gender and shininess.

use crate::constants::NATURE_COUNT;
use crate::domain::state::{Gender, Outcome, Shiny};
use std::ops::RangeInclusive;

const ALL_NATURES: u32 = (1 << NATURE_COUNT) - 1;

/// Predicate applied to every projected outcome
pub trait Filter: Send + Sync {
    /// Return true to keep the outcome
    fn accepts(&self, outcome: &Outcome) -> bool;
}

/// Filter that keeps everything
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl Filter for AcceptAll {
    #[inline]
    fn accepts(&self, _outcome: &Outcome) -> bool {
        true
    }
}

/// Adapter turning a closure into a [`Filter`]
#[derive(Clone, Copy)]
pub struct FilterFn<F>(pub F);

impl<F> Filter for FilterFn<F>
where
    F: Fn(&Outcome) -> bool + Send + Sync,
{
    #[inline]
    fn accepts(&self, outcome: &Outcome) -> bool {
        (self.0)(outcome)
    }
}

/// Range and set based filter
///
/// Checks only the parts an outcome carries: IV constraints are ignored for
/// outcomes without IVs and personality constraints for outcomes without a
/// personality.
#[derive(Clone, Debug)]
pub struct StateFilter {
    /// Inclusive IV lower bounds (HP, Atk, Def, SpA, SpD, Spe)
    pub iv_min: [u8; 6],
    /// Inclusive IV upper bounds
    pub iv_max: [u8; 6],
    /// Accepted hidden power types as a bitmask (bit n = type n)
    pub hidden_powers: u16,
    /// Accepted natures as a bitmask (bit n = nature n)
    pub natures: u32,
    /// Accepted personality values
    pub pid_range: RangeInclusive<u32>,
    /// Required ability slot
    pub ability: Option<u8>,
    /// Required gender
    pub gender: Option<Gender>,
    /// Minimum shininess class
    pub shiny: Option<Shiny>,
}

impl Default for StateFilter {
    fn default() -> Self {
        Self {
            iv_min: [0; 6],
            iv_max: [31; 6],
            hidden_powers: 0xFFFF,
            natures: ALL_NATURES,
            pid_range: 0..=u32::MAX,
            ability: None,
            gender: None,
            shiny: None,
        }
    }
}

impl StateFilter {
    /// Filter accepting every outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IV bounds
    pub fn with_ivs(mut self, iv_min: [u8; 6], iv_max: [u8; 6]) -> Self {
        self.iv_min = iv_min;
        self.iv_max = iv_max;
        self
    }

    /// Restrict to the given hidden power types
    ///
    /// Types above 15 match nothing.
    pub fn with_hidden_powers(mut self, types: &[u8]) -> Self {
        self.hidden_powers = types.iter().fold(0, |mask, &t| {
            mask | 1u16.checked_shl(t as u32).unwrap_or(0)
        });
        self
    }

    /// Restrict to the given natures
    ///
    /// Natures above 24 match nothing.
    pub fn with_natures(mut self, natures: &[u8]) -> Self {
        self.natures = natures.iter().fold(0, |mask, &n| {
            mask | (1u32.checked_shl(n as u32).unwrap_or(0) & ALL_NATURES)
        });
        self
    }

    /// Restrict the personality value
    pub fn with_pid_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pid_range = range;
        self
    }

    /// Require an ability slot
    pub fn with_ability(mut self, ability: u8) -> Self {
        self.ability = Some(ability);
        self
    }

    /// Require a gender
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Require at least the given shininess class
    pub fn with_shiny(mut self, shiny: Shiny) -> Self {
        self.shiny = Some(shiny);
        self
    }
}

impl Filter for StateFilter {
    fn accepts(&self, outcome: &Outcome) -> bool {
        if let Some(set) = &outcome.ivs {
            let in_range = set
                .ivs
                .iter()
                .zip(self.iv_min.iter().zip(self.iv_max.iter()))
                .all(|(iv, (min, max))| iv >= min && iv <= max);
            if !in_range || self.hidden_powers & (1 << set.hidden_power) == 0 {
                return false;
            }
        }

        if let Some(p) = &outcome.personality {
            if !self.pid_range.contains(&p.pid) || self.natures & (1 << p.nature) == 0 {
                return false;
            }
            if self.ability.is_some_and(|a| a != p.ability) {
                return false;
            }
            if self.gender.is_some_and(|g| g != p.gender) {
                return false;
            }
            if self.shiny.is_some_and(|s| p.shiny < s) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::Personality;

    fn iv_outcome(ivs: [u8; 6]) -> Outcome {
        Outcome::with_ivs(0, ivs)
    }

    fn pid_outcome(pid: u32, nature: u8) -> Outcome {
        Outcome::with_personality(0, Personality::new(pid, nature, 127).with_shiny(0))
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = StateFilter::new();
        assert!(filter.accepts(&iv_outcome([0, 31, 15, 7, 3, 1])));
        assert!(filter.accepts(&pid_outcome(0xFFFF_FFFF, 24)));
    }

    #[test]
    fn test_iv_bounds() {
        let filter = StateFilter::new().with_ivs([31, 0, 31, 0, 31, 31], [31; 6]);
        assert!(filter.accepts(&iv_outcome([31, 0, 31, 0, 31, 31])));
        assert!(!filter.accepts(&iv_outcome([30, 0, 31, 0, 31, 31])));
    }

    #[test]
    fn test_hidden_power_mask() {
        let filter = StateFilter::new().with_hidden_powers(&[15]);
        assert!(filter.accepts(&iv_outcome([31; 6])));
        assert!(!filter.accepts(&iv_outcome([0; 6])));
    }

    #[test]
    fn test_iv_constraints_ignored_for_pid_outcomes() {
        let filter = StateFilter::new().with_ivs([31; 6], [31; 6]);
        assert!(filter.accepts(&pid_outcome(0x1234_5678, 0)));
    }

    #[test]
    fn test_nature_and_pid_range() {
        let filter = StateFilter::new()
            .with_natures(&[3])
            .with_pid_range(0x1000_0000..=0x2000_0000);
        assert!(filter.accepts(&pid_outcome(0x1500_0000, 3)));
        assert!(!filter.accepts(&pid_outcome(0x1500_0000, 4)));
        assert!(!filter.accepts(&pid_outcome(0x3000_0000, 3)));
    }

    #[test]
    fn test_out_of_range_masks_match_nothing() {
        let filter = StateFilter::new().with_natures(&[40, 25, 255]);
        assert_eq!(filter.natures, 0);
        assert!(!filter.accepts(&pid_outcome(0x1500_0000, 24)));

        let filter = StateFilter::new().with_natures(&[3, 40]);
        assert!(filter.accepts(&pid_outcome(0x1500_0000, 3)));

        let filter = StateFilter::new().with_hidden_powers(&[16, 200]);
        assert_eq!(filter.hidden_powers, 0);
        assert!(!filter.accepts(&iv_outcome([31; 6])));
    }

    #[test]
    fn test_shiny_minimum() {
        let star = StateFilter::new().with_shiny(Shiny::Star);
        assert!(star.accepts(&pid_outcome(0x0000_0000, 0)));
        assert!(star.accepts(&pid_outcome(0x0000_0003, 0)));
        assert!(!star.accepts(&pid_outcome(0x0000_1000, 0)));

        let square = StateFilter::new().with_shiny(Shiny::Square);
        assert!(!square.accepts(&pid_outcome(0x0000_0003, 0)));
    }

    #[test]
    fn test_closure_filter() {
        let filter = FilterFn(|o: &Outcome| o.advances > 5);
        assert!(!filter.accepts(&iv_outcome([0; 6])));
    }
}
