//! SHA-1 based boot seed hash
//!
//! The console derives its initial seed from a single SHA-1 block built from
//! game constants, hardware registers, the RTC date/time and the key register.
//! Rounds 0-8 only depend on words that stay fixed for a (timer0, date) pair,
//! so [`BootHash::precompute`] caches the state after them and
//! [`BootHash::hash_seed`] resumes from round 9.

use crate::domain::keypress::Buttons;
use crate::domain::lcg::BwRng;
use crate::domain::profile::{DsType, Profile};
use chrono::{Datelike, NaiveDate};

/// SHA-1 initial hash values
const H: [u32; 5] = [0x6745_2301, 0xEFCD_AB89, 0x98BA_DCFE, 0x1032_5476, 0xC3D2_E1F0];

/// Round constants
const K: [u32; 4] = [0x5A82_7999, 0x6ED9_EBA1, 0x8F1B_BCDC, 0xCA62_C1D6];

/// Number of rounds covered by the precomputed prefix (words 0..=8)
const PRECOMPUTED_ROUNDS: usize = 9;

/// Boot seed hasher for one profile
#[derive(Clone, Debug)]
pub struct BootHash {
    data: [u32; 16],
    prefix: [u32; 5],
}

impl BootHash {
    /// Build the message words fixed by the profile
    pub fn new(profile: &Profile) -> Self {
        let mut data = [0u32; 16];
        for (word, nazo) in data.iter_mut().zip(profile.nazo.iter()) {
            *word = nazo.swap_bytes();
        }

        data[6] = (profile.mac & 0xFFFF) as u32;
        if profile.soft_reset {
            data[6] ^= 0x0100_0000;
        }
        data[7] = ((profile.mac >> 16) as u32) ^ ((profile.vframe as u32) << 24) ^ profile.gxstat as u32;
        data[13] = 0x8000_0000;
        data[15] = 0x0000_01A0;

        let mut hash = Self { data, prefix: H };
        hash.set_timer0(profile.timer0_min, profile.vcount);
        hash.precompute();
        hash
    }

    /// Set the Timer0 / VCount word
    pub fn set_timer0(&mut self, timer0: u16, vcount: u8) {
        self.data[5] = (((vcount as u32) << 16) | timer0 as u32).swap_bytes();
    }

    /// Set the RTC date word (BCD year, month, day and weekday)
    pub fn set_date(&mut self, date: NaiveDate) {
        let year = (date.year() - 2000).rem_euclid(100) as u32;
        self.data[8] = (to_bcd(year) << 24)
            | (to_bcd(date.month()) << 16)
            | (to_bcd(date.day()) << 8)
            | date.weekday().num_days_from_sunday();
    }

    /// Set the RTC time word
    ///
    /// Non-3DS consoles set the PM flag for afternoon hours.
    pub fn set_time(&mut self, hour: u32, minute: u32, second: u32, ds_type: DsType) {
        let mut h = to_bcd(hour);
        if hour >= 12 && ds_type != DsType::ThreeDs {
            h += 0x40;
        }
        self.data[9] = (h << 24) | (to_bcd(minute) << 16) | (to_bcd(second) << 8);
    }

    /// Set the key register word
    pub fn set_button(&mut self, buttons: Buttons) {
        self.data[12] = buttons.key_input().swap_bytes();
    }

    /// Cache the state after the rounds that only use words 0..=8
    ///
    /// Must be called again after `set_timer0` or `set_date`.
    pub fn precompute(&mut self) {
        let mut state = H;
        for t in 0..PRECOMPUTED_ROUNDS {
            round(&mut state, t, self.data[t]);
        }
        self.prefix = state;
    }

    /// Derive the 64-bit seed from the current message
    pub fn hash_seed(&self) -> u64 {
        let w = self.schedule();
        let mut state = self.prefix;
        for (t, &word) in w.iter().enumerate().skip(PRECOMPUTED_ROUNDS) {
            round(&mut state, t, word);
        }
        finish(state)
    }

    /// Same as [`BootHash::hash_seed`] without the cached prefix
    pub fn hash_seed_full(&self) -> u64 {
        let w = self.schedule();
        let mut state = H;
        for (t, &word) in w.iter().enumerate() {
            round(&mut state, t, word);
        }
        finish(state)
    }

    fn schedule(&self) -> [u32; 80] {
        let mut w = [0u32; 80];
        w[..16].copy_from_slice(&self.data);
        for t in 16..80 {
            w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
        }
        w
    }
}

#[inline(always)]
fn round(state: &mut [u32; 5], t: usize, word: u32) {
    let [a, b, c, d, e] = *state;
    let (f, k) = match t {
        0..=19 => ((b & c) | (!b & d), K[0]),
        20..=39 => (b ^ c ^ d, K[1]),
        40..=59 => ((b & c) | (b & d) | (c & d), K[2]),
        _ => (b ^ c ^ d, K[3]),
    };
    let temp = a
        .rotate_left(5)
        .wrapping_add(f)
        .wrapping_add(e)
        .wrapping_add(k)
        .wrapping_add(word);
    *state = [temp, a, b.rotate_left(30), c, d];
}

/// Fold the first two digest words into the seed and step the LCG once
fn finish(state: [u32; 5]) -> u64 {
    let low = state[0].wrapping_add(H[0]).swap_bytes() as u64;
    let high = state[1].wrapping_add(H[1]).swap_bytes() as u64;
    BwRng::new((high << 32) | low).next()
}

#[inline]
fn to_bcd(value: u32) -> u32 {
    ((value / 10) << 4) | (value % 10)
}
