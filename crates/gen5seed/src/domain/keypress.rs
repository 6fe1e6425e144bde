//! Boot-time button combinations
//!
//! Buttons are stored in DS KEYINPUT bit order. The boot hash consumes the
//! inverted key register (`0x2FFF ^ pressed`).

use std::fmt;

/// Pressed button set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const A: Buttons = Buttons(1 << 0);
    pub const B: Buttons = Buttons(1 << 1);
    pub const SELECT: Buttons = Buttons(1 << 2);
    pub const START: Buttons = Buttons(1 << 3);
    pub const RIGHT: Buttons = Buttons(1 << 4);
    pub const LEFT: Buttons = Buttons(1 << 5);
    pub const UP: Buttons = Buttons(1 << 6);
    pub const DOWN: Buttons = Buttons(1 << 7);
    pub const R: Buttons = Buttons(1 << 8);
    pub const L: Buttons = Buttons(1 << 9);
    pub const X: Buttons = Buttons(1 << 10);
    pub const Y: Buttons = Buttons(1 << 11);

    /// All single buttons in bit order
    pub const ALL: [(Buttons, &'static str); 12] = [
        (Buttons::A, "A"),
        (Buttons::B, "B"),
        (Buttons::SELECT, "Select"),
        (Buttons::START, "Start"),
        (Buttons::RIGHT, "Right"),
        (Buttons::LEFT, "Left"),
        (Buttons::UP, "Up"),
        (Buttons::DOWN, "Down"),
        (Buttons::R, "R"),
        (Buttons::L, "L"),
        (Buttons::X, "X"),
        (Buttons::Y, "Y"),
    ];

    #[inline]
    pub fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Key register value seen by the boot hash
    #[inline]
    pub fn key_input(self) -> u32 {
        0x2FFF ^ self.0 as u32
    }

    /// Opposite directions cannot be held together
    fn is_possible(self) -> bool {
        !(self.contains(Buttons(Buttons::UP.0 | Buttons::DOWN.0))
            || self.contains(Buttons(Buttons::LEFT.0 | Buttons::RIGHT.0)))
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "None");
        }
        let names: Vec<&str> = Buttons::ALL
            .iter()
            .filter(|(b, _)| self.contains(*b))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(" + "))
    }
}

/// Enumerate every button combination allowed by the profile
///
/// `keypresses[n]` enables combinations of exactly `n` simultaneous buttons
/// (n = 0..=3). Combinations are ordered by size, then by bit pattern.
pub fn key_combinations(keypresses: [bool; 4], skip_lr: bool) -> Vec<Buttons> {
    let mut combos = Vec::new();

    for (count, _) in keypresses.iter().enumerate().filter(|(_, on)| **on) {
        for mask in 0u16..(1 << 12) {
            let buttons = Buttons(mask);
            if buttons.count() as usize != count || !buttons.is_possible() {
                continue;
            }
            if skip_lr && (buttons.contains(Buttons::L) || buttons.contains(Buttons::R)) {
                continue;
            }
            combos.push(buttons);
        }
    }

    combos
}
