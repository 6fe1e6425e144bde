//! Initial advance counts consumed by the game before control is handed over
//!
//! Both sub-generations walk a fixed probability table on the console RNG
//! during start-up. BW2 additionally burns a few draws for the Memory Link
//! check and then rerolls a triple of values until all three are distinct.

use crate::domain::lcg::BwRng;

/// Start-up probability table; 100 terminates a row
const PROBABILITY_TABLE: [[u32; 5]; 6] = [
    [50, 100, 100, 100, 100],
    [50, 50, 100, 100, 100],
    [30, 50, 100, 100, 100],
    [25, 30, 50, 100, 100],
    [20, 25, 33, 50, 100],
    [100, 100, 100, 100, 100],
];

/// Upper bound on BW2 reroll attempts
const MAX_REROLLS: u32 = 100;

/// Walk the probability table once, returning the draws consumed
fn probability_walk(rng: &mut BwRng) -> u32 {
    let mut count = 0;
    for row in PROBABILITY_TABLE.iter() {
        for &threshold in row.iter() {
            if threshold == 100 {
                break;
            }
            count += 1;
            if rng.next_u32_bounded(101) <= threshold {
                break;
            }
        }
    }
    count
}

/// Initial advances for Black / White
pub fn initial_advances_bw(seed: u64) -> u32 {
    let mut rng = BwRng::new(seed);
    (0..5).map(|_| probability_walk(&mut rng)).sum()
}

/// Initial advances for Black 2 / White 2
pub fn initial_advances_bw2(seed: u64, memory_link: bool) -> u32 {
    let mut rng = BwRng::new(seed);
    let mut count = 0;

    for i in 0..5 {
        count += probability_walk(&mut rng);
        if i == 0 {
            let skip = if memory_link { 2 } else { 3 };
            count += skip;
            rng.advance(skip);
        }
    }

    for _ in 0..MAX_REROLLS {
        count += 3;
        let r1 = rng.next_u32_bounded(15);
        let r2 = rng.next_u32_bounded(15);
        let r3 = rng.next_u32_bounded(15);
        if r1 != r2 && r1 != r3 && r2 != r3 {
            break;
        }
    }

    count
}
