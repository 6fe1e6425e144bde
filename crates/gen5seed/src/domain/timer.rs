//! C-Gear timer state machine
//!
//! The C-Gear clock alternates between skipping a tick, a long wait and a
//! short wait. After the one-time start transition the cycle is
//! Skip → Long → Short → Skip with period 3.

/// Internal timer phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    First,
    Skip,
    Long,
    Short,
}

/// Elapsed-time model of the C-Gear timer
#[derive(Clone, Debug)]
pub struct CGearTimer {
    current: u32,
    state: TimerState,
}

impl Default for CGearTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CGearTimer {
    pub fn new() -> Self {
        Self {
            current: 0,
            state: TimerState::First,
        }
    }

    /// Current phase
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Feed the upper 32 bits of one LCG state and return the timer reading
    ///
    /// Returns 0 on a skipped tick.
    pub fn next(&mut self, fragment: u32) -> u32 {
        match self.state {
            TimerState::First => {
                self.state = TimerState::Skip;
                self.current = self.current.wrapping_add(21);
                self.current
            }
            TimerState::Skip => {
                self.state = TimerState::Long;
                0
            }
            TimerState::Long => {
                self.state = TimerState::Short;
                self.current = self.current.wrapping_add(jitter(fragment, 152) + 60);
                self.current
            }
            TimerState::Short => {
                self.state = TimerState::Skip;
                self.current = self.current.wrapping_add(jitter(fragment, 40) + 60);
                self.current
            }
        }
    }
}

/// Scale a 32-bit fragment into `0..range` in full 64-bit precision
#[inline]
fn jitter(fragment: u32, range: u64) -> u32 {
    ((fragment as u64 * range) >> 32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_four_readings() {
        let (f3, f4) = (0x8000_0000u32, 0xFFFF_FFFFu32);
        let mut timer = CGearTimer::new();

        assert_eq!(timer.next(0x1234_5678), 21);
        assert_eq!(timer.next(0xFFFF_FFFF), 0);

        let third = timer.next(f3);
        assert_eq!(third, 21 + 60 + ((f3 as u64 * 152) >> 32) as u32);
        assert_eq!(third, 21 + 60 + 76);

        let fourth = timer.next(f4);
        assert_eq!(fourth, third + 60 + ((f4 as u64 * 40) >> 32) as u32);
        assert_eq!(fourth, third + 60 + 39);
    }

    #[test]
    fn test_cycle_has_period_three() {
        let mut timer = CGearTimer::new();
        timer.next(0);
        assert_eq!(timer.state(), TimerState::Skip);
        for _ in 0..10 {
            assert_eq!(timer.next(0), 0);
            assert_eq!(timer.state(), TimerState::Long);
            timer.next(0);
            assert_eq!(timer.state(), TimerState::Short);
            timer.next(0);
            assert_eq!(timer.state(), TimerState::Skip);
        }
    }

    #[test]
    fn test_zero_fragment_adds_base_wait() {
        let mut timer = CGearTimer::new();
        timer.next(0);
        timer.next(0);
        assert_eq!(timer.next(0), 81);
        assert_eq!(timer.next(0), 141);
    }

    #[test]
    fn test_jitter_uses_full_precision() {
        // Two chained 32-bit operations would overflow here
        assert_eq!(jitter(0xFFFF_FFFF, 152), 151);
        assert_eq!(jitter(0xFFFF_FFFF, 40), 39);
    }
}
