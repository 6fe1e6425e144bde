//! Entralink calibration search
//!
//! A C-Gear seed read back from the game is a packed seed: it encodes the
//! hour, a month/day/minute/second checksum and the delay. Reversing it gives
//! every boot date-time of a year that could have produced the reading, which
//! then restricts a boot search for Entralink encounters.

use crate::app::generator::{GeneratorConfig, Protocol, StationaryGenerator};
use crate::app::searcher::{SearchError, SearchProgress, StationarySearcher};
use crate::constants::GENDERLESS;
use crate::domain::filter::{AcceptAll, Filter};
use crate::domain::packed::{PackedSeed, delay_without_year};
use crate::domain::profile::Profile;
use crate::domain::state::Outcome;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use log::debug;

/// One observed C-Gear reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationTarget {
    /// C-Gear seed shown by the game
    pub reading: u32,
    /// Year the reading was taken in
    pub year: i32,
    /// Extra delay measured for the player's timing
    pub calibration: u32,
    /// Advance of the C-Gear IV frame to report
    pub cgear_frame: u32,
}

impl CalibrationTarget {
    /// Components of the reading with the year offset removed from the delay
    pub fn decompose(&self, mac: u64) -> PackedSeed {
        let packed = PackedSeed::decompose(self.reading, mac);
        PackedSeed {
            delay: delay_without_year(packed.delay, self.year),
            ..packed
        }
    }

    /// Seconds elapsed between the boot and the reading, as a backwards shift
    pub fn offset_seconds(&self, mac: u64) -> i64 {
        let delay = self.decompose(mac).delay.wrapping_add(self.calibration);
        -((delay / 60) as i64)
    }
}

/// Calibration result
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalibrationReport {
    /// C-Gear IV outcome of the reading at the requested frame
    pub iv_frame: Option<Outcome>,
    /// Boot date-times consistent with the reading
    pub datetimes: Vec<NaiveDateTime>,
}

/// Reverse lookup from a C-Gear reading to boot seeds
#[derive(Clone, Debug)]
pub struct CalibrationSearcher {
    searcher: StationarySearcher,
}

impl CalibrationSearcher {
    pub fn new(profile: Profile) -> Result<Self, SearchError> {
        Ok(Self {
            searcher: StationarySearcher::new(profile, 0, 0)?,
        })
    }

    pub fn profile(&self) -> &Profile {
        self.searcher.profile()
    }

    /// Boot date-times of `target.year` that could have produced the reading
    ///
    /// Candidates share the reading's hour and checksum before being shifted
    /// back by the delay; shifts that cross into another day are dropped.
    pub fn possible_datetimes(&self, target: &CalibrationTarget) -> Vec<NaiveDateTime> {
        let mac = self.profile().mac;
        let packed = target.decompose(mac);
        let Some(shift) = TimeDelta::try_seconds(target.offset_seconds(mac)) else {
            return Vec::new();
        };

        let mut datetimes = Vec::new();
        for month in 1..=12u32 {
            for day in 1..=31u32 {
                let Some(date) = NaiveDate::from_ymd_opt(target.year, month, day) else {
                    break;
                };

                for minute in 0..60u32 {
                    for second in 0..60u32 {
                        if (month * day + minute + second) & 0xFF != packed.a {
                            continue;
                        }
                        let Some(boot) = date.and_hms_opt(packed.b, minute, second) else {
                            continue;
                        };
                        if let Some(shifted) = boot.checked_add_signed(shift)
                            && shifted.date() == date
                        {
                            datetimes.push(shifted);
                        }
                    }
                }
            }
        }

        datetimes
    }

    /// Number of progress units a [`CalibrationSearcher::search`] call will report
    pub fn total_progress(&self, target: &CalibrationTarget) -> u64 {
        self.searcher
            .total_progress_datetimes(&self.possible_datetimes(target))
    }

    /// C-Gear IV outcome of the reading at `target.cgear_frame`
    pub fn iv_frame(&self, target: &CalibrationTarget) -> Option<Outcome> {
        let config = GeneratorConfig {
            initial_advances: target.cgear_frame,
            ..Default::default()
        };
        let generator = StationaryGenerator::new(config, Protocol::CGearIvs, AcceptAll).ok()?;
        generator.generate(target.reading as u64).into_iter().next()
    }

    /// Run the restricted boot search for Entralink outcomes
    ///
    /// # Arguments
    /// * `target` - Observed reading
    /// * `initial_advances` - First advance of every projection
    /// * `max_advances` - Advances projected after the first
    /// * `filter` - Outcome filter
    /// * `threads` - Requested worker count
    /// * `progress` - Shared progress, cancellation and results
    pub fn search<F>(
        &self,
        target: &CalibrationTarget,
        initial_advances: u32,
        max_advances: u32,
        filter: F,
        threads: usize,
        progress: &SearchProgress,
    ) -> Result<CalibrationReport, SearchError>
    where
        F: Filter + Clone,
    {
        let profile = self.profile();
        let config = GeneratorConfig {
            initial_advances,
            max_advances,
            tid: profile.tid,
            sid: profile.sid,
            gender_ratio: GENDERLESS,
            ..Default::default()
        };
        let generator = StationaryGenerator::new(config, Protocol::EntraLink, filter)?;

        let datetimes = self.possible_datetimes(target);
        let iv_frame = self.iv_frame(target);
        debug!(
            "calibration {:#010x} ({}): {} candidate date-time(s)",
            target.reading,
            target.year,
            datetimes.len()
        );

        self.searcher
            .search_datetimes(&generator, &datetimes, threads, progress)?;

        Ok(CalibrationReport { iv_frame, datetimes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::tests::sample_profile;
    use chrono::{Datelike, Timelike};

    const MAC_PART: u32 = 0x12_3456;

    fn target(a: u32, b: u32, delay: u32, calibration: u32) -> CalibrationTarget {
        let reading = (a << 24) + (b << 16) + delay + 23 + MAC_PART;
        CalibrationTarget {
            reading,
            year: 2023,
            calibration,
            cgear_frame: 21,
        }
    }

    #[test]
    fn test_decompose_removes_year() {
        let t = target(0x40, 5, 600, 0);
        assert_eq!(
            t.decompose(sample_profile().mac),
            PackedSeed { a: 0x40, b: 5, delay: 600 }
        );
    }

    #[test]
    fn test_offset_is_negative_whole_minutes() {
        let t = target(0x40, 5, 600, 59);
        assert_eq!(t.offset_seconds(sample_profile().mac), -10);
        let t = target(0x40, 5, 600, 60);
        assert_eq!(t.offset_seconds(sample_profile().mac), -11);
    }

    #[test]
    fn test_candidates_match_checksum_and_hour() {
        let searcher = CalibrationSearcher::new(sample_profile()).unwrap();
        let t = target(0x9C, 14, 900, 30);
        let shift = TimeDelta::try_seconds(-t.offset_seconds(sample_profile().mac)).unwrap();

        let datetimes = searcher.possible_datetimes(&t);
        assert!(!datetimes.is_empty());
        for shifted in &datetimes {
            let boot = *shifted + shift;
            assert_eq!(boot.hour(), 14);
            assert_eq!(boot.date(), shifted.date());
            assert_eq!(
                (boot.month() * boot.day() + boot.minute() + boot.second()) & 0xFF,
                0x9C
            );
        }
    }

    #[test]
    fn test_candidates_cover_december() {
        let searcher = CalibrationSearcher::new(sample_profile()).unwrap();
        // 12 * 31 = 372, 372 & 0xFF = 116
        let datetimes = searcher.possible_datetimes(&target(116, 12, 0, 0));
        assert!(datetimes.iter().any(|dt| dt.month() == 12 && dt.day() == 31));
        assert!(datetimes.iter().all(|dt| dt.year() == 2023));
    }

    #[test]
    fn test_midnight_crossing_candidates_dropped() {
        let searcher = CalibrationSearcher::new(sample_profile()).unwrap();
        // Hour 0 shifted back one minute: boots at 00:00:xx land on the previous day
        let datetimes = searcher.possible_datetimes(&target(0x40, 0, 3600, 0));
        assert!(!datetimes.is_empty());
        assert!(datetimes.iter().all(|dt| dt.hour() == 0 && dt.minute() < 59));

        let boot = NaiveDate::from_ymd_opt(2023, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 54)
            .unwrap();
        let dropped = boot - TimeDelta::try_seconds(60).unwrap();
        assert!(!datetimes.contains(&dropped));
    }

    #[test]
    fn test_invalid_hour_yields_nothing() {
        let searcher = CalibrationSearcher::new(sample_profile()).unwrap();
        assert!(searcher.possible_datetimes(&target(0x40, 30, 600, 0)).is_empty());
    }

    #[test]
    fn test_iv_frame_matches_projection() {
        let searcher = CalibrationSearcher::new(sample_profile()).unwrap();
        let t = target(0x40, 5, 600, 0);
        let config = GeneratorConfig {
            initial_advances: 21,
            ..Default::default()
        };
        let expected = StationaryGenerator::new(config, Protocol::CGearIvs, AcceptAll)
            .unwrap()
            .generate(t.reading as u64);
        let frame = searcher.iv_frame(&t).unwrap();
        assert_eq!(frame, expected[0]);
        assert_eq!(frame.advances, 21);
        assert!(frame.ivs.is_some());
    }

    #[test]
    fn test_search_runs_over_candidates() {
        let mut profile = sample_profile();
        profile.timer0_max = profile.timer0_min;
        let searcher = CalibrationSearcher::new(profile).unwrap();
        let t = target(0x9C, 14, 900, 30);
        let progress = SearchProgress::new();

        let report = searcher.search(&t, 10, 2, AcceptAll, 4, &progress).unwrap();

        assert_eq!(progress.progress(), report.datetimes.len() as u64);
        assert_eq!(progress.progress(), searcher.total_progress(&t));
        let results = progress.take_results();
        assert_eq!(results.len(), report.datetimes.len() * 3);
        for result in results {
            assert!(report.datetimes.contains(&result.datetime.unwrap()));
            let personality = result.outcome.personality.unwrap();
            assert_eq!(personality.ability, 0);
            assert!(result.outcome.cgear_time.is_some());
            assert!((10..=12).contains(&result.outcome.advances));
        }
    }
}
