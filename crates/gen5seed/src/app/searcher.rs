//! Brute-force seed search
//!
//! This module enumerates boot parameters (Timer0, date, key combination and
//! time of day) or packed C-Gear seeds, projects every derived seed and keeps
//! the outcomes accepted by the generator's filter.
//!
//! Each call builds its own rayon pool, splits the work into contiguous
//! slices and blocks until every worker has finished. Workers share a
//! [`SearchProgress`] holding the result list, the progress counter and the
//! cancellation flag.

use crate::app::generator::{GeneratorError, Method, StationaryGenerator};
use crate::constants::{BASE_YEAR, BW2_IV_OFFSET, PACKED_A_MAX, PACKED_A_MIN, PACKED_B_MAX};
use crate::domain::advances::{initial_advances_bw, initial_advances_bw2};
use crate::domain::filter::Filter;
use crate::domain::keypress::Buttons;
use crate::domain::packed::{PackedSeed, delay_with_year};
use crate::domain::profile::{Profile, ProfileError};
use crate::domain::sha1::BootHash;
use crate::domain::state::Outcome;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Years representable by the console clock
const YEAR_RANGE: std::ops::RangeInclusive<i32> = BASE_YEAR..=BASE_YEAR + 99;

/// Search errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("year {0} is outside 2000-2099")]
    YearOutOfRange(i32),

    #[error("delay range is empty: min {min} > max {max}")]
    EmptyDelayRange { min: u32, max: u32 },

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// One matching outcome with its boot parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub seed: u64,
    /// Boot date and time (boot searches only)
    pub datetime: Option<NaiveDateTime>,
    /// Held buttons (boot searches only)
    pub buttons: Option<Buttons>,
    /// Timer0 value (boot searches only)
    pub timer0: Option<u16>,
}

/// Shared state of a running search
///
/// Cancellation uses relaxed ordering: a worker may finish the seed it is
/// currently projecting before it observes the flag.
#[derive(Debug, Default)]
pub struct SearchProgress {
    cancelled: AtomicBool,
    progress: AtomicU64,
    results: Mutex<Vec<SearchResult>>,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every worker to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Completed work units since the search started
    pub fn progress(&self) -> u64 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Move the accumulated results out
    pub fn take_results(&self) -> Vec<SearchResult> {
        std::mem::take(&mut *self.lock_results())
    }

    /// Number of results accumulated so far
    pub fn result_count(&self) -> usize {
        self.lock_results().len()
    }

    /// Clear the flag, the counter and the results for reuse
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
        self.progress.store(0, Ordering::Relaxed);
        self.lock_results().clear();
    }

    fn tick(&self) {
        self.progress.fetch_add(1, Ordering::Relaxed);
    }

    fn extend(&self, results: impl IntoIterator<Item = SearchResult>) {
        self.lock_results().extend(results);
    }

    fn lock_results(&self) -> MutexGuard<'_, Vec<SearchResult>> {
        // A panicking worker cannot leave the vector half-written
        self.results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Boot and packed-seed searcher for one profile
#[derive(Clone, Debug)]
pub struct StationarySearcher {
    profile: Profile,
    min_delay: u32,
    max_delay: u32,
}

impl StationarySearcher {
    /// Create a searcher; the delay range is only used by packed searches
    pub fn new(profile: Profile, min_delay: u32, max_delay: u32) -> Result<Self, SearchError> {
        profile.validate()?;
        if min_delay > max_delay {
            return Err(SearchError::EmptyDelayRange {
                min: min_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            profile,
            min_delay,
            max_delay,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Number of progress units a [`StationarySearcher::search`] call will report
    pub fn total_progress(&self, method: Method, start: NaiveDate, end: NaiveDate) -> u64 {
        if method == Method::CGear {
            let delays = (self.max_delay - self.min_delay) as u64 + 1;
            return (PACKED_A_MAX - PACKED_A_MIN + 1) as u64 * (PACKED_B_MAX + 1) as u64 * delays;
        }
        let days = (end - start).num_days().max(0) as u64 + 1;
        self.timer0_count() * days * self.profile.buttons().len() as u64
    }

    /// Number of progress units a [`StationarySearcher::search_datetimes`] call will report
    pub fn total_progress_datetimes(&self, datetimes: &[NaiveDateTime]) -> u64 {
        self.timer0_count() * datetimes.len() as u64 * self.profile.buttons().len() as u64
    }

    /// Search every boot between `start` and `end` (inclusive)
    ///
    /// C-Gear generators search the packed seed space of `start`'s year
    /// instead; the date range then only selects the year.
    ///
    /// # Arguments
    /// * `generator` - Projector cloned into every worker
    /// * `start` - First boot date
    /// * `end` - Last boot date
    /// * `threads` - Requested worker count, clamped to the number of work units
    /// * `progress` - Shared progress, cancellation and results
    pub fn search<F>(
        &self,
        generator: &StationaryGenerator<F>,
        start: NaiveDate,
        end: NaiveDate,
        threads: usize,
        progress: &SearchProgress,
    ) -> Result<(), SearchError>
    where
        F: Filter + Clone,
    {
        if start > end {
            return Err(SearchError::InvalidDateRange { start, end });
        }
        for year in [start.year(), end.year()] {
            if !YEAR_RANGE.contains(&year) {
                return Err(SearchError::YearOutOfRange(year));
            }
        }

        progress.progress.store(0, Ordering::Relaxed);

        if generator.protocol().method() == Method::CGear {
            return self.search_packed(generator, start.year(), threads, progress);
        }

        let days = (end - start).num_days() as usize + 1;
        let slices = split_evenly(days, threads);
        debug!(
            "boot search {} to {}: {} day(s), {} worker(s), {:?}",
            start,
            end,
            days,
            slices.len(),
            generator.protocol()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(slices.len())
            .build()?;
        pool.scope(|s| {
            for (offset, len) in slices {
                let generator = generator.clone();
                let first = start + chrono::Days::new(offset as u64);
                let last = first + chrono::Days::new(len as u64 - 1);
                s.spawn(move |_| self.search_dates(generator, first, last, progress));
            }
        });

        debug!(
            "boot search finished: {} result(s), cancelled: {}",
            progress.result_count(),
            progress.is_cancelled()
        );
        Ok(())
    }

    /// Search the exact boot date-times in `datetimes`
    ///
    /// The generator's initial advances are used as given. Progress advances
    /// once per (Timer0, date-time, button) triple.
    pub fn search_datetimes<F>(
        &self,
        generator: &StationaryGenerator<F>,
        datetimes: &[NaiveDateTime],
        threads: usize,
        progress: &SearchProgress,
    ) -> Result<(), SearchError>
    where
        F: Filter + Clone,
    {
        if let Some(dt) = datetimes.iter().find(|dt| !YEAR_RANGE.contains(&dt.year())) {
            return Err(SearchError::YearOutOfRange(dt.year()));
        }

        progress.progress.store(0, Ordering::Relaxed);
        let slices = split_evenly(datetimes.len(), threads);
        debug!(
            "date-time search: {} candidate(s), {} worker(s)",
            datetimes.len(),
            slices.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(slices.len())
            .build()?;
        pool.scope(|s| {
            for (offset, len) in slices {
                let generator = generator.clone();
                let chunk = &datetimes[offset..offset + len];
                s.spawn(move |_| self.search_exact(generator, chunk, progress));
            }
        });

        debug!("date-time search finished: {} result(s)", progress.result_count());
        Ok(())
    }

    fn search_packed<F>(
        &self,
        generator: &StationaryGenerator<F>,
        year: i32,
        threads: usize,
        progress: &SearchProgress,
    ) -> Result<(), SearchError>
    where
        F: Filter + Clone,
    {
        let count = (PACKED_A_MAX - PACKED_A_MIN + 1) as usize;
        let slices = split_evenly(count, threads);
        debug!(
            "packed search {}: delay {}..={}, {} worker(s)",
            year,
            self.min_delay,
            self.max_delay,
            slices.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(slices.len())
            .build()?;
        pool.scope(|s| {
            for (offset, len) in slices {
                let generator = generator.clone();
                let first = PACKED_A_MIN + offset as u32;
                let a_range = first..=first + len as u32 - 1;
                s.spawn(move |_| self.search_packed_slice(generator, a_range, year, progress));
            }
        });

        debug!("packed search finished: {} result(s)", progress.result_count());
        Ok(())
    }

    fn search_dates<F: Filter>(
        &self,
        mut generator: StationaryGenerator<F>,
        start: NaiveDate,
        end: NaiveDate,
        progress: &SearchProgress,
    ) {
        trace!("worker {} to {}", start, end);
        let profile = &self.profile;
        let bw = profile.version.is_bw();
        let method = generator.protocol().method();
        if method == Method::Ivs {
            generator.set_offset(if bw { 0 } else { BW2_IV_OFFSET });
        }

        let buttons = profile.buttons();
        let mut hash = BootHash::new(profile);

        for timer0 in profile.timer0_min..=profile.timer0_max {
            hash.set_timer0(timer0, profile.vcount);

            for date in start.iter_days().take_while(|date| *date <= end) {
                hash.set_date(date);
                hash.precompute();

                for &button in &buttons {
                    hash.set_button(button);

                    for hour in 0..24 {
                        for minute in 0..60 {
                            for second in 0..60 {
                                if progress.is_cancelled() {
                                    return;
                                }

                                hash.set_time(hour, minute, second, profile.ds_type);
                                let seed = hash.hash_seed();

                                if method == Method::Pid {
                                    generator.set_initial_advances(if bw {
                                        initial_advances_bw(seed)
                                    } else {
                                        initial_advances_bw2(seed, profile.memory_link)
                                    });
                                }

                                let states = generator.generate(seed);
                                if !states.is_empty() {
                                    let datetime = date.and_hms_opt(hour, minute, second);
                                    progress.extend(states.into_iter().map(|outcome| SearchResult {
                                        outcome,
                                        seed,
                                        datetime,
                                        buttons: Some(button),
                                        timer0: Some(timer0),
                                    }));
                                }
                            }
                        }
                    }

                    progress.tick();
                }
            }
        }
    }

    fn search_exact<F: Filter>(
        &self,
        generator: StationaryGenerator<F>,
        datetimes: &[NaiveDateTime],
        progress: &SearchProgress,
    ) {
        let profile = &self.profile;
        let buttons = profile.buttons();
        let mut hash = BootHash::new(profile);

        for timer0 in profile.timer0_min..=profile.timer0_max {
            hash.set_timer0(timer0, profile.vcount);

            for &datetime in datetimes {
                hash.set_date(datetime.date());
                hash.precompute();

                for &button in &buttons {
                    if progress.is_cancelled() {
                        return;
                    }

                    hash.set_button(button);
                    hash.set_time(datetime.hour(), datetime.minute(), datetime.second(), profile.ds_type);
                    let seed = hash.hash_seed();

                    let states = generator.generate(seed);
                    if !states.is_empty() {
                        progress.extend(states.into_iter().map(|outcome| SearchResult {
                            outcome,
                            seed,
                            datetime: Some(datetime),
                            buttons: Some(button),
                            timer0: Some(timer0),
                        }));
                    }

                    progress.tick();
                }
            }
        }
    }

    fn search_packed_slice<F: Filter>(
        &self,
        generator: StationaryGenerator<F>,
        a_range: std::ops::RangeInclusive<u32>,
        year: i32,
        progress: &SearchProgress,
    ) {
        trace!("worker a {:?}", a_range);
        let delays = delay_with_year(self.min_delay, year)..=delay_with_year(self.max_delay, year);

        for a in a_range {
            for b in 0..=PACKED_B_MAX {
                for delay in delays.clone() {
                    if progress.is_cancelled() {
                        return;
                    }

                    let seed = PackedSeed { a, b, delay }.compose(self.profile.mac);
                    let states = generator.generate(seed);
                    if !states.is_empty() {
                        progress.extend(states.into_iter().map(|outcome| SearchResult {
                            outcome,
                            seed,
                            datetime: None,
                            buttons: None,
                            timer0: None,
                        }));
                    }

                    progress.tick();
                }
            }
        }
    }

    fn timer0_count(&self) -> u64 {
        (self.profile.timer0_max - self.profile.timer0_min) as u64 + 1
    }
}

/// Split `units` into at most `threads` contiguous (offset, len) slices
///
/// The worker count is clamped to `[1, units]`; every slice gets
/// `units / workers` units and the last one absorbs the remainder.
fn split_evenly(units: usize, threads: usize) -> Vec<(usize, usize)> {
    if units == 0 {
        return Vec::new();
    }
    let workers = threads.clamp(1, units);
    let split = units / workers;
    (0..workers)
        .map(|i| {
            let offset = i * split;
            let len = if i == workers - 1 { units - offset } else { split };
            (offset, len)
        })
        .collect()
}
