//! Time-bounded rolling window of committed samples
//!
//! The window keeps samples in arrival order and evicts from the front once
//! the oldest sample is more than `horizon` older than the reference time.
//! The reference is the later of the caller's clock and the newest sample, so
//! a wall clock stepping backwards can neither invert the bounds nor stall
//! eviction.
//!
//! Timestamps never decrease. A sample stamped slightly earlier than the
//! newest one is clamped to the newest timestamp; a jump back by more than
//! the horizon starts the window over.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::analysis::{value_extent, SummaryStats};
use crate::types::Sample;

/// Rolling window of samples bounded by age
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    horizon: TimeDelta,
}

impl SampleWindow {
    /// Create an empty window with the given retention horizon
    pub fn new(horizon: TimeDelta) -> Self {
        Self {
            samples: VecDeque::new(),
            horizon,
        }
    }

    pub fn horizon(&self) -> TimeDelta {
        self.horizon
    }

    /// Append a sample, returning the sample as stored
    pub fn push(&mut self, mut sample: Sample) -> Sample {
        if let Some(last) = self.samples.back() {
            let behind = last.timestamp - sample.timestamp;
            if behind > self.horizon {
                tracing::warn!(
                    "Clock went backwards by {}s; restarting the window",
                    behind.num_seconds()
                );
                self.samples.clear();
            } else if sample.timestamp < last.timestamp {
                tracing::debug!(
                    "Clock went backwards by {}ms; clamping sample timestamp",
                    (last.timestamp - sample.timestamp).num_milliseconds()
                );
                sample.timestamp = last.timestamp;
            }
        }
        self.samples.push_back(sample);
        sample
    }

    fn reference(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        match self.samples.back() {
            Some(last) => now.max(last.timestamp),
            None => now,
        }
    }

    /// Drop samples older than `horizon` relative to `now`; returns the count removed
    pub fn evict(&mut self, now: DateTime<Tz>) -> usize {
        let now = self.reference(now);
        let mut removed = 0;
        while let Some(front) = self.samples.front() {
            if now - front.timestamp > self.horizon {
                self.samples.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// Visible time range: from max(oldest, now - horizon) to now
    ///
    /// `now` is raised to the newest sample if the clock is behind it.
    pub fn time_bounds(&self, now: DateTime<Tz>) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let oldest = self.samples.front()?.timestamp;
        let now = self.reference(now);
        let lower = oldest.max(now - self.horizon);
        Some((lower, now))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + Clone {
        self.samples.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        self.samples.iter().map(|s| s.value)
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Statistics over every retained value
    pub fn stats(&self) -> Option<SummaryStats> {
        SummaryStats::from_values(self.values())
    }

    /// Smallest and largest retained value
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        value_extent(self.values())
    }

    /// Points as `[epoch seconds, value]` for plotting
    pub fn as_plot_points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.epoch_secs(), s.value])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Tz> {
        chrono_tz::America::New_York
            .timestamp_opt(1_700_000_000 + secs, 0)
            .unwrap()
    }

    fn window() -> SampleWindow {
        SampleWindow::new(TimeDelta::seconds(120))
    }

    #[test]
    fn test_evicts_only_older_than_horizon() {
        let mut w = window();
        w.push(Sample::new(at(0), 1.0));
        w.push(Sample::new(at(10), 2.0));
        w.push(Sample::new(at(130), 3.0));

        // Exactly 120s old is retained
        assert_eq!(w.evict(at(130)), 1);
        assert_eq!(w.len(), 2);
        assert_eq!(w.first().unwrap().value, 2.0);

        assert_eq!(w.evict(at(131)), 1);
        assert_eq!(w.values().collect::<Vec<_>>(), vec![3.0]);
    }

    #[test]
    fn test_eviction_is_idempotent() {
        let mut w = window();
        for i in 0..300 {
            w.push(Sample::new(at(i), i as f64));
        }
        w.evict(at(299));
        let snapshot: Vec<_> = w.iter().copied().collect();
        assert_eq!(w.evict(at(299)), 0);
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn test_backwards_clock_is_clamped() {
        let mut w = window();
        w.push(Sample::new(at(10), 1.0));
        let stored = w.push(Sample::new(at(5), 2.0));
        assert_eq!(stored.timestamp, at(10));
        assert_eq!(stored.value, 2.0);
    }

    #[test]
    fn test_large_backwards_jump_restarts_window() {
        let mut w = window();
        for i in 0..5 {
            w.push(Sample::new(at(1000 + i), i as f64));
        }
        let stored = w.push(Sample::new(at(1000 - 3600), 9.0));
        assert_eq!(stored.timestamp, at(1000 - 3600));
        assert_eq!(w.len(), 1);
        assert_eq!(w.first().map(|s| s.value), Some(9.0));
    }

    #[test]
    fn test_bounds_follow_newest_sample_when_clock_lags() {
        let mut w = window();
        w.push(Sample::new(at(900), 1.0));
        w.push(Sample::new(at(1000), 2.0));

        // Clock reads an hour early: bounds stay ordered, eviction still applies
        let early = at(1000 - 3600);
        assert_eq!(w.evict(early), 0);
        assert_eq!(w.time_bounds(early), Some((at(900), at(1000))));

        w.push(Sample::new(at(1000 + 121), 3.0));
        assert_eq!(w.evict(early), 2);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_time_bounds() {
        let mut w = window();
        assert!(w.time_bounds(at(0)).is_none());

        w.push(Sample::new(at(100), 1.0));
        assert_eq!(w.time_bounds(at(150)), Some((at(100), at(150))));

        w.push(Sample::new(at(200), 1.0));
        // Before eviction the lower bound is capped at now - horizon
        assert_eq!(w.time_bounds(at(300)), Some((at(180), at(300))));
    }

    #[test]
    fn test_stats_and_extent() {
        let mut w = window();
        assert!(w.stats().is_none());
        for (i, v) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            w.push(Sample::new(at(i as i64), v));
        }
        let stats = w.stats().unwrap();
        assert!((stats.mean - 20.0).abs() < 1e-12);
        assert_eq!(w.value_extent(), Some((10.0, 30.0)));
    }

    proptest! {
        #[test]
        fn test_retained_samples_within_horizon(
            steps in prop::collection::vec(0i64..5_000, 1..400)
        ) {
            let mut w = window();
            let mut t = 0i64;
            for (i, step) in steps.iter().enumerate() {
                t += step;
                let now = chrono_tz::America::New_York
                    .timestamp_millis_opt(1_700_000_000_000 + t)
                    .unwrap();
                w.push(Sample::new(now, i as f64));
                w.evict(now);

                let newest = w.last().unwrap().timestamp;
                let mut prev: Option<DateTime<Tz>> = None;
                for s in w.iter() {
                    prop_assert!(newest - s.timestamp <= TimeDelta::seconds(120));
                    if let Some(p) = prev {
                        prop_assert!(p <= s.timestamp);
                    }
                    prev = Some(s.timestamp);
                }
            }
        }

        #[test]
        fn test_evict_twice_changes_nothing(
            offsets in prop::collection::vec(0i64..600, 1..200),
            now_offset in 0i64..800
        ) {
            let mut sorted = offsets.clone();
            sorted.sort_unstable();
            let mut w = window();
            for (i, off) in sorted.iter().enumerate() {
                w.push(Sample::new(at(*off), i as f64));
            }
            let now = at(now_offset.max(*sorted.last().unwrap()));
            w.evict(now);
            let before: Vec<_> = w.iter().copied().collect();
            prop_assert_eq!(w.evict(now), 0);
            prop_assert_eq!(w.iter().copied().collect::<Vec<_>>(), before);
        }
    }
}
