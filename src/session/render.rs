//! Render tick: commits pending values and produces plot frames
//!
//! The scheduler is pure with respect to drawing. It mutates the session
//! (drain, commit, evict) and hands back a [`PlotFrame`] the frontend draws
//! as-is, so every visible bound is decided here and tested without a UI.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use super::{AcquisitionSession, SampleWindow};
use crate::analysis::SummaryStats;
use crate::config::{PendingPolicy, YAxisMode};
use crate::types::Sample;

/// Fraction of the data span added above and below in auto mode
pub const AUTO_PADDING: f64 = 0.05;

/// Half-height of the auto axis when every value is equal
pub const FLAT_HALF_SPAN: f64 = 1.0;

/// What the plot area should show
#[derive(Debug, Clone, PartialEq)]
pub enum PlotFrame {
    /// Placeholder: "Data Acquisition Inactive"
    Inactive,
    /// Live line plot of the window
    Live(LiveFrame),
}

/// Snapshot of the window ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFrame {
    /// `[epoch seconds, value]` in commit order
    pub points: Vec<[f64; 2]>,
    /// Time axis range in epoch seconds
    pub x_bounds: (f64, f64),
    /// Value axis range
    pub y_bounds: (f64, f64),
    /// Zone used for tick labels
    pub time_zone: Tz,
    /// strftime pattern for tick labels
    pub time_format: String,
    /// Newest committed sample
    pub latest: Option<Sample>,
    /// Statistics over the window
    pub stats: Option<SummaryStats>,
}

impl LiveFrame {
    /// Format an x coordinate (epoch seconds) as a tick label
    pub fn format_tick(&self, x_secs: f64) -> String {
        format_epoch_secs(self.time_zone, &self.time_format, x_secs)
    }
}

/// Format epoch seconds in `tz` with a strftime pattern; empty on failure
pub fn format_epoch_secs(tz: Tz, pattern: &str, x_secs: f64) -> String {
    if !x_secs.is_finite() {
        return String::new();
    }
    let millis = (x_secs * 1000.0).round() as i64;
    let Some(time) = tz.timestamp_millis_opt(millis).single() else {
        return String::new();
    };
    let mut label = String::new();
    if write!(label, "{}", time.format(pattern)).is_err() {
        label.clear();
    }
    label
}

/// Value axis bounds for a data extent
pub fn y_bounds(mode: YAxisMode, extent: Option<(f64, f64)>) -> (f64, f64) {
    match mode {
        YAxisMode::Fixed { min, max } => (min, max),
        YAxisMode::Auto => match extent {
            None => (0.0, FLAT_HALF_SPAN),
            Some((lo, hi)) => {
                let span = hi - lo;
                if span <= f64::EPSILON * lo.abs().max(1.0) {
                    (lo - FLAT_HALF_SPAN, hi + FLAT_HALF_SPAN)
                } else {
                    let pad = span * AUTO_PADDING;
                    (lo - pad, hi + pad)
                }
            }
        },
    }
}

/// Periodic render step
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    policy: PendingPolicy,
    y_axis: YAxisMode,
    time_format: String,
    live: bool,
}

impl RenderScheduler {
    pub fn new(policy: PendingPolicy, y_axis: YAxisMode, time_format: impl Into<String>) -> Self {
        Self {
            policy,
            y_axis,
            time_format: time_format.into(),
            live: false,
        }
    }

    pub fn policy(&self) -> PendingPolicy {
        self.policy
    }

    /// Whether the last frame produced was live
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Run one render step at `now`.
    ///
    /// Returns `None` when nothing changed: acquisition inactive or no
    /// pending values. A pending clear forces a [`PlotFrame::Inactive`].
    pub fn tick(&mut self, session: &mut AcquisitionSession, now: DateTime<Tz>) -> Option<PlotFrame> {
        let redraw = session.take_redraw_request();
        if redraw && (!session.is_running() || session.pending().is_empty()) {
            if self.live {
                tracing::debug!("Plot cleared; showing placeholder");
            }
            self.live = false;
            return Some(PlotFrame::Inactive);
        }

        if !session.is_running() || session.pending().is_empty() {
            return None;
        }

        let drained = session.drain_pending();
        let drained_len = drained.len();
        let batch = self.policy.reduce(drained);
        if drained_len > batch.len() {
            tracing::trace!(
                "{} policy committed {} of {} pending values",
                self.policy,
                batch.len(),
                drained_len
            );
        }
        for value in batch {
            session.commit(Sample::new(now, value));
        }

        let evicted = session.window_mut().evict(now);
        if evicted > 0 {
            tracing::trace!("Evicted {} samples older than the horizon", evicted);
        }

        let frame = self.live_frame(session.window(), now)?;
        if !self.live {
            tracing::info!("Plot live");
            self.live = true;
        }
        Some(PlotFrame::Live(frame))
    }

    fn live_frame(&self, window: &SampleWindow, now: DateTime<Tz>) -> Option<LiveFrame> {
        let (lower, upper) = window.time_bounds(now)?;
        let to_secs = |t: DateTime<Tz>| t.timestamp_millis() as f64 / 1000.0;
        Some(LiveFrame {
            points: window.as_plot_points(),
            x_bounds: (to_secs(lower), to_secs(upper)),
            y_bounds: y_bounds(self.y_axis, window.value_extent()),
            time_zone: now.timezone(),
            time_format: self.time_format.clone(),
            latest: window.last().copied(),
            stats: window.stats(),
        })
    }
}
