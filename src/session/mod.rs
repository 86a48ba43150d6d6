//! Acquisition session state
//!
//! An [`AcquisitionSession`] is the explicit state passed to every component
//! operation: the serial reader appends to its pending buffer, the render
//! scheduler moves pending values into the window, and the exporter reads
//! the window (or the session history). All of them run on the backend
//! worker thread, so the session needs no interior locking.
//!
//! # Lifecycle
//!
//! - [`AcquisitionSession::start`] clears the window, the pending buffer and
//!   the history, then opens the acquisition gate.
//! - [`AcquisitionSession::stop`] closes the gate; in-flight data stays.
//! - [`AcquisitionSession::clear`] empties everything and requests a
//!   placeholder redraw without touching the gate.

pub mod clock;
pub mod render;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use render::{LiveFrame, PlotFrame, RenderScheduler};
pub use window::SampleWindow;

use std::time::Instant;

use chrono::TimeDelta;

use crate::config::ExportScope;
use crate::types::{BaudRate, Sample};

/// Whether acquisition is running, and since when
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionState {
    pub running: bool,
    pub start_time: Option<Instant>,
}

/// Typed port and baud selection made by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub port: Option<String>,
    pub baud: Option<BaudRate>,
}

impl Selection {
    /// Port and baud when both are set
    pub fn resolved(&self) -> Option<(&str, BaudRate)> {
        match (&self.port, self.baud) {
            (Some(port), Some(baud)) => Some((port.as_str(), baud)),
            _ => None,
        }
    }
}

/// Parsed values waiting for the next render tick
#[derive(Debug, Clone, Default)]
pub struct PendingBuffer {
    values: Vec<f64>,
}

impl PendingBuffer {
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Take every pending value, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.values)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// State shared by the reader, the render scheduler and the exporter
#[derive(Debug)]
pub struct AcquisitionSession {
    state: AcquisitionState,
    selection: Selection,
    pending: PendingBuffer,
    window: SampleWindow,
    /// Every committed sample since start/clear, kept only for session-scope export
    history: Option<Vec<Sample>>,
    redraw_requested: bool,
}

impl AcquisitionSession {
    /// Create an idle session
    pub fn new(horizon: TimeDelta, export_scope: ExportScope) -> Self {
        Self {
            state: AcquisitionState::default(),
            selection: Selection::default(),
            pending: PendingBuffer::default(),
            window: SampleWindow::new(horizon),
            history: match export_scope {
                ExportScope::Window => None,
                ExportScope::Session => Some(Vec::new()),
            },
            redraw_requested: false,
        }
    }

    // ---- user entry points ----

    pub fn set_port(&mut self, port: Option<String>) {
        if self.selection.port != port {
            tracing::info!("Selected port: {}", port.as_deref().unwrap_or("<none>"));
            self.selection.port = port;
        }
    }

    pub fn set_baud(&mut self, baud: BaudRate) {
        if self.selection.baud != Some(baud) {
            tracing::info!("Selected baud rate: {}", baud);
            self.selection.baud = Some(baud);
        }
    }

    /// Begin a new acquisition episode
    pub fn start(&mut self) {
        self.reset_data();
        self.state = AcquisitionState {
            running: true,
            start_time: Some(Instant::now()),
        };
        tracing::info!("Starting data acquisition...");
    }

    /// Close the acquisition gate; the next periodic callbacks become no-ops
    pub fn stop(&mut self) {
        self.state.running = false;
        tracing::info!("Stopping data acquisition...");
    }

    /// Empty the window and pending buffer and show the placeholder
    pub fn clear(&mut self) {
        self.reset_data();
        self.redraw_requested = true;
        tracing::info!("Clearing plot...");
    }

    fn reset_data(&mut self) {
        self.pending.clear();
        self.window.clear();
        if let Some(history) = self.history.as_mut() {
            history.clear();
        }
    }

    // ---- component access ----

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending(&self) -> &PendingBuffer {
        &self.pending
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn history(&self) -> Option<&[Sample]> {
        self.history.as_deref()
    }

    /// Samples an export of `scope` covers, oldest first
    pub fn export_samples(&self, scope: ExportScope) -> Vec<Sample> {
        match (scope, self.history.as_ref()) {
            (ExportScope::Session, Some(history)) => history.clone(),
            (ExportScope::Session, None) => {
                tracing::warn!("Session history not recorded; exporting window only");
                self.window.iter().copied().collect()
            }
            (ExportScope::Window, _) => self.window.iter().copied().collect(),
        }
    }

    pub(crate) fn push_pending(&mut self, value: f64) {
        self.pending.push(value);
    }

    pub(crate) fn drain_pending(&mut self) -> Vec<f64> {
        self.pending.drain()
    }

    /// Append to the window (and history); returns the sample as stored
    pub(crate) fn commit(&mut self, sample: Sample) -> Sample {
        let stored = self.window.push(sample);
        if let Some(history) = self.history.as_mut() {
            history.push(stored);
        }
        stored
    }

    pub(crate) fn window_mut(&mut self) -> &mut SampleWindow {
        &mut self.window
    }

    pub(crate) fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(scope: ExportScope) -> AcquisitionSession {
        AcquisitionSession::new(TimeDelta::seconds(120), scope)
    }

    fn sample(secs: i64, value: f64) -> Sample {
        let ts = chrono_tz::America::New_York
            .timestamp_opt(1_700_000_000 + secs, 0)
            .unwrap();
        Sample::new(ts, value)
    }

    #[test]
    fn test_selection_resolved_requires_both() {
        let mut s = session(ExportScope::Window);
        assert!(s.selection().resolved().is_none());
        s.set_port(Some("/dev/ttyUSB0".to_string()));
        assert!(s.selection().resolved().is_none());
        s.set_baud(BaudRate::B19200);
        assert_eq!(
            s.selection().resolved(),
            Some(("/dev/ttyUSB0", BaudRate::B19200))
        );
    }

    #[test]
    fn test_start_resets_data_and_opens_gate() {
        let mut s = session(ExportScope::Window);
        s.push_pending(1.0);
        s.commit(sample(0, 1.0));
        assert!(!s.is_running());

        s.start();
        assert!(s.is_running());
        assert!(s.state().start_time.is_some());
        assert!(s.pending().is_empty());
        assert!(s.window().is_empty());
    }

    #[test]
    fn test_clear_empties_and_requests_redraw() {
        let mut s = session(ExportScope::Session);
        s.start();
        s.push_pending(3.0);
        s.commit(sample(0, 2.0));

        s.clear();
        assert!(s.is_running());
        assert!(s.pending().is_empty());
        assert!(s.window().is_empty());
        assert_eq!(s.history().map(<[Sample]>::len), Some(0));
        assert!(s.take_redraw_request());
        assert!(!s.take_redraw_request());
    }

    #[test]
    fn test_stop_keeps_data() {
        let mut s = session(ExportScope::Window);
        s.start();
        s.commit(sample(0, 2.0));
        s.stop();
        assert!(!s.is_running());
        assert_eq!(s.window().len(), 1);
    }

    #[test]
    fn test_export_scope_session_outlives_window() {
        let mut s = session(ExportScope::Session);
        s.start();
        s.commit(sample(0, 1.0));
        s.commit(sample(200, 2.0));
        s.window_mut().evict(sample(200, 0.0).timestamp);

        assert_eq!(s.export_samples(ExportScope::Window).len(), 1);
        assert_eq!(s.export_samples(ExportScope::Session).len(), 2);
    }

    #[test]
    fn test_pending_buffer_drain() {
        let mut pending = PendingBuffer::default();
        pending.push(1.0);
        pending.push(2.0);
        assert_eq!(pending.latest(), Some(2.0));
        assert_eq!(pending.drain(), vec![1.0, 2.0]);
        assert!(pending.is_empty());
    }
}
