//! Serial reader: turns device bytes into pending values
//!
//! [`SerialReader::poll`] runs on every poll tick. It opens the link lazily,
//! drains whatever the driver already holds, splits it into lines and
//! appends every valid value to the session's pending buffer.
//!
//! # Failure handling
//!
//! - Malformed lines (empty, non-numeric, non-finite, overlong) are logged
//!   and dropped; draining continues.
//! - Open failures and device read failures close the link. The next poll
//!   tries again, so a replugged device recovers without a restart.
//! - [`LinkHealth`] limits user-visible notices to one per failure episode:
//!   a [`Notice`] is returned only on the `Healthy -> Faulted` transition,
//!   and a successful open or read returns the link to `Healthy`.

use super::link::{LinkOpener, SerialLink};
use crate::config::ValueRange;
use crate::error::{Result, SerialVisError};
use crate::session::AcquisitionSession;
use crate::types::{BaudRate, ConnectionStatus, LinkStats, Notice, NoticeKind};

/// Longest accepted line, in bytes, without its terminator
pub const MAX_LINE_LEN: usize = 1024;

/// Upper bound on driver reads in a single poll
pub const MAX_READS_PER_POLL: usize = 64;

/// Parse one line as a sample value
pub fn parse_value(line: &str) -> Result<f64> {
    match line.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SerialVisError::Parse {
            line: line.to_string(),
        }),
    }
}

// ==================== Line Buffer ====================

/// Splits a byte stream on `\n`, carrying partial lines between reads
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    partial: Vec<u8>,
    overflowed: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, appending each complete line to `out`.
    ///
    /// Lines are decoded as lossy UTF-8 with the terminator removed. Returns
    /// how many overlong lines were discarded.
    pub fn feed(&mut self, bytes: &[u8], out: &mut Vec<String>) -> usize {
        let mut discarded = 0;
        for &byte in bytes {
            if byte == b'\n' {
                if !self.overflowed {
                    out.push(String::from_utf8_lossy(&self.partial).into_owned());
                }
                self.overflowed = false;
                self.partial.clear();
            } else if !self.overflowed {
                self.partial.push(byte);
                if self.partial.len() > MAX_LINE_LEN {
                    self.overflowed = true;
                    self.partial.clear();
                    discarded += 1;
                }
            }
        }
        discarded
    }

    /// Bytes held for an unterminated line
    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }

    pub fn clear(&mut self) {
        self.partial.clear();
        self.overflowed = false;
    }
}

// ==================== Link Health ====================

/// Failure-episode state used to de-duplicate notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkHealth {
    #[default]
    Healthy,
    Faulted,
}

impl LinkHealth {
    /// Enter `Faulted`; true when this starts a new episode
    pub fn fault(&mut self) -> bool {
        let entered = *self == LinkHealth::Healthy;
        *self = LinkHealth::Faulted;
        entered
    }

    /// Return to `Healthy`; true when this ends an episode
    pub fn recover(&mut self) -> bool {
        let left = *self == LinkHealth::Faulted;
        *self = LinkHealth::Healthy;
        left
    }
}

// ==================== Serial Reader ====================

struct OpenLink {
    link: Box<dyn SerialLink>,
    port: String,
    baud: BaudRate,
}

/// Polls the selected serial port into the session's pending buffer
pub struct SerialReader {
    opener: Box<dyn LinkOpener>,
    link: Option<OpenLink>,
    health: LinkHealth,
    lines: LineBuffer,
    range: Option<ValueRange>,
    stats: LinkStats,
    opened_once: bool,
    read_buf: Vec<u8>,
}

impl SerialReader {
    /// Create a reader; `range` enables value validation
    pub fn new(opener: Box<dyn LinkOpener>, range: Option<ValueRange>) -> Self {
        Self {
            opener,
            link: None,
            health: LinkHealth::Healthy,
            lines: LineBuffer::new(),
            range,
            stats: LinkStats::default(),
            opened_once: false,
            read_buf: Vec::with_capacity(super::serial::MAX_READ_CHUNK),
        }
    }

    /// Run one poll step against `session`.
    ///
    /// Returns a notice when a failure episode begins.
    pub fn poll(&mut self, session: &mut AcquisitionSession) -> Option<Notice> {
        if !session.is_running() {
            return None;
        }

        let (port, baud) = match session.selection().resolved() {
            Some((port, baud)) => (port.to_string(), baud),
            None => {
                if session.selection().port.is_none() {
                    tracing::debug!("Configuration error: no port selected");
                } else {
                    tracing::debug!("Configuration error: no baud rate selected");
                }
                return None;
            }
        };

        if let Some(open) = &self.link {
            if open.port != port || open.baud != baud {
                tracing::info!(
                    "Selection changed from {} @ {}; closing link",
                    open.port,
                    open.baud
                );
                self.close();
            }
        }

        if self.link.is_none() {
            if let Err(e) = self.open(&port, baud) {
                tracing::error!("Error opening port {}: {}", port, e);
                return self.fault(
                    NoticeKind::OpenFailed,
                    format!("Error opening port {}: {}", port, e),
                );
            }
        }

        self.drain(session, &port)
    }

    fn open(&mut self, port: &str, baud: BaudRate) -> Result<()> {
        let link = self.opener.open(port, baud)?;
        if self.opened_once {
            self.stats.reconnects += 1;
            tracing::info!("Reconnected to {} at {} baud", port, baud);
        } else {
            tracing::info!("Connected to {} at {} baud", port, baud);
        }
        self.opened_once = true;
        self.lines.clear();
        self.link = Some(OpenLink {
            link,
            port: port.to_string(),
            baud,
        });
        self.recover();
        Ok(())
    }

    fn drain(&mut self, session: &mut AcquisitionSession, port: &str) -> Option<Notice> {
        let mut lines = Vec::new();
        for _ in 0..MAX_READS_PER_POLL {
            self.read_buf.clear();
            let result = match self.link.as_mut() {
                Some(open) => open.link.read_available(&mut self.read_buf),
                None => return None,
            };

            match result {
                Ok(0) => break,
                Ok(n) => {
                    self.stats.bytes_read += n as u64;
                    self.recover();
                    let overlong = self.lines.feed(&self.read_buf, &mut lines);
                    if overlong > 0 {
                        self.stats.parse_errors += overlong as u64;
                        tracing::warn!(
                            "Discarded {} line(s) longer than {} bytes",
                            overlong,
                            MAX_LINE_LEN
                        );
                    }
                    for line in lines.drain(..) {
                        self.accept_line(session, &line);
                    }
                }
                Err(e) => {
                    self.stats.io_errors += 1;
                    tracing::error!("Device read error on {}: {}", port, e);
                    self.close();
                    return self.fault(
                        NoticeKind::DeviceReadError,
                        format!("Device read error: {}", e),
                    );
                }
            }
        }
        None
    }

    fn accept_line(&mut self, session: &mut AcquisitionSession, line: &str) {
        match parse_value(line) {
            Ok(value) => {
                if let Some(range) = self.range {
                    if !range.contains(value) {
                        self.stats.out_of_range += 1;
                        tracing::warn!(
                            "Invalid value, out of range [{}, {}]: {}",
                            range.min,
                            range.max,
                            value
                        );
                        return;
                    }
                }
                self.stats.samples_accepted += 1;
                session.push_pending(value);
            }
            Err(e) => {
                self.stats.parse_errors += 1;
                tracing::warn!("{}", e);
            }
        }
    }

    fn fault(&mut self, kind: NoticeKind, message: String) -> Option<Notice> {
        if self.health.fault() {
            Some(Notice::new(kind, message))
        } else {
            tracing::debug!("Suppressed repeat notice: {}", message);
            None
        }
    }

    fn recover(&mut self) {
        if self.health.recover() {
            tracing::info!("Serial link healthy again");
        }
    }

    /// Close the link if open; the next poll reopens it
    pub fn close(&mut self) {
        if let Some(open) = self.link.take() {
            tracing::debug!("Closing {}", open.link.name());
        }
        self.lines.clear();
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    pub fn health(&self) -> LinkHealth {
        self.health
    }

    pub fn status(&self) -> ConnectionStatus {
        match (&self.link, self.health) {
            (Some(_), _) => ConnectionStatus::Connected,
            (None, LinkHealth::Faulted) => ConnectionStatus::Error,
            (None, LinkHealth::Healthy) => ConnectionStatus::Disconnected,
        }
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}
