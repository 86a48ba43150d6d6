//! Core data types for SerialVis
//!
//! This module contains the fundamental data structures shared by the
//! backend worker, the session and the frontend.
//!
//! # Main Types
//!
//! - [`Sample`] - A single timestamped reading from the device
//! - [`BaudRate`] - The closed set of supported line speeds
//! - [`ConnectionStatus`] - Link state as reported to the UI
//! - [`LinkStats`] - Counters kept by the serial reader
//! - [`Notice`] - A user-visible notification (connection or export failure)

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::SerialVisError;

/// One timestamped scalar reading from the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Commit time in the fixed display time zone
    pub timestamp: DateTime<Tz>,
    /// Parsed value
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp: DateTime<Tz>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Timestamp as fractional seconds since the Unix epoch (plot X coordinate)
    pub fn epoch_secs(&self) -> f64 {
        self.timestamp.timestamp_millis() as f64 / 1000.0
    }
}

/// Supported serial line speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    #[default]
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    /// All supported rates in ascending order
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// Numeric rate in bits per second
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115_200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = SerialVisError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|b| b.as_u32() == value)
            .ok_or(SerialVisError::InvalidBaud(value))
    }
}

impl From<BaudRate> for u32 {
    fn from(value: BaudRate) -> Self {
        value.as_u32()
    }
}

impl std::fmt::Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Represents the state of the serial link as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No link open
    #[default]
    Disconnected,
    /// Link open and readable
    Connected,
    /// Last open or read attempt failed; retried on the next poll
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Counters kept by the serial reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Lines parsed into accepted samples
    pub samples_accepted: u64,
    /// Raw bytes read from the device
    pub bytes_read: u64,
    /// Empty or non-numeric lines
    pub parse_errors: u64,
    /// Values rejected by range validation
    pub out_of_range: u64,
    /// Device-level read failures
    pub io_errors: u64,
    /// Successful opens after the first
    pub reconnects: u64,
    /// Frames dropped because the UI queue was full
    pub dropped_frames: u64,
}

impl LinkStats {
    /// Percentage of lines that became samples
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.samples_accepted + self.parse_errors + self.out_of_range;
        if total == 0 {
            100.0
        } else {
            (self.samples_accepted as f64 / total as f64) * 100.0
        }
    }
}

/// Category of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The port could not be opened
    OpenFailed,
    /// The device failed while reading
    DeviceReadError,
    /// The export could not be written
    ExportFailed,
}

/// A notification the UI shell shows as a blocking dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Dialog title for this notice
    pub fn title(&self) -> &'static str {
        match self.kind {
            NoticeKind::OpenFailed => "Error",
            NoticeKind::DeviceReadError => "Device Error",
            NoticeKind::ExportFailed => "Export Failed",
        }
    }
}
