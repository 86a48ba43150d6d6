//! Error handling for SerialVis
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for SerialVis operations
#[derive(Error, Debug)]
pub enum SerialVisError {
    /// Errors raised by the serial port driver (open, configure)
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Baud rate outside the supported set
    #[error("Unsupported baud rate: {0}")]
    InvalidBaud(u32),

    /// A serial line that could not be parsed as a sample
    #[error("Value read error: {line:?}")]
    Parse { line: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SerialVisError>,
    },
}

impl SerialVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SerialVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for SerialVis operations
pub type Result<T> = std::result::Result<T, SerialVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SerialVisError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
