//! Serial link traits
//!
//! The reader only talks to these two traits, so real ports, the demo
//! generator and test devices are interchangeable.

use crate::error::Result;
use crate::types::BaudRate;

/// Byte stream from an open serial device
pub trait SerialLink: Send {
    /// Append the bytes the driver already holds to `buf` without blocking.
    ///
    /// Returns the number of bytes appended; `Ok(0)` means nothing was
    /// available. An error means the device failed and the link is unusable.
    fn read_available(&mut self, buf: &mut Vec<u8>) -> std::io::Result<usize>;

    /// Port name the link was opened on
    fn name(&self) -> &str;
}

/// Opens links for a port and baud rate
pub trait LinkOpener: Send {
    fn open(&mut self, port: &str, baud: BaudRate) -> Result<Box<dyn SerialLink>>;
}
