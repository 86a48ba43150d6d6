//! System serial ports via the `serialport` crate

use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use serialport::SerialPort;

use super::link::{LinkOpener, SerialLink};
use super::mock_serial::{PatternLink, MOCK_PORT_PREFIX};
use crate::error::{Result, ResultExt, SerialVisError};
use crate::types::BaudRate;

/// Noise added to demo port values
const DEMO_NOISE: f64 = 0.5;

/// Largest single read from the driver
pub const MAX_READ_CHUNK: usize = 4096;

/// Opens real serial ports; `mock://` names map to the demo generator when enabled
#[derive(Debug, Clone)]
pub struct SystemOpener {
    timeout: Duration,
    mock_enabled: bool,
}

impl SystemOpener {
    pub fn new(timeout: Duration, mock_enabled: bool) -> Self {
        Self {
            timeout,
            mock_enabled,
        }
    }
}

impl LinkOpener for SystemOpener {
    fn open(&mut self, port: &str, baud: BaudRate) -> Result<Box<dyn SerialLink>> {
        if port.starts_with(MOCK_PORT_PREFIX) {
            if !self.mock_enabled {
                return Err(SerialVisError::Config(format!(
                    "Mock port {} is disabled",
                    port
                )));
            }
            tracing::info!("Opening demo port {} at {} baud", port, baud);
            return Ok(Box::new(
                PatternLink::from_port_name(port, Instant::now()).with_noise(DEMO_NOISE),
            ));
        }

        let handle = serialport::new(port, baud.as_u32())
            .timeout(self.timeout)
            .open()
            .with_context(|| format!("Failed to open {} at {} baud", port, baud))?;

        tracing::info!("Opened {} at {} baud", port, baud);
        Ok(Box::new(SystemLink {
            port: handle,
            name: port.to_string(),
            chunk: vec![0; MAX_READ_CHUNK],
        }))
    }
}

/// An open system serial port
pub struct SystemLink {
    port: Box<dyn SerialPort>,
    name: String,
    chunk: Vec<u8>,
}

impl SerialLink for SystemLink {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> std::io::Result<usize> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(0);
        }

        let want = available.min(self.chunk.len());
        match self.port.read(&mut self.chunk[..want]) {
            Ok(n) => {
                buf.extend_from_slice(&self.chunk[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SystemLink {
    fn drop(&mut self) {
        tracing::debug!("Closed {}", self.name);
    }
}
