//! Mock serial devices for testing and demos
//!
//! Two kinds of fake device live here:
//!
//! - [`MockDevice`] - a scripted device. Tests feed it lines, make opens fail
//!   or make the next read fail, then inspect how often it was opened.
//! - [`PatternLink`] - a generator producing newline-terminated values from a
//!   [`MockDataPattern`]. It backs the `mock://` demo ports offered when the
//!   `mock-serial` feature (or `acquisition.mock_port`) is enabled.
//!
//! # Example
//!
//! ```ignore
//! use serialvis::backend::mock_serial::MockDevice;
//!
//! let device = MockDevice::new();
//! device.feed_line("1.5");
//! device.fail_next_read();
//! let opener = device.opener();
//! ```

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::link::{LinkOpener, SerialLink};
use crate::error::{Result, SerialVisError};
use crate::types::BaudRate;

/// Prefix of synthetic port names
pub const MOCK_PORT_PREFIX: &str = "mock://";

/// Default demo port listed by the port enumerator
pub const MOCK_SINE_PORT: &str = "mock://sine";

/// Lines per second emitted by a [`PatternLink`]
pub const PATTERN_LINE_RATE_HZ: f64 = 20.0;

// ==================== Data Patterns ====================

/// Pattern for generating demo values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockDataPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave around `offset`
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter that increments and wraps
    Counter { step: f64, min: f64, max: f64 },
    /// Linear ramp that resets every period
    Sawtooth { period: f64, amplitude: f64 },
    /// Square wave
    Square { period: f64, amplitude: f64 },
}

impl Default for MockDataPattern {
    fn default() -> Self {
        MockDataPattern::Sine {
            frequency: 0.1,
            amplitude: 40.0,
            offset: 50.0,
        }
    }
}

impl MockDataPattern {
    /// Pattern for a `mock://<name>` port; unknown names get the default sine
    pub fn for_port(port: &str) -> Self {
        match port.strip_prefix(MOCK_PORT_PREFIX).unwrap_or(port) {
            "counter" => MockDataPattern::Counter {
                step: 1.0,
                min: 0.0,
                max: 100.0,
            },
            "sawtooth" => MockDataPattern::Sawtooth {
                period: 10.0,
                amplitude: 100.0,
            },
            "square" => MockDataPattern::Square {
                period: 4.0,
                amplitude: 50.0,
            },
            _ => MockDataPattern::default(),
        }
    }
}

/// Pattern state for one generated stream
#[derive(Debug, Clone)]
struct PatternGenerator {
    pattern: MockDataPattern,
    counter_value: f64,
    noise_amplitude: f64,
    seed: u64,
}

impl PatternGenerator {
    fn new(pattern: MockDataPattern) -> Self {
        Self {
            pattern,
            counter_value: 0.0,
            noise_amplitude: 0.0,
            seed: 12345,
        }
    }

    fn generate(&mut self, elapsed_secs: f64) -> f64 {
        let base = match self.pattern {
            MockDataPattern::Constant(v) => v,
            MockDataPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * elapsed_secs).sin(),
            MockDataPattern::Counter { step, min, max } => {
                self.counter_value += step;
                if self.counter_value > max {
                    self.counter_value = min;
                }
                self.counter_value
            }
            MockDataPattern::Sawtooth { period, amplitude } => {
                amplitude * ((elapsed_secs % period) / period)
            }
            MockDataPattern::Square { period, amplitude } => {
                if elapsed_secs % period < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        };

        if self.noise_amplitude > 0.0 {
            base + (self.next_unit() - 0.5) * 2.0 * self.noise_amplitude
        } else {
            base
        }
    }

    /// xorshift in [0, 1]
    fn next_unit(&mut self) -> f64 {
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        s as f64 / u64::MAX as f64
    }
}

// ==================== Pattern Link ====================

/// Link that emits one generated value per line at [`PATTERN_LINE_RATE_HZ`]
#[derive(Debug, Clone)]
pub struct PatternLink {
    name: String,
    generator: PatternGenerator,
    started: Instant,
    emitted: u64,
}

impl PatternLink {
    pub fn new(name: impl Into<String>, pattern: MockDataPattern, started: Instant) -> Self {
        Self {
            name: name.into(),
            generator: PatternGenerator::new(pattern),
            started,
            emitted: 0,
        }
    }

    /// Link for a `mock://<pattern>` port name
    pub fn from_port_name(port: &str, started: Instant) -> Self {
        Self::new(port, MockDataPattern::for_port(port), started)
    }

    /// Add uniform noise of +/- `amplitude`
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.generator.noise_amplitude = amplitude;
        self
    }

    /// Emit every line due by `now`
    pub fn read_until(&mut self, now: Instant, buf: &mut Vec<u8>) -> usize {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let due = (elapsed * PATTERN_LINE_RATE_HZ).floor() as u64;
        let before = buf.len();
        while self.emitted < due {
            self.emitted += 1;
            let t = self.emitted as f64 / PATTERN_LINE_RATE_HZ;
            let value = self.generator.generate(t);
            buf.extend_from_slice(format!("{:.3}\n", value).as_bytes());
        }
        buf.len() - before
    }
}

impl SerialLink for PatternLink {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> std::io::Result<usize> {
        Ok(self.read_until(Instant::now(), buf))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ==================== Scripted Device ====================

#[derive(Debug, Default)]
struct DeviceState {
    inbound: VecDeque<u8>,
    fail_opens: usize,
    fail_next_read: bool,
    open_count: usize,
    last_open: Option<(String, BaudRate)>,
}

/// Scripted serial device; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue raw bytes for the next read
    pub fn feed_bytes(&self, bytes: &[u8]) {
        self.lock().inbound.extend(bytes.iter().copied());
    }

    /// Queue a line; a trailing newline is appended
    pub fn feed_line(&self, line: &str) {
        let mut state = self.lock();
        state.inbound.extend(line.bytes());
        state.inbound.push_back(b'\n');
    }

    /// Make the next `count` open attempts fail
    pub fn fail_opens(&self, count: usize) {
        self.lock().fail_opens = count;
    }

    /// Make the next read on an open link fail with an I/O error
    pub fn fail_next_read(&self) {
        self.lock().fail_next_read = true;
    }

    /// Successful opens so far
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Port and baud of the most recent successful open
    pub fn last_open(&self) -> Option<(String, BaudRate)> {
        self.lock().last_open.clone()
    }

    /// Opener handing out links to this device
    pub fn opener(&self) -> MockOpener {
        MockOpener {
            device: self.clone(),
        }
    }
}

/// [`LinkOpener`] for a [`MockDevice`]
#[derive(Debug, Clone)]
pub struct MockOpener {
    device: MockDevice,
}

impl LinkOpener for MockOpener {
    fn open(&mut self, port: &str, baud: BaudRate) -> Result<Box<dyn SerialLink>> {
        let mut state = self.device.lock();
        if state.fail_opens > 0 {
            state.fail_opens -= 1;
            return Err(SerialVisError::Serial(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                format!("{} is not available", port),
            )));
        }
        state.open_count += 1;
        state.last_open = Some((port.to_string(), baud));
        Ok(Box::new(MockLink {
            device: self.device.clone(),
            name: port.to_string(),
        }))
    }
}

/// Open link to a [`MockDevice`]
#[derive(Debug)]
pub struct MockLink {
    device: MockDevice,
    name: String,
}

impl SerialLink for MockLink {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> std::io::Result<usize> {
        let mut state = self.device.lock();
        if std::mem::take(&mut state.fail_next_read) {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "device unplugged"));
        }
        let n = state.inbound.len();
        buf.extend(state.inbound.drain(..));
        Ok(n)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
