//! Mock construction helpers

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serialvis::backend::{BackendMessage, FrontendReceiver, MockDevice, PortSource, WorkerParts};
use serialvis::session::{ManualClock, SystemClock};

use super::builders::{BASE_EPOCH_SECS, TEST_TZ};

/// Port source whose list tests can change while the backend runs
#[derive(Debug, Clone, Default)]
pub struct FixedPorts {
    ports: Arc<Mutex<Vec<String>>>,
}

impl FixedPorts {
    pub fn new(ports: &[&str]) -> Self {
        let source = Self::default();
        source.set(ports);
        source
    }

    pub fn set(&self, ports: &[&str]) {
        let mut guard = self.ports.lock().unwrap();
        *guard = ports.iter().map(|p| p.to_string()).collect();
    }
}

impl PortSource for FixedPorts {
    fn list_ports(&self) -> Vec<String> {
        self.ports.lock().unwrap().clone()
    }
}

/// Manual clock at the base test epoch
pub fn reference_clock() -> ManualClock {
    ManualClock::at_millis(TEST_TZ, BASE_EPOCH_SECS * 1000)
}

/// Worker parts backed by a mock device and a fixed port list
pub fn mock_parts(device: &MockDevice, ports: &FixedPorts) -> WorkerParts {
    WorkerParts {
        opener: Box::new(device.opener()),
        ports: Box::new(ports.clone()),
        clock: Box::new(SystemClock::new(TEST_TZ)),
    }
}

/// Wait until `pick` accepts a message, or the timeout passes
pub fn wait_for<T>(
    frontend: &FrontendReceiver,
    timeout: Duration,
    mut pick: impl FnMut(&BackendMessage) -> Option<T>,
) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        match frontend.receiver.recv_timeout(remaining) {
            Ok(msg) => {
                if let Some(found) = pick(&msg) {
                    return Some(found);
                }
            }
            Err(_) => return None,
        }
    }
}
