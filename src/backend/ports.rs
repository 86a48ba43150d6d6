//! Serial port enumeration
//!
//! The worker rescans on a fixed cadence and only notifies the UI when the
//! list actually changed.

use super::mock_serial::MOCK_SINE_PORT;

/// Source of available port names
#[cfg_attr(test, mockall::automock)]
pub trait PortSource: Send {
    /// Currently available ports; enumeration failure yields an empty list
    fn list_ports(&self) -> Vec<String>;
}

/// Ports reported by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts {
    include_mock: bool,
}

impl SystemPorts {
    pub fn new(include_mock: bool) -> Self {
        Self { include_mock }
    }
}

impl PortSource for SystemPorts {
    fn list_ports(&self) -> Vec<String> {
        let mut names = match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect::<Vec<_>>(),
            Err(e) => {
                tracing::debug!("Port enumeration failed: {}", e);
                Vec::new()
            }
        };
        names.sort();
        names.dedup();
        if self.include_mock {
            names.push(MOCK_SINE_PORT.to_string());
        }
        names
    }
}

/// Displayed port list and the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    ports: Vec<String>,
    selected: Option<String>,
}

impl PortList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list if it differs; returns whether anything changed.
    ///
    /// The previous selection is kept when still present, otherwise the
    /// first port is selected (or none when the list is empty).
    pub fn refresh(&mut self, ports: Vec<String>) -> bool {
        if ports == self.ports {
            return false;
        }

        let selected = match &self.selected {
            Some(current) if ports.contains(current) => Some(current.clone()),
            _ => ports.first().cloned(),
        };

        tracing::debug!("Port list changed: {:?}", ports);
        if selected != self.selected {
            tracing::info!(
                "Port selection now {}",
                selected.as_deref().unwrap_or("<none>")
            );
        }

        self.ports = ports;
        self.selected = selected;
        true
    }

    /// Select a listed port; unknown names are ignored
    pub fn select(&mut self, port: &str) -> bool {
        if self.ports.iter().any(|p| p == port) {
            self.selected = Some(port.to_string());
            true
        } else {
            tracing::warn!("Ignoring selection of unlisted port {}", port);
            false
        }
    }

    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}
