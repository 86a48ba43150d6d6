//! Backend module for serial acquisition
//!
//! This module runs all serial I/O, rendering and export in a separate
//! thread to keep the UI responsive. It uses crossbeam channels for
//! thread-safe communication with the frontend.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (select, start, export, etc.)
//! - [`BackendMessage`] - Messages sent from backend to UI (frames, ports, notices)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`SerialBackend`] - Main backend entry point run on the worker thread
//!
//! # Components
//!
//! - [`SerialReader`] - Lazy-open, non-blocking line reader with failure de-duplication
//! - [`PortList`] / [`PortSource`] - Port enumeration and selection
//! - [`BackendWorker`] - Event loop running the periodic tasks
//! - [`MockDevice`] / [`PatternLink`] - Fake devices for tests and demos
//!
//! # Example
//!
//! ```ignore
//! use serialvis::backend::{BackendMessage, SerialBackend};
//! use serialvis::config::AppConfig;
//!
//! let (backend, frontend) = SerialBackend::new(AppConfig::default());
//! std::thread::spawn(move || backend.run());
//!
//! frontend.start();
//! for msg in frontend.drain() {
//!     if let BackendMessage::Frame { frame, .. } = msg {
//!         // draw the frame
//!     }
//! }
//! ```

pub mod link;
pub mod mock_serial;
pub mod ports;
pub mod reader;
pub mod serial;
pub mod worker;

pub use link::{LinkOpener, SerialLink};
pub use mock_serial::{MockDataPattern, MockDevice, MockOpener, PatternLink, MOCK_SINE_PORT};
pub use ports::{PortList, PortSource, SystemPorts};
pub use reader::{parse_value, LineBuffer, LinkHealth, SerialReader};
pub use serial::SystemOpener;
pub use worker::{BackendWorker, Periodic, WorkerParts};

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::AppConfig;
use crate::session::PlotFrame;
use crate::types::{BaudRate, ConnectionStatus, LinkStats, Notice};

/// Message sent from the UI to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Select a listed port by name
    SelectPort(String),
    /// Set the baud rate
    SetBaud(BaudRate),
    /// Start acquisition (clears previous data)
    Start,
    /// Stop acquisition
    Stop,
    /// Empty the plot and buffers
    Clear,
    /// Write the CSV export
    Export,
    /// Change where exports are written
    SetExportDirectory(PathBuf),
    /// Rescan ports now
    RefreshPorts,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Port list changed
    PortList {
        ports: Vec<String>,
        selected: Option<String>,
    },
    /// Connection status changed
    Status(ConnectionStatus),
    /// Acquisition started or stopped
    Running(bool),
    /// New plot frame after a render tick
    Frame { frame: PlotFrame, stats: LinkStats },
    /// Something the user must acknowledge
    Notice(Notice),
    /// Export written
    Exported(PathBuf),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        self.receiver.try_iter().collect()
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    pub fn select_port(&self, port: impl Into<String>) {
        let _ = self
            .command_sender
            .send(BackendCommand::SelectPort(port.into()));
    }

    pub fn set_baud(&self, baud: BaudRate) {
        let _ = self.command_sender.send(BackendCommand::SetBaud(baud));
    }

    pub fn start(&self) {
        let _ = self.command_sender.send(BackendCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.command_sender.send(BackendCommand::Stop);
    }

    pub fn clear(&self) {
        let _ = self.command_sender.send(BackendCommand::Clear);
    }

    pub fn export(&self) {
        let _ = self.command_sender.send(BackendCommand::Export);
    }

    pub fn set_export_directory(&self, dir: PathBuf) {
        let _ = self
            .command_sender
            .send(BackendCommand::SetExportDirectory(dir));
    }

    pub fn refresh_ports(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshPorts);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The serial backend that runs in a separate thread
pub struct SerialBackend {
    worker: BackendWorker,
    running: Arc<AtomicBool>,
}

impl SerialBackend {
    /// Create a backend on real serial ports
    pub fn new(config: AppConfig) -> (Self, FrontendReceiver) {
        let parts = WorkerParts::system(&config);
        Self::with_parts(config, parts)
    }

    /// Create a backend from explicit parts (fake devices, fixed clock)
    pub fn with_parts(config: AppConfig, parts: WorkerParts) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(256);
        // Frames are the bulk of the traffic and are dropped when full
        let (msg_tx, msg_rx) = bounded(1024);
        let running = Arc::new(AtomicBool::new(true));

        let worker = BackendWorker::with_parts(config, parts, cmd_rx, msg_tx, running.clone());
        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (Self { worker, running }, frontend)
    }

    /// Run the backend loop until shutdown
    pub fn run(mut self) {
        self.worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
