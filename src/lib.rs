//! # SerialVis: Serial Data Visualizer
//!
//! Reads newline-terminated numeric values from a serial port, plots them on a
//! rolling time window and exports the session to CSV. The architecture keeps
//! all serial I/O on a backend thread and lets the UI render frames it receives
//! over channels.
//!
//! ## Architecture
//!
//! - **Backend**: Port scanning, serial polling, frame rendering and export in a separate thread
//! - **Session**: Acquisition state, pending samples and the rolling window
//! - **Frontend**: Renders the UI using eframe/egui with egui_plot for graphs
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform config directory
//! under `dev.serialvis`:
//!
//! - **Linux**: `~/.config/dev.serialvis/`
//! - **macOS**: `~/Library/Application Support/dev.serialvis/`
//! - **Windows**: `%APPDATA%\dev.serialvis\`
//!
//! ## Example
//!
//! ```ignore
//! use serialvis::{backend::SerialBackend, config::AppConfig, frontend::SerialVisApp};
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let (backend, frontend_receiver) = SerialBackend::new(config.clone());
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "SerialVis",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(SerialVisApp::new(cc, frontend_receiver, &config)))),
//!     )
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod frontend;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use app::SerialVisApp;
pub use backend::{BackendCommand, BackendMessage, SerialBackend};
pub use config::AppConfig;
pub use error::{Result, SerialVisError};
pub use session::AcquisitionSession;
pub use types::{BaudRate, ConnectionStatus, LinkStats, Notice, Sample};
