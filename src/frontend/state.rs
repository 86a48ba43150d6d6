//! Frontend state and action types
//!
//! [`UiState`] mirrors what the backend has reported. Widgets read it and
//! return [`AppAction`]s instead of talking to the backend directly, so the
//! message handling is testable without a window.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::backend::BackendMessage;
use crate::session::PlotFrame;
use crate::types::{BaudRate, ConnectionStatus, LinkStats, Notice};

/// Actions that widgets can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Select a port from the list
    SelectPort(String),
    /// Change the baud rate
    SetBaud(BaudRate),
    /// Start acquisition
    Start,
    /// Stop acquisition
    Stop,
    /// Clear the plot
    Clear,
    /// Save the CSV export
    Export,
    /// Use a new export directory
    SetExportDirectory(PathBuf),
    /// Close the open dialog and show the next queued one
    DismissDialog,
}

/// Dialogs waiting behind the open one
const MAX_QUEUED_DIALOGS: usize = 32;

/// Modal dialog shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Error or warning the user must acknowledge
    Notice(Notice),
    /// Export succeeded
    Saved(PathBuf),
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self {
            Dialog::Notice(notice) => notice.title(),
            Dialog::Saved(_) => "Data Saved",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Dialog::Notice(notice) => notice.message.clone(),
            Dialog::Saved(path) => format!("Data saved as: {}", path.display()),
        }
    }
}

/// Everything the UI shows, as last reported by the backend
#[derive(Debug, Clone)]
pub struct UiState {
    pub ports: Vec<String>,
    pub selected_port: Option<String>,
    pub baud: BaudRate,
    pub running: bool,
    pub status: ConnectionStatus,
    pub stats: LinkStats,
    pub frame: PlotFrame,
    pub export_directory: PathBuf,
    /// Front entry is the open dialog
    pub dialogs: VecDeque<Dialog>,
    pub backend_alive: bool,
}

impl UiState {
    pub fn new(baud: BaudRate, export_directory: PathBuf) -> Self {
        Self {
            ports: Vec::new(),
            selected_port: None,
            baud,
            running: false,
            status: ConnectionStatus::Disconnected,
            stats: LinkStats::default(),
            frame: PlotFrame::Inactive,
            export_directory,
            dialogs: VecDeque::new(),
            backend_alive: true,
        }
    }

    /// Fold a backend message into the state
    pub fn apply(&mut self, msg: BackendMessage) {
        match msg {
            BackendMessage::PortList { ports, selected } => {
                self.ports = ports;
                self.selected_port = selected;
            }
            BackendMessage::Status(status) => self.status = status,
            BackendMessage::Running(running) => self.running = running,
            BackendMessage::Frame { frame, stats } => {
                self.frame = frame;
                self.stats = stats;
            }
            BackendMessage::Notice(notice) => self.show(Dialog::Notice(notice)),
            BackendMessage::Exported(path) => self.show(Dialog::Saved(path)),
            BackendMessage::Shutdown => {
                self.running = false;
                self.backend_alive = false;
            }
        }
    }

    /// Apply the local part of an action (optimistic UI update)
    pub fn apply_action(&mut self, action: &AppAction) {
        match action {
            AppAction::SelectPort(port) => self.selected_port = Some(port.clone()),
            AppAction::SetBaud(baud) => self.baud = *baud,
            AppAction::SetExportDirectory(dir) => self.export_directory = dir.clone(),
            AppAction::Clear => self.frame = PlotFrame::Inactive,
            AppAction::DismissDialog => {
                self.dialogs.pop_front();
            }
            AppAction::Start | AppAction::Stop | AppAction::Export => {}
        }
    }

    /// Dialog currently open, if any
    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    /// Show a dialog once the ones before it are dismissed
    fn show(&mut self, dialog: Dialog) {
        if self.dialogs.len() >= MAX_QUEUED_DIALOGS {
            tracing::warn!("Too many unacknowledged dialogs; dropping {:?}", dialog);
            return;
        }
        self.dialogs.push_back(dialog);
    }
}
