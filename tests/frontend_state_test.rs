//! Tests for frontend state handling
//!
//! These tests validate how [`UiState`] folds backend messages and local
//! actions without opening a window.

mod common;

use std::path::PathBuf;

use common::builders::at;
use serialvis::backend::BackendMessage;
use serialvis::frontend::{AppAction, Dialog, UiState};
use serialvis::session::{LiveFrame, PlotFrame};
use serialvis::types::{BaudRate, ConnectionStatus, LinkStats, Notice, NoticeKind, Sample};

fn state() -> UiState {
    UiState::new(BaudRate::B9600, PathBuf::from("."))
}

fn live_frame(value: f64) -> PlotFrame {
    let sample = Sample::new(at(0), value);
    PlotFrame::Live(LiveFrame {
        points: vec![[sample.epoch_secs(), value]],
        x_bounds: (sample.epoch_secs() - 1.0, sample.epoch_secs()),
        y_bounds: (value - 1.0, value + 1.0),
        time_zone: chrono_tz::UTC,
        time_format: "%H:%M:%S".to_string(),
        latest: Some(sample),
        stats: None,
    })
}

#[test]
fn test_initial_state() {
    let state = state();
    assert!(state.ports.is_empty());
    assert_eq!(state.selected_port, None);
    assert_eq!(state.status, ConnectionStatus::Disconnected);
    assert_eq!(state.frame, PlotFrame::Inactive);
    assert!(state.dialog().is_none());
    assert!(state.backend_alive);
}

#[test]
fn test_port_list_message() {
    let mut state = state();
    state.apply(BackendMessage::PortList {
        ports: vec!["COM1".to_string(), "COM3".to_string()],
        selected: Some("COM1".to_string()),
    });
    assert_eq!(state.ports.len(), 2);
    assert_eq!(state.selected_port.as_deref(), Some("COM1"));

    state.apply(BackendMessage::PortList {
        ports: Vec::new(),
        selected: None,
    });
    assert!(state.ports.is_empty());
    assert_eq!(state.selected_port, None);
}

#[test]
fn test_frame_message_updates_plot_and_stats() {
    let mut state = state();
    let stats = LinkStats {
        samples_accepted: 5,
        parse_errors: 1,
        ..Default::default()
    };
    state.apply(BackendMessage::Frame {
        frame: live_frame(3.5),
        stats,
    });
    assert_eq!(state.stats.samples_accepted, 5);
    assert!(matches!(state.frame, PlotFrame::Live(_)));

    state.apply_action(&AppAction::Clear);
    assert_eq!(state.frame, PlotFrame::Inactive);
}

#[test]
fn test_running_and_status_messages() {
    let mut state = state();
    state.apply(BackendMessage::Running(true));
    state.apply(BackendMessage::Status(ConnectionStatus::Connected));
    assert!(state.running);
    assert_eq!(state.status, ConnectionStatus::Connected);

    state.apply(BackendMessage::Shutdown);
    assert!(!state.running);
    assert!(!state.backend_alive);
}

#[test]
fn test_dialogs_queue_in_arrival_order() {
    let mut state = state();
    let notice = Notice::new(NoticeKind::OpenFailed, "Error opening port COM1: busy");
    state.apply(BackendMessage::Notice(notice.clone()));
    state.apply(BackendMessage::Exported(PathBuf::from("2024-03-01.csv")));

    let dialog = state.dialog().expect("notice dialog");
    assert_eq!(dialog, &Dialog::Notice(notice));
    assert_eq!(dialog.message(), "Error opening port COM1: busy");

    // The export confirmation waits behind the notice
    state.apply_action(&AppAction::DismissDialog);
    let dialog = state.dialog().expect("saved dialog");
    assert_eq!(dialog.title(), "Data Saved");
    assert_eq!(dialog.message(), "Data saved as: 2024-03-01.csv");

    state.apply_action(&AppAction::DismissDialog);
    assert!(state.dialog().is_none());
}

#[test]
fn test_local_actions() {
    let mut state = state();
    state.apply_action(&AppAction::SelectPort("COM4".to_string()));
    state.apply_action(&AppAction::SetBaud(BaudRate::B57600));
    state.apply_action(&AppAction::SetExportDirectory(PathBuf::from("/tmp/exports")));

    assert_eq!(state.selected_port.as_deref(), Some("COM4"));
    assert_eq!(state.baud, BaudRate::B57600);
    assert_eq!(state.export_directory, PathBuf::from("/tmp/exports"));
}
