//! Integration tests for backend lifecycle
//!
//! These tests run the backend on its own thread against a scripted device:
//! - Port discovery and selection
//! - Acquisition start/stop and frames
//! - Export and failure notices
//! - Shutdown

mod common;

use std::thread;

use common::mock_helpers::{mock_parts, wait_for, FixedPorts};
use common::test_timeout;
use serialvis::backend::{BackendMessage, MockDevice, SerialBackend};
use serialvis::config::AppConfig;
use serialvis::session::PlotFrame;
use serialvis::types::{BaudRate, ConnectionStatus, NoticeKind};
use tempfile::tempdir;

fn spawn(
    config: AppConfig,
    device: &MockDevice,
    ports: &FixedPorts,
) -> (
    thread::JoinHandle<()>,
    serialvis::backend::FrontendReceiver,
) {
    let (backend, frontend) = SerialBackend::with_parts(config, mock_parts(device, ports));
    let handle = thread::spawn(move || backend.run());
    (handle, frontend)
}

#[test]
fn test_backend_creation_and_shutdown() {
    let device = MockDevice::new();
    let ports = FixedPorts::new(&["COM1"]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    frontend.shutdown();
    assert!(handle.join().is_ok(), "Backend thread should exit cleanly");

    let msgs = frontend.drain();
    assert!(matches!(msgs.last(), Some(BackendMessage::Shutdown)));
    assert_eq!(device.open_count(), 0);
}

#[test]
fn test_port_list_follows_source() {
    let device = MockDevice::new();
    let ports = FixedPorts::new(&["COM3", "COM1"]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    let first = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::PortList { ports, selected } => Some((ports.clone(), selected.clone())),
        _ => None,
    });
    let (listed, selected) = first.expect("initial port list");
    assert_eq!(listed.len(), 2);
    assert!(selected.is_some());

    ports.set(&["COM7"]);
    frontend.refresh_ports();
    let selected = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::PortList { selected, .. } => selected.clone(),
        _ => None,
    });
    assert_eq!(selected.as_deref(), Some("COM7"));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_acquisition_streams_frames() {
    let device = MockDevice::new();
    let ports = FixedPorts::new(&["COM1"]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    frontend.set_baud(BaudRate::B115200);
    frontend.start();
    let running = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Running(running) => Some(*running),
        _ => None,
    });
    assert_eq!(running, Some(true));

    device.feed_bytes(b"1.0\n2.0\n3.0\n");
    let stats = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Frame {
            frame: PlotFrame::Live(live),
            stats,
        } if live.latest.map(|s| s.value) == Some(3.0) => Some(*stats),
        _ => None,
    })
    .expect("a live frame with the newest value");
    assert_eq!(stats.samples_accepted, 3);
    assert_eq!(device.last_open(), Some(("COM1".to_string(), BaudRate::B115200)));

    frontend.stop();
    let stopped = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Running(false) => Some(()),
        _ => None,
    });
    assert!(stopped.is_some());

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_open_failure_raises_single_notice() {
    let device = MockDevice::new();
    device.fail_opens(usize::MAX);
    let ports = FixedPorts::new(&["COM1"]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    frontend.start();
    let notice = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Notice(notice) => Some(notice.clone()),
        _ => None,
    })
    .expect("open failure notice");
    assert_eq!(notice.kind, NoticeKind::OpenFailed);
    assert!(notice.message.contains("COM1"));

    // Polling keeps failing; nothing new is reported
    thread::sleep(std::time::Duration::from_millis(100));
    frontend.shutdown();
    handle.join().unwrap();

    let msgs = frontend.drain();
    assert!(!msgs.iter().any(|m| matches!(m, BackendMessage::Notice(_))));
    assert!(msgs.iter().all(|m| !matches!(
        m,
        BackendMessage::Status(ConnectionStatus::Connected)
    )));
}

#[test]
fn test_export_reports_written_file() {
    let dir = tempdir().unwrap();
    let device = MockDevice::new();
    let ports = FixedPorts::new(&["COM1"]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    frontend.start();
    device.feed_line("42.5");
    wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Frame {
            frame: PlotFrame::Live(_),
            ..
        } => Some(()),
        _ => None,
    })
    .expect("a live frame before exporting");

    frontend.set_export_directory(dir.path().to_path_buf());
    frontend.export();
    let path = wait_for(&frontend, test_timeout(), |msg| match msg {
        BackendMessage::Exported(path) => Some(path.clone()),
        _ => None,
    })
    .expect("export confirmation");

    assert!(path.starts_with(dir.path()));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(",42.5"));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_dropping_frontend_stops_backend() {
    let device = MockDevice::new();
    let ports = FixedPorts::new(&[]);
    let (handle, frontend) = spawn(AppConfig::default(), &device, &ports);

    drop(frontend);
    assert!(handle.join().is_ok());
}
