//! Backend Worker Thread Implementation
//!
//! This module contains the event loop that owns the acquisition session.
//! It communicates with the UI thread through crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: port/baud selection, start, stop, clear, export
//! - **Serial polling**: [`SerialReader::poll`] every poll interval (10ms)
//! - **Rendering**: [`RenderScheduler::tick`] every render interval (100ms)
//! - **Port scanning**: enumerate ports every scan interval (1s)
//!
//! # Scheduling
//!
//! Each periodic job is a [`Periodic`] task with its own deadline. The loop
//! runs every due task, then waits for a command until the earliest deadline.
//! All session access happens on this thread, so the session needs no locks.
//!
//! Nothing here blocks on the UI queue. Frames are dropped when it is full;
//! control messages wait in a small outbox and go out on the next pass.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use super::link::LinkOpener;
use super::ports::{PortList, PortSource, SystemPorts};
use super::reader::SerialReader;
use super::serial::SystemOpener;
use super::{BackendCommand, BackendMessage};
use crate::config::AppConfig;
use crate::export::Exporter;
use crate::session::{AcquisitionSession, Clock, RenderScheduler, SystemClock};
use crate::types::{BaudRate, ConnectionStatus, LinkStats, Notice, NoticeKind};

/// Longest the loop waits without checking its tasks
pub const MAX_IDLE_WAIT: Duration = Duration::from_millis(50);

/// Control messages held while the UI queue is full
const OUTBOX_LIMIT: usize = 64;

/// A repeating job with a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    interval: Duration,
    next_due: Instant,
}

impl Periodic {
    /// Task first due at `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now,
        }
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// If due at `now`, schedule the next run and return true.
    ///
    /// Missed runs are skipped rather than replayed in a burst.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }

    /// Make the task due immediately
    pub fn reset(&mut self, now: Instant) {
        self.next_due = now;
    }
}

/// Swappable parts of the worker
pub struct WorkerParts {
    pub opener: Box<dyn LinkOpener>,
    pub ports: Box<dyn PortSource>,
    pub clock: Box<dyn Clock>,
}

impl WorkerParts {
    /// Real serial ports and the system clock
    pub fn system(config: &AppConfig) -> Self {
        let acq = &config.acquisition;
        Self {
            opener: Box::new(SystemOpener::new(acq.open_timeout(), acq.mock_port)),
            ports: Box::new(SystemPorts::new(acq.mock_port)),
            clock: Box::new(SystemClock::new(acq.time_zone)),
        }
    }
}

/// The backend worker that owns the session and runs the periodic tasks
pub struct BackendWorker {
    /// Command receiver from the UI
    command_rx: Receiver<BackendCommand>,
    /// Message sender to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    session: AcquisitionSession,
    reader: SerialReader,
    scheduler: RenderScheduler,
    exporter: Exporter,
    ports: Box<dyn PortSource>,
    port_list: PortList,
    clock: Box<dyn Clock>,
    poll_task: Periodic,
    render_task: Periodic,
    scan_task: Periodic,
    /// Last status reported to the UI
    status: ConnectionStatus,
    /// Frames the UI queue had no room for
    dropped_frames: u64,
    /// Control messages waiting for room in the UI queue
    outbox: VecDeque<BackendMessage>,
}

impl BackendWorker {
    /// Create a worker talking to real serial ports
    pub fn new(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let parts = WorkerParts::system(&config);
        Self::with_parts(config, parts, command_rx, message_tx, running)
    }

    /// Create a worker from explicit parts
    pub fn with_parts(
        config: AppConfig,
        parts: WorkerParts,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let acq = &config.acquisition;
        let now = Instant::now();

        let mut session = AcquisitionSession::new(acq.horizon(), config.export.scope);
        session.set_baud(acq.default_baud);

        Self {
            command_rx,
            message_tx,
            running,
            session,
            reader: SerialReader::new(parts.opener, acq.value_range),
            scheduler: RenderScheduler::new(
                acq.pending_policy,
                config.plot.y_axis,
                config.plot.time_format.clone(),
            ),
            exporter: Exporter::from_config(&config.export),
            ports: parts.ports,
            port_list: PortList::new(),
            clock: parts.clock,
            poll_task: Periodic::new(acq.poll_interval(), now),
            render_task: Periodic::new(acq.render_interval(), now),
            scan_task: Periodic::new(acq.port_scan_interval(), now),
            status: ConnectionStatus::Disconnected,
            dropped_frames: 0,
            outbox: VecDeque::new(),
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Backend worker started");

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.run_due(Instant::now());

            let wait = self
                .next_deadline()
                .saturating_duration_since(Instant::now())
                .min(MAX_IDLE_WAIT);
            match self.command_rx.recv_timeout(wait) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                }
            }
        }

        self.reader.close();
        let _ = self.message_tx.try_send(BackendMessage::Shutdown);
        tracing::info!("Backend worker stopped");
    }

    /// Run every task due at `now`
    pub fn run_due(&mut self, now: Instant) {
        self.flush_outbox();
        if self.scan_task.take_due(now) {
            self.scan_ports();
        }
        if self.poll_task.take_due(now) {
            self.poll_serial();
        }
        if self.render_task.take_due(now) {
            self.render();
        }
    }

    /// Send a control message without blocking the loop
    fn post(&mut self, msg: BackendMessage) {
        self.flush_outbox();
        if !self.outbox.is_empty() {
            self.hold(msg);
            return;
        }
        match self.message_tx.try_send(msg) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(msg)) => self.hold(msg),
        }
    }

    fn hold(&mut self, msg: BackendMessage) {
        // Only the newest status, run state and port list matter
        if matches!(
            msg,
            BackendMessage::Status(_) | BackendMessage::Running(_) | BackendMessage::PortList { .. }
        ) {
            let kind = std::mem::discriminant(&msg);
            self.outbox.retain(|held| std::mem::discriminant(held) != kind);
        }
        if self.outbox.len() >= OUTBOX_LIMIT {
            tracing::warn!("UI queue stalled; dropping oldest control message");
            self.outbox.pop_front();
        }
        self.outbox.push_back(msg);
    }

    fn flush_outbox(&mut self) {
        while let Some(msg) = self.outbox.pop_front() {
            match self.message_tx.try_send(msg) {
                Ok(()) => {}
                Err(TrySendError::Full(msg)) => {
                    self.outbox.push_front(msg);
                    break;
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.outbox.clear();
                    break;
                }
            }
        }
    }

    fn next_deadline(&self) -> Instant {
        self.scan_task
            .next_due()
            .min(self.poll_task.next_due())
            .min(self.render_task.next_due())
    }

    /// Process pending commands from the UI
    pub fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::SelectPort(port) => self.select_port(port),
            BackendCommand::SetBaud(baud) => self.set_baud(baud),
            BackendCommand::Start => self.start(),
            BackendCommand::Stop => self.stop(),
            BackendCommand::Clear => self.session.clear(),
            BackendCommand::Export => self.export(),
            BackendCommand::SetExportDirectory(dir) => self.exporter.set_directory(dir),
            BackendCommand::RefreshPorts => self.scan_task.reset(Instant::now()),
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn select_port(&mut self, port: String) {
        if self.port_list.select(&port) {
            self.session.set_port(Some(port));
        }
    }

    fn set_baud(&mut self, baud: BaudRate) {
        self.session.set_baud(baud);
    }

    fn start(&mut self) {
        self.session.start();
        let now = Instant::now();
        self.poll_task.reset(now);
        self.render_task.reset(now);
        self.post(BackendMessage::Running(true));
    }

    fn stop(&mut self) {
        self.session.stop();
        self.post(BackendMessage::Running(false));
    }

    fn export(&mut self) {
        let today = self.clock.local_date();
        let msg = match self.exporter.export(&self.session, today) {
            Ok(path) => BackendMessage::Exported(path),
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                BackendMessage::Notice(Notice::new(NoticeKind::ExportFailed, e.to_string()))
            }
        };
        self.post(msg);
    }

    fn scan_ports(&mut self) {
        let ports = self.ports.list_ports();
        if self.port_list.refresh(ports) {
            tracing::info!("COM ports updated");
            let selected = self.port_list.selected().map(str::to_string);
            self.session.set_port(selected.clone());
            self.post(BackendMessage::PortList {
                ports: self.port_list.ports().to_vec(),
                selected,
            });
        }
    }

    fn poll_serial(&mut self) {
        if let Some(notice) = self.reader.poll(&mut self.session) {
            self.post(BackendMessage::Notice(notice));
        }
        let status = self.reader.status();
        if status != self.status {
            self.status = status;
            self.post(BackendMessage::Status(status));
        }
    }

    fn render(&mut self) {
        let now = self.clock.now();
        if let Some(frame) = self.scheduler.tick(&mut self.session, now) {
            let stats = self.link_stats();
            // Frames are replaceable; never block the loop on a slow UI
            if self.message_tx.try_send(BackendMessage::Frame { frame, stats }).is_err() {
                self.dropped_frames += 1;
            }
        }
    }

    /// Reader counters plus dropped frames
    pub fn link_stats(&self) -> LinkStats {
        LinkStats {
            dropped_frames: self.dropped_frames,
            ..self.reader.stats()
        }
    }

    pub fn session(&self) -> &AcquisitionSession {
        &self.session
    }
}
