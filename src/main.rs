//! Serial Data Visualizer - Main Entry Point
//!
//! Plots values streamed over a serial port and saves them as CSV.

use std::sync::atomic::Ordering;

use anyhow::Context;
use serialvis::{
    backend::SerialBackend,
    config::{AppConfig, LOG_FILE_NAME},
    frontend::SerialVisApp,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the stderr layer and, if enabled, the file layer.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    let (file_layer, guard) = if config.logging.file_enabled {
        let appender = tracing_appender::rolling::never(&config.logging.directory, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default();
    let _log_guard = init_logging(&config);

    tracing::info!("Starting Serial Data Visualizer");

    let (backend, frontend_receiver) = SerialBackend::new(config.clone());
    let stop_handle = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("serial-backend".into())
        .spawn(move || backend.run())
        .context("Failed to spawn backend thread")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 640.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Serial Data Visualizer"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "SerialVis",
        native_options,
        Box::new(move |cc| Ok(Box::new(SerialVisApp::new(cc, frontend_receiver, &config)))),
    );

    tracing::info!("Shutting down...");
    stop_handle.store(false, Ordering::SeqCst);
    if backend_handle.join().is_err() {
        tracing::error!("Backend thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("UI error: {e}"))
}
