//! Frontend module for egui UI
//!
//! This module provides the main UI components using eframe/egui.
//! It receives frames from the backend through crossbeam channels and
//! renders them; every user action is forwarded as a [`BackendCommand`].
//!
//! # Main Types
//!
//! - [`SerialVisApp`] - Main application state implementing [`eframe::App`]
//! - [`PlotView`] - Plot configuration and rendering
//! - [`UiState`] - Last reported backend state
//!
//! # Submodules
//!
//! - `toolbar` - Port/baud selectors and acquisition buttons
//! - `status_bar` - Connection status and reader counters
//! - `plot` - Plot rendering with egui_plot
//! - `state` - UI state and actions

mod plot;
pub mod state;
mod status_bar;
mod toolbar;

pub use plot::{PlotView, INACTIVE_TEXT};
pub use state::{AppAction, Dialog, UiState};

use std::time::Duration;

use crate::backend::{BackendCommand, FrontendReceiver};
use crate::config::AppConfig;

/// Repaint interval while idle, so port list changes still show up
const IDLE_REPAINT: Duration = Duration::from_millis(250);

/// Main application state for the serial visualizer
pub struct SerialVisApp {
    frontend: FrontendReceiver,
    state: UiState,
    plot: PlotView,
    render_interval: Duration,
}

impl SerialVisApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, frontend: FrontendReceiver, config: &AppConfig) -> Self {
        Self {
            frontend,
            state: UiState::new(
                config.acquisition.default_baud,
                config.export.directory.clone(),
            ),
            plot: PlotView::from_config(&config.plot),
            render_interval: config.acquisition.render_interval(),
        }
    }

    /// Read-only view of the UI state
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Fold all pending backend messages into the state
    fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.state.apply(msg);
        }
        had_messages
    }

    fn handle_action(&mut self, action: AppAction) {
        self.state.apply_action(&action);

        let command = match action {
            AppAction::SelectPort(port) => BackendCommand::SelectPort(port),
            AppAction::SetBaud(baud) => BackendCommand::SetBaud(baud),
            AppAction::Start => BackendCommand::Start,
            AppAction::Stop => BackendCommand::Stop,
            AppAction::Clear => BackendCommand::Clear,
            AppAction::Export => BackendCommand::Export,
            AppAction::SetExportDirectory(dir) => BackendCommand::SetExportDirectory(dir),
            AppAction::DismissDialog => return,
        };

        if !self.frontend.send_command(command) {
            tracing::warn!("Backend is gone; command dropped");
            self.state.backend_alive = false;
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.state.dialog() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(dialog.title())
            .collapsible(false)
            .resizable(false)
            .default_width(320.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(dialog.message());
                ui.add_space(8.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.handle_action(AppAction::DismissDialog);
        }
    }
}

impl eframe::App for SerialVisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.process_backend_messages();

        if had_messages {
            ctx.request_repaint();
        } else if self.state.running {
            ctx.request_repaint_after(self.render_interval);
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }

        let actions = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::render_toolbar(ui, &self.state))
            .inner;
        for action in actions {
            self.handle_action(action);
        }

        egui::TopBottomPanel::bottom("status_bar")
            .show(ctx, |ui| status_bar::render_status_bar(ui, &self.state));

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.state.backend_alive {
                ui.colored_label(egui::Color32::RED, "Backend stopped");
            }
            self.plot.render(ui, &self.state.frame);
        });

        self.render_dialog(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::info!("UI closing; stopping backend");
        self.frontend.shutdown();
    }
}
