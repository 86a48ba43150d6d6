//! Status bar panel: connection state and reader counters.

use egui::{Color32, RichText, Ui};

use crate::frontend::state::UiState;
use crate::session::PlotFrame;
use crate::types::ConnectionStatus;

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, state: &UiState) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let status_color = match state.status {
            ConnectionStatus::Connected => Color32::GREEN,
            ConnectionStatus::Disconnected => Color32::GRAY,
            ConnectionStatus::Error => Color32::RED,
        };
        ui.colored_label(status_color, "●");
        let status_text = match &state.selected_port {
            Some(port) => format!("{}: {} @ {}", state.status, port, state.baud),
            None => state.status.to_string(),
        };
        ui.label(RichText::new(status_text).small());

        ui.separator();

        let stats = &state.stats;
        ui.label(RichText::new(format!("Samples: {}", stats.samples_accepted)).small());

        ui.separator();

        let rejected = stats.parse_errors + stats.out_of_range;
        let error_color = if rejected > 0 || stats.io_errors > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            error_color,
            RichText::new(format!(
                "Rejected: {}  I/O errors: {}",
                rejected, stats.io_errors
            ))
            .small(),
        );

        ui.separator();

        ui.label(RichText::new(format!("Accepted: {:.1}%", stats.acceptance_rate())).small());

        ui.separator();

        let kb = stats.bytes_read as f64 / 1024.0;
        ui.label(RichText::new(format!("Data: {:.2} KB", kb)).small());

        if stats.reconnects > 0 {
            ui.separator();
            ui.label(RichText::new(format!("Reconnects: {}", stats.reconnects)).small());
        }

        if let PlotFrame::Live(frame) = &state.frame {
            if let Some(summary) = frame.stats {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!(
                            "Mean: {:.3}  Std Dev: {:.3}",
                            summary.mean, summary.std_dev
                        ))
                        .small(),
                    );
                });
            }
        }
    });
}
