//! Toolbar panel: port and baud selectors plus the acquisition buttons.

use egui::{Color32, RichText, Ui};

use crate::frontend::state::{AppAction, UiState};
use crate::types::{BaudRate, ConnectionStatus};

/// Render the toolbar; returns the actions the user triggered
pub fn render_toolbar(ui: &mut Ui, state: &UiState) -> Vec<AppAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;

        render_selection_group(ui, state, &mut actions);
        ui.separator();
        render_acquisition_group(ui, state, &mut actions);
        ui.separator();
        render_export_group(ui, state, &mut actions);
    });

    actions
}

fn render_selection_group(ui: &mut Ui, state: &UiState, actions: &mut Vec<AppAction>) {
    let status_color = match state.status {
        ConnectionStatus::Connected => Color32::GREEN,
        ConnectionStatus::Disconnected => Color32::GRAY,
        ConnectionStatus::Error => Color32::RED,
    };
    ui.colored_label(status_color, "●");

    ui.label("COM Port:");
    let port_text = state
        .selected_port
        .clone()
        .unwrap_or_else(|| "No ports".to_string());
    egui::ComboBox::from_id_salt("port_select")
        .selected_text(port_text)
        .width(160.0)
        .show_ui(ui, |ui| {
            for port in &state.ports {
                let selected = state.selected_port.as_deref() == Some(port.as_str());
                if ui.selectable_label(selected, port).clicked() && !selected {
                    actions.push(AppAction::SelectPort(port.clone()));
                }
            }
        });

    ui.label("Baud Rate:");
    egui::ComboBox::from_id_salt("baud_select")
        .selected_text(state.baud.to_string())
        .show_ui(ui, |ui| {
            for baud in BaudRate::ALL {
                if ui
                    .selectable_label(state.baud == baud, baud.to_string())
                    .clicked()
                    && state.baud != baud
                {
                    actions.push(AppAction::SetBaud(baud));
                }
            }
        });
}

fn render_acquisition_group(ui: &mut Ui, state: &UiState, actions: &mut Vec<AppAction>) {
    let start = egui::Button::new(RichText::new("Start").color(Color32::WHITE))
        .fill(Color32::from_rgb(50, 120, 50));
    if ui
        .add_enabled(!state.running, start)
        .on_hover_text("Clear the plot and start reading")
        .clicked()
    {
        actions.push(AppAction::Start);
    }

    let stop = egui::Button::new(RichText::new("Stop").color(Color32::WHITE))
        .fill(Color32::from_rgb(150, 50, 50));
    if ui.add_enabled(state.running, stop).clicked() {
        actions.push(AppAction::Stop);
    }

    if ui.button("Clear").clicked() {
        actions.push(AppAction::Clear);
    }
}

fn render_export_group(ui: &mut Ui, state: &UiState, actions: &mut Vec<AppAction>) {
    if ui
        .button("Save")
        .on_hover_text(format!("Save CSV to {}", state.export_directory.display()))
        .clicked()
    {
        actions.push(AppAction::Export);
    }

    if ui
        .button("📁")
        .on_hover_text("Choose export folder")
        .clicked()
    {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&state.export_directory)
            .pick_folder()
        {
            actions.push(AppAction::SetExportDirectory(dir));
        }
    }
}
