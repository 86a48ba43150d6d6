//! Plot rendering module using egui_plot
//!
//! Draws a [`PlotFrame`] exactly as the render scheduler produced it: the
//! frame carries the points, both axis ranges and the tick label format, so
//! this module only maps it onto egui_plot.
//!
//! # Main Types
//!
//! - [`PlotView`] - Line styling and rendering entry point

use egui::{Align2, Color32, FontId, Ui};
use egui_plot::{GridMark, Line, Plot, PlotBounds, PlotPoints};

use crate::config::PlotConfig;
use crate::session::{LiveFrame, PlotFrame};

/// Placeholder text shown while no data is plotted
pub const INACTIVE_TEXT: &str = "Data Acquisition Inactive";

/// Smallest visible time span in seconds
const MIN_X_SPAN: f64 = 1.0;

/// Plot view configuration
#[derive(Debug, Clone)]
pub struct PlotView {
    /// Line width in points
    pub line_width: f32,
    /// Line color
    pub color: Color32,
    /// Whether to show grid lines
    pub show_grid: bool,
}

impl Default for PlotView {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            color: Color32::from_rgb(100, 180, 255),
            show_grid: true,
        }
    }
}

impl PlotView {
    pub fn from_config(config: &PlotConfig) -> Self {
        Self {
            line_width: config.line_width,
            ..Default::default()
        }
    }

    /// Render a frame into the available space
    pub fn render(&self, ui: &mut Ui, frame: &PlotFrame) {
        match frame {
            PlotFrame::Inactive => render_placeholder(ui),
            PlotFrame::Live(live) => self.render_live(ui, live),
        }
    }

    fn render_live(&self, ui: &mut Ui, frame: &LiveFrame) {
        let (x_min, x_max) = widen(frame.x_bounds, MIN_X_SPAN);
        let (y_min, y_max) = frame.y_bounds;

        let plot = Plot::new("serial_plot")
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_grid(self.show_grid)
            .x_axis_label("Time")
            .y_axis_label("Value")
            .x_grid_spacer(|input| time_grid_marks(input.bounds))
            .x_axis_formatter(|mark, _range| frame.format_tick(mark.value));

        plot.show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
            let points = PlotPoints::from(frame.points.clone());
            plot_ui.line(
                Line::new("Value", points)
                    .color(self.color)
                    .width(self.line_width),
            );
        });
    }
}

fn render_placeholder(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        INACTIVE_TEXT,
        FontId::proportional(20.0),
        Color32::GRAY,
    );
    ui.allocate_rect(rect, egui::Sense::hover());
}

/// Expand a range to at least `min_span`, keeping its upper end
fn widen((lo, hi): (f64, f64), min_span: f64) -> (f64, f64) {
    if hi - lo < min_span {
        (hi - min_span, hi)
    } else {
        (lo, hi)
    }
}

/// Grid marks on whole seconds, spaced to keep labels readable
fn time_grid_marks(bounds: (f64, f64)) -> Vec<GridMark> {
    let (min, max) = bounds;
    let range = max - min;

    let step = if range <= 10.0 {
        1.0
    } else if range <= 30.0 {
        5.0
    } else if range <= 60.0 {
        10.0
    } else if range <= 180.0 {
        20.0
    } else {
        60.0
    };

    let mut marks = Vec::new();
    let mut current = (min / step).ceil() * step;
    while current <= max {
        marks.push(GridMark {
            value: current,
            step_size: step,
        });
        current += step;
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_keeps_upper_bound() {
        assert_eq!(widen((100.0, 100.0), 1.0), (99.0, 100.0));
        assert_eq!(widen((10.0, 130.0), 1.0), (10.0, 130.0));
    }

    #[test]
    fn test_grid_marks_within_bounds() {
        let marks = time_grid_marks((1_000.5, 1_120.5));
        assert!(!marks.is_empty());
        assert!(marks.iter().all(|m| (1_000.5..=1_120.5).contains(&m.value)));
        assert!(marks.iter().all(|m| m.step_size == 20.0));
    }
}
