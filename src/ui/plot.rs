use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Boundary plot (central panel)
// ---------------------------------------------------------------------------

/// Scatter of the point cloud with every visible model's boundary on top.
pub fn boundary_plot(ui: &mut Ui, state: &AppState) {
    let Some(result) = state.current() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a table to fit the models  (File → Open table…)");
        });
        return;
    };

    let [x_label, y_label] = &result.cloud.labels;
    let grid = result.grid;

    Plot::new("boundary_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label.as_str())
        .y_axis_label(y_label.as_str())
        .include_x(grid.x_min)
        .include_x(grid.x_max)
        .include_y(grid.y_min)
        .include_y(grid.y_max)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = result.cloud.points.iter().copied().collect();
            plot_ui.points(
                Points::new(points)
                    .name("observations")
                    .color(Color32::BLACK)
                    .radius(2.5),
            );

            for boundary in &result.boundaries {
                if !state.visible_models.contains(&boundary.model) {
                    continue;
                }
                let Ok(set) = &boundary.outcome else {
                    continue;
                };
                let color = state.color_map.color_for(&boundary.model);
                for polyline in &set.polylines {
                    let mut coords = polyline.points.clone();
                    if polyline.closed {
                        if let Some(&first) = coords.first() {
                            coords.push(first);
                        }
                    }
                    // Same name on every segment keeps one legend entry per model.
                    plot_ui.line(
                        Line::new(PlotPoints::from(coords))
                            .name(&boundary.model)
                            .color(color)
                            .width(2.0),
                    );
                }
            }
        });
}
