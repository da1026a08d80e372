use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – example selector and model toggles
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Examples");
    ui.separator();

    if state.results.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    let examples: Vec<String> = state.results.iter().map(|r| r.example.clone()).collect();
    let models: Vec<(String, Color32)> = state.color_map.legend_entries().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, name) in examples.iter().enumerate() {
                if ui
                    .selectable_label(state.selected_example == i, name)
                    .clicked()
                {
                    state.selected_example = i;
                }
            }

            ui.add_space(8.0);
            ui.heading("Models");
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.show_all();
                }
                if ui.small_button("None").clicked() {
                    state.show_none();
                }
            });

            for (name, color) in &models {
                let mut checked = state.visible_models.contains(name);
                let text = RichText::new(name).color(*color);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_model(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open table…").clicked() {
                open_table_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.results.is_empty(), egui::Button::new("Export boundaries…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows × {} columns",
                table.len(),
                table.width()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_table_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open observation table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match rusty_contour::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.len(),
                    table.column_names()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open pipeline config")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match rusty_contour::PipelineConfig::from_path(&path) {
            Ok(config) => state.set_config(config),
            Err(e) => {
                log::error!("Failed to load config: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export boundaries")
        .add_filter("JSON", &["json"])
        .set_file_name("boundaries.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = rusty_contour::pipeline::export_json(&state.results, &path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
