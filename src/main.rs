mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyContourApp;
use eframe::egui;
use rusty_contour::PipelineConfig;
use rusty_contour::data::loader::load_file;
use state::AppState;

/// `rusty-contour [TABLE] [CONFIG.json]`: both optional, can also be opened
/// from the File menu.
fn initial_state() -> AppState {
    let mut state = AppState::default();
    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let table_path = args.next();

    if let Some(config_path) = args.next() {
        match PipelineConfig::from_path(&config_path) {
            Ok(config) => state.set_config(config),
            Err(e) => {
                log::error!("Failed to load config: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
    if let Some(path) = table_path {
        match load_file(&path) {
            Ok(table) => state.set_table(table),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
    state
}

fn main() -> eframe::Result {
    env_logger::init();

    let state = initial_state();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Contour – Outlier Boundaries",
        options,
        Box::new(|_cc| Ok(Box::new(RustyContourApp::with_state(state)))),
    )
}
