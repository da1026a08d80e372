use std::collections::BTreeSet;

use rusty_contour::data::model::ObservationTable;
use rusty_contour::pipeline::{self, ExampleResult, PipelineConfig};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded observation table (None until user loads a file).
    pub table: Option<ObservationTable>,

    /// Examples and models to run.
    pub config: PipelineConfig,

    /// Output of the last run, one entry per example.
    pub results: Vec<ExampleResult>,

    /// Index into `results` shown in the plot.
    pub selected_example: usize,

    /// Models whose boundaries are drawn.
    pub visible_models: BTreeSet<String>,

    /// One colour per configured model.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let config = PipelineConfig::default();
        let mut state = Self {
            table: None,
            color_map: ColorMap::new(std::iter::empty()),
            visible_models: BTreeSet::new(),
            config,
            results: Vec::new(),
            selected_example: 0,
            status_message: None,
        };
        state.reset_models();
        state
    }
}

impl AppState {
    /// Ingest a newly loaded table and run the pipeline on it.
    pub fn set_table(&mut self, table: ObservationTable) {
        self.table = Some(table);
        self.rerun();
    }

    /// Replace the configuration, then rerun if a table is loaded.
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
        self.reset_models();
        self.rerun();
    }

    fn reset_models(&mut self) {
        self.color_map = ColorMap::new(self.config.models.iter().map(|m| m.name.as_str()));
        self.visible_models = self.config.models.iter().map(|m| m.name.clone()).collect();
    }

    /// Run every example; per-model failures become the status message.
    pub fn rerun(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match pipeline::run(table, &self.config) {
            Ok(results) => {
                let failures: Vec<String> = results
                    .iter()
                    .flat_map(|r| r.failures())
                    .map(|e| e.to_string())
                    .collect();
                for f in &failures {
                    log::warn!("{f}");
                }
                self.status_message = (!failures.is_empty()).then(|| failures.join("; "));
                self.results = results;
                self.selected_example = self.selected_example.min(self.results.len().saturating_sub(1));
            }
            Err(e) => {
                log::error!("Pipeline failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.results.clear();
            }
        }
    }

    pub fn current(&self) -> Option<&ExampleResult> {
        self.results.get(self.selected_example)
    }

    /// Show or hide one model's boundary.
    pub fn toggle_model(&mut self, model: &str) {
        if !self.visible_models.remove(model) {
            self.visible_models.insert(model.to_string());
        }
    }

    pub fn show_all(&mut self) {
        self.visible_models = self.config.models.iter().map(|m| m.name.clone()).collect();
    }

    pub fn show_none(&mut self) {
        self.visible_models.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_model_visibility() {
        let mut state = AppState::default();
        assert_eq!(state.visible_models.len(), 3);
        state.toggle_model("OCSVM");
        assert!(!state.visible_models.contains("OCSVM"));
        state.toggle_model("OCSVM");
        assert!(state.visible_models.contains("OCSVM"));
        state.show_none();
        assert!(state.visible_models.is_empty());
        state.show_all();
        assert_eq!(state.visible_models.len(), 3);
    }

    #[test]
    fn test_missing_columns_reported() {
        let mut state = AppState::default();
        let table = ObservationTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0]],
        )
        .unwrap();
        state.set_table(table);
        assert!(state.results.is_empty());
        assert!(state.status_message.unwrap().contains("column"));
    }
}
