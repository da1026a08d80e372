use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: model name → Color32
// ---------------------------------------------------------------------------

/// Assigns each model a colour, keeping the configured model order so the
/// legend lines up with the plotted boundaries.
#[derive(Debug, Clone)]
pub struct ColorMap {
    entries: Vec<(String, Color32)>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(models: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = models.into_iter().collect();
        let palette = generate_palette(names.len());
        ColorMap {
            entries: names
                .into_iter()
                .map(str::to_string)
                .zip(palette)
                .collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a model.
    pub fn color_for(&self, model: &str) -> Color32 {
        self.entries
            .iter()
            .find(|(name, _)| name == model)
            .map(|&(_, c)| c)
            .unwrap_or(self.default_color)
    }

    /// Legend entries in model order.
    pub fn legend_entries(&self) -> &[(String, Color32)] {
        &self.entries
    }
}
