use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::data::correlation::ScatterPoint;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// as `#rrggbb` strings.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Group colours for scatter extracts
// ---------------------------------------------------------------------------

/// Maps the group labels of a scatter extract to distinct colours.
/// Labels are sorted, so a label keeps its colour while the set is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupPalette {
    mapping: BTreeMap<String, String>,
}

impl GroupPalette {
    pub fn for_points(points: &[ScatterPoint]) -> Self {
        let labels: std::collections::BTreeSet<&str> =
            points.iter().filter_map(|p| p.group.as_deref()).collect();
        let palette = generate_palette(labels.len());
        GroupPalette {
            mapping: labels
                .into_iter()
                .map(str::to_string)
                .zip(palette)
                .collect(),
        }
    }

    pub fn color_for(&self, label: &str) -> Option<&str> {
        self.mapping.get(label).map(String::as_str)
    }

    /// Legend entries (label → colour) for the presentation layer.
    pub fn legend_entries(&self) -> Vec<(&str, &str)> {
        self.mapping
            .iter()
            .map(|(label, color)| (label.as_str(), color.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
