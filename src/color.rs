use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

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
// Color mapping: distinct cell value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a chart column to distinct colours, so a value
/// keeps its colour between the bar and pie views.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for `column`. Colours follow the sorted value order.
    pub fn new<'a>(column: &str, values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut sorted: Vec<&CellValue> = values.into_iter().filter(|v| !v.is_missing()).collect();
        sorted.sort();
        sorted.dedup();

        let palette = generate_palette(sorted.len());
        let mapping: BTreeMap<CellValue, Color32> = sorted
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn map_ignores_missing_and_duplicates() {
        let values = [
            CellValue::from("b"),
            CellValue::from("a"),
            CellValue::Missing,
            CellValue::from("a"),
        ];
        let map = ColorMap::new("city", &values);
        assert_eq!(map.len(), 2);
        assert_ne!(map.color_for(&"a".into()), map.color_for(&"b".into()));
        assert_eq!(map.color_for(&CellValue::Missing), Color32::GRAY);
        assert_eq!(map.color_for(&"zzz".into()), Color32::GRAY);
    }
}
