use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::START_GROUPS;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    palette_with_lightness(n, 0.55)
}

fn palette_with_lightness(n: usize, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, lightness);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Start group colours
// ---------------------------------------------------------------------------

/// Stable colour per start group.  The regular groups always receive the
/// same colours; any other group seen in the data gets a darker shade.
#[derive(Debug, Clone)]
pub struct GroupColors {
    mapping: BTreeMap<i64, Color32>,
    default_color: Color32,
}

impl GroupColors {
    pub fn new(observed: impl IntoIterator<Item = i64>) -> Self {
        let extra: BTreeSet<i64> = observed
            .into_iter()
            .filter(|g| !START_GROUPS.contains(g))
            .collect();
        let regular = START_GROUPS.zip(generate_palette(START_GROUPS.count()));
        let others = extra
            .iter()
            .copied()
            .zip(palette_with_lightness(extra.len(), 0.35));
        GroupColors {
            mapping: regular.chain(others).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, start_group: i64) -> Color32 {
        self.mapping
            .get(&start_group)
            .copied()
            .unwrap_or(self.default_color)
    }
}

impl Default for GroupColors {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for mean times
// ---------------------------------------------------------------------------

/// Red–yellow–blue fill for a mean time.  `domain[0]` maps to red and
/// `domain[1]` to blue; values outside are clamped.
pub fn mean_time_fill(mean: f64, domain: [f64; 2]) -> Color32 {
    let span = domain[1] - domain[0];
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((mean - domain[0]) / span).clamp(0.0, 1.0)
    } as f32;

    let red: LinSrgb = Srgb::new(0.65f32, 0.0, 0.15).into_linear();
    let yellow: LinSrgb = Srgb::new(1.0f32, 1.0, 0.75).into_linear();
    let blue: LinSrgb = Srgb::new(0.19f32, 0.21, 0.58).into_linear();

    let mixed = if t < 0.5 {
        red.mix(yellow, t * 2.0)
    } else {
        yellow.mix(blue, (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(mixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(11).len(), 11);
    }

    #[test]
    fn regular_groups_keep_colours_when_extra_appear() {
        let plain = GroupColors::default();
        let extended = GroupColors::new([10, 99]);
        assert_ne!(extended.color_for(99), Color32::GRAY);
        assert_eq!(plain.color_for(99), Color32::GRAY);
        for g in START_GROUPS {
            assert_eq!(plain.color_for(g), extended.color_for(g));
        }
    }

    #[test]
    fn fill_scale_ends() {
        let domain = [30.0, 5.0];
        let long = mean_time_fill(40.0, domain);
        let short = mean_time_fill(1.0, domain);
        assert!(long.r() > long.b());
        assert!(short.b() > short.r());
        assert_eq!(mean_time_fill(5.0, domain), short);
    }
}
