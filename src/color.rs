use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.6, 0.65);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

/// Maps the categories of one chart to distinct colours, by position.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors: Vec<Color32>,
}

impl CategoryPalette {
    pub fn new(categories: usize) -> Self {
        Self {
            colors: generate_palette(categories),
        }
    }

    pub fn color_for(&self, index: usize) -> Color32 {
        self.colors.get(index).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation grid
// ---------------------------------------------------------------------------

/// Blue for -1, near-white for 0, red for +1. Out-of-range input is clamped.
pub fn diverging(value: f64) -> Color32 {
    let cool: LinSrgb = Srgb::new(0.23_f32, 0.30, 0.75).into_linear();
    let warm: LinSrgb = Srgb::new(0.71_f32, 0.02, 0.15).into_linear();
    let neutral: LinSrgb = Srgb::new(0.87_f32, 0.87, 0.87).into_linear();

    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        neutral.mix(cool, -t)
    } else {
        neutral.mix(warm, t)
    };
    to_color32(Srgb::from_linear(mixed))
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_eq!(CategoryPalette::new(2).color_for(5), Color32::GRAY);
    }

    #[test]
    fn diverging_scale_ends() {
        let cold = diverging(-1.0);
        let hot = diverging(1.0);
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        assert_eq!(diverging(0.0), diverging(-0.0));
        assert_eq!(diverging(3.0), hot);
    }
}
