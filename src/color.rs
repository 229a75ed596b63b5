use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use usage_health::AddictionLevel;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues
/// starting at `start_hue` degrees.
pub fn generate_palette(n: usize, start_hue: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_color(start_hue + (i as f32 / n as f32) * 360.0, 0.65, 0.55))
        .collect()
}

fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

/// Green → red ramp across the addiction levels.
pub fn level_color(level: AddictionLevel) -> Color32 {
    let step = AddictionLevel::ALL
        .iter()
        .position(|l| *l == level)
        .unwrap_or(0) as f32;
    hsl_color(120.0 - step * 40.0, 0.6, 0.5)
}

/// Scatter points.
pub const POINT_COLOR: Color32 = Color32::from_rgb(90, 150, 220);

/// Trend lines drawn over scatters.
pub const TREND_COLOR: Color32 = Color32::from_rgb(235, 120, 50);

/// Background tint for a correlation cell: blue for negative, red for
/// positive, stronger with |r|.
pub fn correlation_color(r: f64) -> Color32 {
    let strength = r.abs().clamp(0.0, 1.0) as f32;
    let hue = if r < 0.0 { 215.0 } else { 5.0 };
    let base = hsl_color(hue, 0.7, 0.5);
    base.gamma_multiply(0.15 + 0.65 * strength)
}
