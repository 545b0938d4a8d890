use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Colour of series `index` out of `n`, using evenly spaced hues. The same
/// index always gets the same colour, so a channel looks alike in its own figure and in an overlay.
pub fn series_color(index: usize, n: usize) -> RGBColor {
    hue_color(index % n.max(1), n.max(1))
}

fn hue_color(i: usize, n: usize) -> RGBColor {
    let hue = (i as f32 / n as f32) * 360.0;
    let hsl = Hsl::new(hue, 0.75, 0.45);
    let rgb: Srgb = hsl.into_color();
    RGBColor(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p: Vec<RGBColor> = (0..6).map(|i| series_color(i, 6)).collect();
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn series_colour_is_stable_and_wraps() {
        assert_eq!(series_color(2, 5), series_color(2, 5));
        assert_eq!(series_color(7, 5), series_color(2, 5));
        let _ = series_color(0, 0);
    }
}
