//! Diagnostic raster dump of one category pass.
//!
//! Renders the cached pixels inside the query range back into a PNG so
//! the sampled area can be eyeballed against the upstream hazard map.
//! Written best-effort after a pass; nothing ever reads it back.

use std::path::Path;

use image::{Rgb, RgbImage};

use hazard_map_geo::PixelRange;

use crate::pixels::PixelStore;

/// Side length of the all-black placeholder written when the pass
/// sampled nothing.
const PLACEHOLDER_SIZE: u32 = 256;

/// Parses a `#rrggbb` color code back into RGB bytes.
fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Renders the store's pixels inside `range` onto a black canvas sized
/// to the sampled extent. An empty sample yields the 256×256 black
/// placeholder.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render(store: &PixelStore, range: &PixelRange) -> RgbImage {
    let pixels = store.pixels_within(range);
    if pixels.is_empty() {
        return RgbImage::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE);
    }

    let x_min = pixels.iter().map(|(p, _)| p.x).min().unwrap_or(0);
    let x_max = pixels.iter().map(|(p, _)| p.x).max().unwrap_or(0);
    let y_min = pixels.iter().map(|(p, _)| p.y).min().unwrap_or(0);
    let y_max = pixels.iter().map(|(p, _)| p.y).max().unwrap_or(0);

    let width = (x_max - x_min + 1) as u32;
    let height = (y_max - y_min + 1) as u32;
    let mut canvas = RgbImage::new(width, height);

    for (coordinate, color) in pixels {
        if let Some(rgb) = parse_hex(color) {
            canvas.put_pixel(
                (coordinate.x - x_min) as u32,
                (coordinate.y - y_min) as u32,
                Rgb(rgb),
            );
        }
    }
    canvas
}

/// Renders and saves the pass's debug image.
///
/// # Errors
///
/// Returns [`image::ImageError`] if encoding or writing fails.
pub fn write_debug_image(
    store: &PixelStore,
    range: &PixelRange,
    path: &Path,
) -> Result<(), image::ImageError> {
    render(store, range).save(path)
}
