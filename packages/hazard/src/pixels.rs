//! Per-pass pixel cache with water-body masking.
//!
//! One [`PixelStore`] holds the decoded pixels of every tile fetched for
//! a single category pass, keyed by absolute pixel coordinate in the
//! global grid. Ingestion writes the hazard overlay first, then
//! overwrites with the water sentinel wherever the reference base map
//! shows water — the mask is a deliberate override and must follow the
//! overlay write for the same tile. Tiles occupy disjoint coordinate
//! ranges, so tile ingestion order is otherwise free.
//!
//! The store is scoped to one category pass. The orchestrator builds a
//! fresh store per pass; a pixel surviving from a previous category is a
//! correctness bug, and [`PixelStore::clear`] exists to make the reset
//! testable.

use std::collections::HashMap;

use image::{Rgb, RgbImage};
use thiserror::Error;

use hazard_map_geo::{PixelCoordinate, PixelRange, TileCoordinate};

/// Water-body sentinel color in the pale reference base map.
pub const WATER_COLOR: &str = "#bed2ff";

/// RGB bytes of [`WATER_COLOR`].
pub const WATER_RGB: [u8; 3] = [0xbe, 0xd2, 0xff];

/// Error ingesting a tile pair.
#[derive(Debug, Error)]
pub enum PixelError {
    /// One of the tile images failed to decode.
    #[error("failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Formats a decoded pixel as a lowercase `#rrggbb` color code.
#[must_use]
pub fn hex_color(pixel: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", pixel[0], pixel[1], pixel[2])
}

/// The per-category-pass cache of absolute pixel coordinate → color code.
#[derive(Debug, Default)]
pub struct PixelStore {
    cache: HashMap<PixelCoordinate, String>,
}

impl PixelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Empties the cache. Must run (or a fresh store must replace this
    /// one) before the next category's acquisition starts.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Ingests one tile pair.
    ///
    /// Both images are decoded up front so that a decode failure skips
    /// the whole tile without touching the cache — the same
    /// both-or-neither rule the fetch layer applies. Every overlay pixel
    /// is written unconditionally at
    /// `(tile.x·256 + column, tile.y·256 + row)`; afterwards every
    /// reference pixel matching the water sentinel overwrites the entry
    /// at its coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::Decode`] if either image fails to decode;
    /// the cache is unchanged in that case.
    pub fn ingest_tile(
        &mut self,
        tile: TileCoordinate,
        overlay_png: &[u8],
        reference_png: &[u8],
    ) -> Result<(), PixelError> {
        let overlay = image::load_from_memory(overlay_png)?.to_rgb8();
        let reference = image::load_from_memory(reference_png)?.to_rgb8();

        let origin = tile.origin();
        self.write_overlay(origin, &overlay);
        self.apply_water_mask(origin, &reference);
        Ok(())
    }

    fn write_overlay(&mut self, origin: PixelCoordinate, overlay: &RgbImage) {
        for (column, row, pixel) in overlay.enumerate_pixels() {
            let coordinate =
                PixelCoordinate::new(origin.x + i64::from(column), origin.y + i64::from(row));
            self.cache.insert(coordinate, hex_color(*pixel));
        }
    }

    fn apply_water_mask(&mut self, origin: PixelCoordinate, reference: &RgbImage) {
        for (column, row, pixel) in reference.enumerate_pixels() {
            if pixel.0 == WATER_RGB {
                let coordinate =
                    PixelCoordinate::new(origin.x + i64::from(column), origin.y + i64::from(row));
                self.cache.insert(coordinate, WATER_COLOR.to_string());
            }
        }
    }

    /// Color at an absolute pixel coordinate, if cached.
    #[must_use]
    pub fn color_at(&self, coordinate: PixelCoordinate) -> Option<&str> {
        self.cache.get(&coordinate).map(String::as_str)
    }

    /// All cached entries inside `range` (inclusive on every edge).
    #[must_use]
    pub fn pixels_within(&self, range: &PixelRange) -> Vec<(PixelCoordinate, &str)> {
        self.cache
            .iter()
            .filter(|(coordinate, _)| range.contains(**coordinate))
            .map(|(coordinate, color)| (*coordinate, color.as_str()))
            .collect()
    }

    /// Colors of all cached entries inside `range`.
    #[must_use]
    pub fn colors_within(&self, range: &PixelRange) -> Vec<&str> {
        self.cache
            .iter()
            .filter(|(coordinate, _)| range.contains(**coordinate))
            .map(|(_, color)| color.as_str())
            .collect()
    }
}
