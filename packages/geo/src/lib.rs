#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Web-mercator coordinate math shared by the tile acquisition and risk
//! scoring pipeline.
//!
//! A map at zoom level `z` is a square of `256 · 2^z` pixels per side,
//! divided into 256×256-pixel tiles indexed by integer `(x, y)`. This
//! crate converts WGS84 latitude/longitude into that global pixel grid
//! and back down to tile indexes. All functions are pure; the zoom level
//! is passed explicitly on every call and never stored globally.

use std::f64::consts::PI;

/// Side length of a map tile in pixels.
pub const TILE_SIZE: i64 = 256;

/// A zoom level for the web-mercator tile pyramid.
///
/// Fixed once per run and threaded explicitly through every coordinate
/// transform so that all pixel math within a query agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zoom(u8);

impl Zoom {
    /// Creates a zoom level.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    /// Returns the raw zoom level.
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Number of tiles per side at this zoom (`2^z`).
    #[must_use]
    pub fn scale(self) -> f64 {
        2_f64.powi(i32::from(self.0))
    }
}

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A geographic bounding box normalized to per-axis (min, max).
///
/// Constructed from any two opposite corners; which corner comes first
/// does not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: GeoPoint,
    max: GeoPoint,
}

impl BoundingBox {
    /// Creates a bounding box from two opposite corners, in any order.
    #[must_use]
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min: GeoPoint::new(a.latitude.min(b.latitude), a.longitude.min(b.longitude)),
            max: GeoPoint::new(a.latitude.max(b.latitude), a.longitude.max(b.longitude)),
        }
    }

    /// Creates a box centered on `center`, extending `half_extent_deg`
    /// degrees in every direction.
    #[must_use]
    pub fn around(center: GeoPoint, half_extent_deg: f64) -> Self {
        Self::from_corners(
            GeoPoint::new(
                center.latitude - half_extent_deg,
                center.longitude - half_extent_deg,
            ),
            GeoPoint::new(
                center.latitude + half_extent_deg,
                center.longitude + half_extent_deg,
            ),
        )
    }

    /// South-west-most corner (minimum latitude and longitude).
    #[must_use]
    pub const fn min(&self) -> GeoPoint {
        self.min
    }

    /// North-east-most corner (maximum latitude and longitude).
    #[must_use]
    pub const fn max(&self) -> GeoPoint {
        self.max
    }
}

/// An absolute pixel coordinate in the global grid at some zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoordinate {
    /// Global pixel column.
    pub x: i64,
    /// Global pixel row.
    pub y: i64,
}

impl PixelCoordinate {
    /// Creates a pixel coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The tile containing this pixel (floor division by the tile size).
    #[must_use]
    pub const fn tile(self) -> TileCoordinate {
        TileCoordinate {
            x: self.x.div_euclid(TILE_SIZE),
            y: self.y.div_euclid(TILE_SIZE),
        }
    }
}

/// An integer tile index at some zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoordinate {
    /// Tile column.
    pub x: i64,
    /// Tile row.
    pub y: i64,
}

impl TileCoordinate {
    /// Creates a tile coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Global pixel coordinate of this tile's top-left corner.
    #[must_use]
    pub const fn origin(self) -> PixelCoordinate {
        PixelCoordinate {
            x: self.x * TILE_SIZE,
            y: self.y * TILE_SIZE,
        }
    }
}

/// An inclusive rectangle of global pixel coordinates.
///
/// Always normalized: `x_min <= x_max` and `y_min <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    /// Left edge (inclusive).
    pub x_min: i64,
    /// Top edge (inclusive).
    pub y_min: i64,
    /// Right edge (inclusive).
    pub x_max: i64,
    /// Bottom edge (inclusive).
    pub y_max: i64,
}

impl PixelRange {
    /// Whether `pixel` lies inside this range (inclusive on all edges).
    #[must_use]
    pub const fn contains(&self, pixel: PixelCoordinate) -> bool {
        pixel.x >= self.x_min
            && pixel.x <= self.x_max
            && pixel.y >= self.y_min
            && pixel.y <= self.y_max
    }

    /// Cell area of the range, `(x_max − x_min) · (y_max − y_min)`.
    ///
    /// This is the box's edge-to-edge span product, not the count of
    /// pixels actually sampled inside it.
    #[must_use]
    pub const fn cell_area(&self) -> i64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }
}

/// Converts a WGS84 point to its absolute pixel coordinate at `zoom`.
///
/// Standard web-map mercator tiling: the fractional position within the
/// world square is scaled by `256 · 2^zoom` and truncated to an integer.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_pixel(point: GeoPoint, zoom: Zoom) -> PixelCoordinate {
    let lat_rad = point.latitude.to_radians();
    let world = 256.0 * zoom.scale();
    let x = (point.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * world;
    PixelCoordinate::new(x as i64, y as i64)
}

/// Converts a bounding box to the inclusive pixel range it covers at
/// `zoom`.
///
/// The two corners are transformed independently and the result is
/// normalized per axis, so either diagonal of the box may be supplied.
/// Note that pixel `y` grows southward while latitude grows northward;
/// normalization here is what keeps the range valid.
#[must_use]
pub fn to_pixel_range(bounds: &BoundingBox, zoom: Zoom) -> PixelRange {
    let a = to_pixel(bounds.min(), zoom);
    let b = to_pixel(bounds.max(), zoom);
    PixelRange {
        x_min: a.x.min(b.x),
        y_min: a.y.min(b.y),
        x_max: a.x.max(b.x),
        y_max: a.y.max(b.y),
    }
}
