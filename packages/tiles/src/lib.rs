#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hazard-overlay and base-map tile acquisition.
//!
//! For every tile covering a query's bounding box, two images are
//! fetched: the hazard overlay for the layer being scored, and the pale
//! reference base map used solely to detect water bodies. A tile
//! contributes pixels only if **both** images arrive; any failure —
//! missing tile, server error, timeout, transport fault — is a hard skip
//! of that tile with no retry.
//!
//! Tile services (GSI disaster portal + GSI base map):
//! overlays at `{base}/{dataset}/{z}/{x}/{y}.png`, reference tiles at
//! `{base}/{z}/{x}/{y}.png`.

use std::time::Duration;

use futures::stream::{self, StreamExt as _};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use hazard_map_geo::{PixelCoordinate, PixelRange, TileCoordinate, Zoom};

/// Default hazard-overlay tile service base URL.
pub const DEFAULT_HAZARD_BASE_URL: &str = "https://disaportaldata.gsi.go.jp/raster";

/// Default reference base-map tile service base URL.
pub const DEFAULT_BASEMAP_BASE_URL: &str = "https://cyberjapandata.gsi.go.jp/xyz/pale";

/// Default per-request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of tile pairs fetched concurrently within one pass.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// A raster hazard layer with its own overlay tile set.
///
/// The three `Dirtsand*` variants are the sub-layers of the composite
/// debris-flow category; each runs the full acquisition and scoring
/// pipeline independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
pub enum HazardLayer {
    /// Expected flood inundation depth.
    #[strum(serialize = "flood")]
    Flood,
    /// Expected tsunami inundation depth.
    #[strum(serialize = "tsunami")]
    Tsunami,
    /// Avalanche-prone locations.
    #[strum(serialize = "heavysnow")]
    HeavySnow,
    /// Steep-slope failure warning zones.
    #[strum(serialize = "dirtsand1")]
    SteepSlope,
    /// Debris-flow warning zones.
    #[strum(serialize = "dirtsand2")]
    DebrisFlow,
    /// Landslide warning zones.
    #[strum(serialize = "dirtsand3")]
    Landslide,
}

impl HazardLayer {
    /// The debris-flow composite's sub-layers, in scoring order.
    pub const DIRTSAND_SUBLAYERS: [Self; 3] = [Self::SteepSlope, Self::DebrisFlow, Self::Landslide];

    /// GSI disaster-portal dataset name for this layer's overlay tiles.
    #[must_use]
    pub const fn dataset(self) -> &'static str {
        match self {
            Self::Flood => "01_flood_l2_shinsuishin_data",
            Self::Tsunami => "04_tsunami_newlegend_data",
            Self::HeavySnow => "05_nadarekikenkasyo",
            Self::SteepSlope => "05_kyukeishakeikaikuiki",
            Self::DebrisFlow => "05_dosekiryukeikaikuiki",
            Self::Landslide => "05_jisuberikeikaikuiki",
        }
    }
}

/// Error building the tile fetcher.
#[derive(Debug, Error)]
pub enum TileError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result of one tile-image fetch.
///
/// Consumed uniformly by the acquisition loop: anything but `Success`
/// skips the tile. Timeouts are classified as `NotFound` — an upstream
/// that does not answer in time is treated the same as one that has no
/// tile there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The image body.
    Success(Vec<u8>),
    /// The service has no tile at this coordinate (404 or timeout).
    NotFound,
    /// A server or transport fault; the tile is skipped, not retried.
    TransientError,
}

/// Both images for one covering tile.
#[derive(Debug, Clone)]
pub struct TilePair {
    /// The tile these images belong to.
    pub tile: TileCoordinate,
    /// Encoded hazard-overlay image.
    pub overlay: Vec<u8>,
    /// Encoded reference base-map image.
    pub reference: Vec<u8>,
}

/// Enumerates the tiles covering an inclusive pixel range.
#[must_use]
pub fn covering_tiles(range: &PixelRange) -> Vec<TileCoordinate> {
    let min = PixelCoordinate::new(range.x_min, range.y_min).tile();
    let max = PixelCoordinate::new(range.x_max, range.y_max).tile();

    let mut tiles = Vec::new();
    for x in min.x..=max.x {
        for y in min.y..=max.y {
            tiles.push(TileCoordinate::new(x, y));
        }
    }
    tiles
}

/// Fetches hazard-overlay and base-map tiles over HTTP.
///
/// Holds one shared [`reqwest::Client`] with an explicit per-request
/// timeout; build it once per run.
pub struct TileFetcher {
    client: reqwest::Client,
    hazard_base_url: String,
    basemap_base_url: String,
}

impl TileFetcher {
    /// Creates a fetcher against the default GSI tile services.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Client`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TileError> {
        Self::with_base_urls(timeout, DEFAULT_HAZARD_BASE_URL, DEFAULT_BASEMAP_BASE_URL)
    }

    /// Creates a fetcher against custom tile service base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Client`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        timeout: Duration,
        hazard_base_url: impl Into<String>,
        basemap_base_url: impl Into<String>,
    ) -> Result<Self, TileError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            hazard_base_url: hazard_base_url.into(),
            basemap_base_url: basemap_base_url.into(),
        })
    }

    /// URL of `layer`'s overlay tile at `tile`/`zoom`.
    #[must_use]
    pub fn overlay_url(&self, layer: HazardLayer, zoom: Zoom, tile: TileCoordinate) -> String {
        format!(
            "{}/{}/{}/{}/{}.png",
            self.hazard_base_url,
            layer.dataset(),
            zoom.level(),
            tile.x,
            tile.y
        )
    }

    /// URL of the reference base-map tile at `tile`/`zoom`.
    #[must_use]
    pub fn basemap_url(&self, zoom: Zoom, tile: TileCoordinate) -> String {
        format!(
            "{}/{}/{}/{}.png",
            self.basemap_base_url,
            zoom.level(),
            tile.x,
            tile.y
        )
    }

    /// Fetches a single image, classifying the outcome tri-state.
    pub async fn fetch_image(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                log::debug!("timeout fetching {url}");
                return FetchOutcome::NotFound;
            }
            Err(e) => {
                log::debug!("transport error fetching {url}: {e}");
                return FetchOutcome::TransientError;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return FetchOutcome::NotFound;
        }
        if !status.is_success() {
            log::debug!("unexpected status {status} fetching {url}");
            return FetchOutcome::TransientError;
        }

        match response.bytes().await {
            Ok(body) => FetchOutcome::Success(body.to_vec()),
            Err(e) if e.is_timeout() => FetchOutcome::NotFound,
            Err(e) => {
                log::debug!("failed reading body of {url}: {e}");
                FetchOutcome::TransientError
            }
        }
    }

    /// Fetches both images for one tile.
    ///
    /// Returns `None` unless both the overlay and the reference image
    /// load — the hard-skip rule.
    pub async fn fetch_pair(
        &self,
        layer: HazardLayer,
        zoom: Zoom,
        tile: TileCoordinate,
    ) -> Option<TilePair> {
        let overlay_url = self.overlay_url(layer, zoom, tile);
        let basemap_url = self.basemap_url(zoom, tile);
        let (overlay, reference) = futures::join!(
            self.fetch_image(&overlay_url),
            self.fetch_image(&basemap_url),
        );

        match (overlay, reference) {
            (FetchOutcome::Success(overlay), FetchOutcome::Success(reference)) => Some(TilePair {
                tile,
                overlay,
                reference,
            }),
            _ => {
                log::debug!("skipping tile ({}, {}) for {layer}: image missing", tile.x, tile.y);
                None
            }
        }
    }

    /// Fetches every tile pair covering `range`, `concurrency` at a time.
    ///
    /// Tiles cover disjoint pixel ranges, so completion order does not
    /// matter; pairs with a missing image are dropped here.
    pub async fn fetch_covering(
        &self,
        layer: HazardLayer,
        zoom: Zoom,
        range: &PixelRange,
        concurrency: usize,
    ) -> Vec<TilePair> {
        let tiles = covering_tiles(range);
        let total = tiles.len();

        let pairs: Vec<TilePair> = stream::iter(
            tiles
                .into_iter()
                .map(|tile| self.fetch_pair(layer, zoom, tile)),
        )
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<Option<TilePair>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

        if pairs.len() < total {
            log::info!(
                "{layer}: fetched {}/{total} covering tiles (rest skipped)",
                pairs.len()
            );
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_slugs_are_stable() {
        assert_eq!(HazardLayer::Flood.to_string(), "flood");
        assert_eq!(HazardLayer::HeavySnow.to_string(), "heavysnow");
        assert_eq!(HazardLayer::SteepSlope.to_string(), "dirtsand1");
        assert_eq!(HazardLayer::Landslide.to_string(), "dirtsand3");
    }

    #[test]
    fn layer_datasets_match_services() {
        assert_eq!(HazardLayer::Flood.dataset(), "01_flood_l2_shinsuishin_data");
        assert_eq!(
            HazardLayer::Tsunami.dataset(),
            "04_tsunami_newlegend_data"
        );
        assert_eq!(
            HazardLayer::DebrisFlow.dataset(),
            "05_dosekiryukeikaikuiki"
        );
    }

    #[test]
    fn builds_tile_urls() {
        let fetcher =
            TileFetcher::with_base_urls(DEFAULT_FETCH_TIMEOUT, "https://hazard.example", "https://base.example")
                .unwrap();
        let tile = TileCoordinate::new(7276, 3225);
        let zoom = Zoom::new(13);

        assert_eq!(
            fetcher.overlay_url(HazardLayer::Flood, zoom, tile),
            "https://hazard.example/01_flood_l2_shinsuishin_data/13/7276/3225.png"
        );
        assert_eq!(
            fetcher.basemap_url(zoom, tile),
            "https://base.example/13/7276/3225.png"
        );
    }

    #[test]
    fn covering_tiles_spans_inclusive_rectangle() {
        let range = PixelRange {
            x_min: 255,
            y_min: 0,
            x_max: 512,
            y_max: 256,
        };
        let tiles = covering_tiles(&range);

        // x tiles 0..=2, y tiles 0..=1.
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&TileCoordinate::new(0, 0)));
        assert!(tiles.contains(&TileCoordinate::new(2, 1)));
    }

    #[test]
    fn single_pixel_range_is_one_tile() {
        let range = PixelRange {
            x_min: 100,
            y_min: 100,
            x_max: 100,
            y_max: 100,
        };
        assert_eq!(covering_tiles(&range), vec![TileCoordinate::new(0, 0)]);
    }
}
