#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-query hazard scoring.
//!
//! Given a resolved gazetteer record, [`RiskEngine::diagnose`] builds a
//! bounding box around its coordinate and scores every hazard category
//! against the official raster maps, one category at a time:
//!
//! 1. The bounding box becomes a pixel range at the configured zoom.
//! 2. Every covering tile pair (hazard overlay + reference base map) is
//!    fetched; failures skip the tile.
//! 3. Decoded pixels land in a **fresh** [`pixels::PixelStore`] for the
//!    pass — the store never outlives its category, which is what keeps
//!    one category's pixels out of the next one's score.
//! 4. Cached colors inside the range are weighed, normalized by land
//!    pixel count, and ranked.
//!
//! The debris-flow composite runs the pipeline three times (steep-slope,
//! debris-flow, landslide warning zones) and averages the results. The
//! earthquake category bypasses rasters entirely and asks the seismic
//! mesh service for a site-amplification factor; its failures abort the
//! query rather than degrade, unlike every raster category.

pub mod classify;
pub mod debug_image;
pub mod pixels;
pub mod seismic;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use hazard_map_gazetteer::AddressRecord;
use hazard_map_geo::{BoundingBox, GeoPoint, Zoom, to_pixel_range};
use hazard_map_hazard_models::{CategoryRisk, DiagnosisReport, RiskResult};
use hazard_map_tiles::{
    DEFAULT_BASEMAP_BASE_URL, DEFAULT_FETCH_CONCURRENCY, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_HAZARD_BASE_URL, HazardLayer, TileError, TileFetcher,
};

pub use pixels::{PixelError, PixelStore, WATER_COLOR};
pub use seismic::DEFAULT_SEISMIC_BASE_URL;

/// Degrees the bounding box extends from the resolved coordinate on
/// every axis.
pub const DEFAULT_HALF_EXTENT_DEG: f64 = 0.01;

/// Default zoom level for all tile sampling within a run.
pub const DEFAULT_ZOOM: Zoom = Zoom::new(13);

/// Error scoring a query.
#[derive(Debug, Error)]
pub enum HazardError {
    /// The tile fetcher could not be constructed.
    #[error(transparent)]
    Tiles(#[from] TileError),
    /// An HTTP request failed (seismic lookup or client construction).
    #[error("seismic lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The seismic service answered with an unusable payload.
    #[error("seismic lookup response malformed: {message}")]
    SeismicParse {
        /// What was missing or unreadable.
        message: String,
    },
}

/// Run-scoped configuration for the scoring engine.
///
/// The zoom is fixed here once and threaded explicitly through every
/// coordinate transform; nothing in the pipeline mutates it.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Tile pyramid zoom level.
    pub zoom: Zoom,
    /// Bounding-box half extent in degrees.
    pub half_extent_deg: f64,
    /// Per-request timeout for tile and seismic fetches.
    pub fetch_timeout: Duration,
    /// Concurrent tile-pair fetches within one category pass.
    pub fetch_concurrency: usize,
    /// Hazard-overlay tile service base URL.
    pub hazard_base_url: String,
    /// Reference base-map tile service base URL.
    pub basemap_base_url: String,
    /// Seismic mesh-info endpoint.
    pub seismic_base_url: String,
    /// Directory for per-category debug images; `None` disables them.
    pub debug_image_dir: Option<PathBuf>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            half_extent_deg: DEFAULT_HALF_EXTENT_DEG,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            hazard_base_url: DEFAULT_HAZARD_BASE_URL.to_string(),
            basemap_base_url: DEFAULT_BASEMAP_BASE_URL.to_string(),
            seismic_base_url: DEFAULT_SEISMIC_BASE_URL.to_string(),
            debug_image_dir: None,
        }
    }
}

/// Scores hazard categories for resolved addresses.
pub struct RiskEngine {
    fetcher: TileFetcher,
    seismic_client: reqwest::Client,
    config: RiskConfig,
}

impl RiskEngine {
    /// Builds an engine (and its HTTP clients) from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn new(config: RiskConfig) -> Result<Self, HazardError> {
        let fetcher = TileFetcher::with_base_urls(
            config.fetch_timeout,
            config.hazard_base_url.clone(),
            config.basemap_base_url.clone(),
        )?;
        let seismic_client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self {
            fetcher,
            seismic_client,
            config,
        })
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Runs the full diagnosis for a resolved address.
    ///
    /// Categories run strictly one at a time; each raster pass owns a
    /// fresh pixel store. Raster categories degrade to zero risk when no
    /// tile yields both images.
    ///
    /// # Errors
    ///
    /// Returns an error only for the seismic lookup (request failure or
    /// malformed response); raster failures never abort the query.
    pub async fn diagnose(
        &self,
        record: &AddressRecord,
        normalized_input: &str,
    ) -> Result<DiagnosisReport, HazardError> {
        let center = GeoPoint::new(record.latitude, record.longitude);
        let bounds = BoundingBox::around(center, self.config.half_extent_deg);

        let flood = self.score_layer(HazardLayer::Flood, &bounds).await;
        let earthquake = self.earthquake_risk(center).await?;
        let tsunami = self.score_layer(HazardLayer::Tsunami, &bounds).await;
        let heavysnow = self.score_layer(HazardLayer::HeavySnow, &bounds).await;

        let mut sub_layers = [CategoryRisk::none(); 3];
        let mut sub_risks = [0.0; 3];
        for (slot, layer) in HazardLayer::DIRTSAND_SUBLAYERS.iter().enumerate() {
            let result = self.score_layer(*layer, &bounds).await;
            sub_risks[slot] = result.normalized_risk;
            sub_layers[slot] = CategoryRisk::from(result);
        }
        let (dirtsand_rank, dirtsand_risk) = classify::composite_dirtsand(sub_risks);

        Ok(DiagnosisReport {
            flood: CategoryRisk::from(flood),
            earthquake,
            tsunami: CategoryRisk::from(tsunami),
            heavysnow: CategoryRisk::from(heavysnow),
            dirtsand1: sub_layers[0],
            dirtsand2: sub_layers[1],
            dirtsand3: sub_layers[2],
            dirtsand: CategoryRisk {
                rank: dirtsand_rank,
                risk: dirtsand_risk,
            },
            address: record.address.clone(),
            input_address: normalized_input.to_string(),
        })
    }

    /// One raster category pass: acquire, ingest, classify, aggregate.
    async fn score_layer(&self, layer: HazardLayer, bounds: &BoundingBox) -> RiskResult {
        let range = to_pixel_range(bounds, self.config.zoom);

        // Fresh store per pass; nothing leaks across categories.
        let mut store = PixelStore::new();
        let pairs = self
            .fetcher
            .fetch_covering(layer, self.config.zoom, &range, self.config.fetch_concurrency)
            .await;
        for pair in pairs {
            if let Err(e) = store.ingest_tile(pair.tile, &pair.overlay, &pair.reference) {
                log::warn!(
                    "{layer}: skipping tile ({}, {}): {e}",
                    pair.tile.x,
                    pair.tile.y
                );
            }
        }

        if let Some(dir) = &self.config.debug_image_dir {
            let path = dir.join(format!("latest_output_image_{layer}.png"));
            if let Err(e) = debug_image::write_debug_image(&store, &range, &path) {
                log::warn!("failed writing debug image {}: {e}", path.display());
            }
        }

        let colors = store.colors_within(&range);
        log::debug!(
            "{layer}: sampled {} pixels over cell area {}",
            colors.len(),
            range.cell_area()
        );

        let table = classify::risk_table(layer);
        let (raw, land) = classify::score_colors(colors, &table);
        let result = classify::aggregate(raw, land, classify::RankThresholds::for_layer(layer));
        log::info!(
            "{layer}: risk {:.4} over {} land pixels -> {}",
            result.normalized_risk,
            result.land_pixel_count,
            result.rank
        );
        result
    }

    /// The earthquake category: a scalar lookup, ranked directly.
    async fn earthquake_risk(&self, point: GeoPoint) -> Result<CategoryRisk, HazardError> {
        let amplification = seismic::site_amplification(
            &self.seismic_client,
            &self.config.seismic_base_url,
            point,
        )
        .await?;
        Ok(CategoryRisk {
            rank: classify::RankThresholds::Earthquake.rank(amplification),
            risk: amplification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_run_constants() {
        let config = RiskConfig::default();
        assert_eq!(config.zoom, Zoom::new(13));
        assert!((config.half_extent_deg - 0.01).abs() < f64::EPSILON);
        assert!(config.debug_image_dir.is_none());
    }

    #[test]
    fn engine_builds_from_default_config() {
        assert!(RiskEngine::new(RiskConfig::default()).is_ok());
    }
}
