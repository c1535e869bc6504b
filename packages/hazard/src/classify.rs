//! Color → risk classification and per-category aggregation.
//!
//! Each raster layer maps cached pixel colors to integer weights, sums
//! them over the sampled range, normalizes by the land pixel count, and
//! assigns a qualitative rank from the layer's threshold ladder. Water
//! pixels never count as land and never carry weight.

use hazard_map_hazard_models::{Rank, RiskResult};
use hazard_map_tiles::HazardLayer;

use crate::pixels::WATER_COLOR;

/// Weight for presence-only layers: one matching pixel saturates the
/// normalized risk far past every threshold.
pub const PRESENCE_WEIGHT: u64 = 131_072;

/// Overlay color for "no data" in the warning-zone layers.
pub const NO_DATA_COLOR: &str = "#000000";

/// Inundation-depth band weights shared by the flood and tsunami layers,
/// shallowest to deepest.
pub const DEPTH_BAND_WEIGHTS: &[(&str, u64)] = &[
    ("#ffffb3", 1),
    ("#f7f5a9", 2),
    ("#f8e1a6", 4),
    ("#ffd8c0", 8),
    ("#ffb7b7", 16),
    ("#ff9191", 32),
    ("#f285c9", 64),
    ("#dc7adc", 128),
];

/// Avalanche-prone marker color; presence alone saturates the score.
pub const AVALANCHE_WEIGHTS: &[(&str, u64)] = &[("#ffff65", PRESENCE_WEIGHT)];

/// How a layer maps colors to weights.
#[derive(Debug, Clone, Copy)]
pub enum ColorRiskTable {
    /// Explicit color → weight entries; unlisted colors weigh 0.
    Weighted(&'static [(&'static str, u64)]),
    /// Any color except "no data" black carries the uniform weight.
    UniformPresence {
        /// Weight for every present pixel.
        weight: u64,
    },
}

impl ColorRiskTable {
    /// Weight contributed by one (non-water) pixel color.
    #[must_use]
    pub fn weight_for(&self, color: &str) -> u64 {
        match self {
            Self::Weighted(entries) => entries
                .iter()
                .find(|(entry, _)| *entry == color)
                .map_or(0, |(_, weight)| *weight),
            Self::UniformPresence { weight } => {
                if color == NO_DATA_COLOR {
                    0
                } else {
                    *weight
                }
            }
        }
    }
}

/// The color table for a raster layer.
#[must_use]
pub const fn risk_table(layer: HazardLayer) -> ColorRiskTable {
    match layer {
        HazardLayer::Flood | HazardLayer::Tsunami => ColorRiskTable::Weighted(DEPTH_BAND_WEIGHTS),
        HazardLayer::HeavySnow => ColorRiskTable::Weighted(AVALANCHE_WEIGHTS),
        HazardLayer::SteepSlope | HazardLayer::DebrisFlow | HazardLayer::Landslide => {
            ColorRiskTable::UniformPresence {
                weight: PRESENCE_WEIGHT,
            }
        }
    }
}

/// Sums weights and counts land pixels over the sampled colors.
///
/// Water pixels are excluded from both the sum and the land count; every
/// other color counts as land even when it carries zero weight.
pub fn score_colors<'a>(
    colors: impl IntoIterator<Item = &'a str>,
    table: &ColorRiskTable,
) -> (u64, u64) {
    let mut raw_risk_sum = 0;
    let mut land_pixel_count = 0;
    for color in colors {
        if color == WATER_COLOR {
            continue;
        }
        land_pixel_count += 1;
        raw_risk_sum += table.weight_for(color);
    }
    (raw_risk_sum, land_pixel_count)
}

/// Rank threshold ladder for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankThresholds {
    /// Flood, heavy snow, and the debris-flow sub-layers.
    Standard,
    /// Tsunami. The first two branches assign the same rank; the
    /// ladder is kept as-is, dominated branch included.
    Tsunami,
    /// Earthquake site amplification.
    Earthquake,
}

impl RankThresholds {
    /// The threshold ladder for a raster layer.
    #[must_use]
    pub const fn for_layer(layer: HazardLayer) -> Self {
        match layer {
            HazardLayer::Tsunami => Self::Tsunami,
            HazardLayer::Flood
            | HazardLayer::HeavySnow
            | HazardLayer::SteepSlope
            | HazardLayer::DebrisFlow
            | HazardLayer::Landslide => Self::Standard,
        }
    }

    /// Assigns a rank to a normalized risk value.
    #[must_use]
    pub fn rank(self, risk: f64) -> Rank {
        match self {
            Self::Standard => {
                if risk >= 2.0 {
                    Rank::Large
                } else if risk >= 0.25 {
                    Rank::Medium
                } else if risk > 0.0 {
                    Rank::Small
                } else {
                    Rank::None
                }
            }
            Self::Tsunami => {
                if risk >= 2.0 {
                    Rank::Large
                } else if risk >= 0.25 {
                    Rank::Large
                } else if risk > 0.0 {
                    Rank::Medium
                } else {
                    Rank::None
                }
            }
            Self::Earthquake => {
                if risk >= 2.0 {
                    Rank::Large
                } else if risk >= 1.0 {
                    Rank::Medium
                } else if risk > 0.0 {
                    Rank::Small
                } else {
                    Rank::None
                }
            }
        }
    }
}

/// Builds the per-category result from a raw sum and land count.
///
/// A zero land count divides by 1 instead; an empty sample therefore
/// yields zero risk and rank `none` rather than a fault.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(raw_risk_sum: u64, land_pixel_count: u64, thresholds: RankThresholds) -> RiskResult {
    let normalized_risk = raw_risk_sum as f64 / land_pixel_count.max(1) as f64;
    RiskResult {
        raw_risk_sum,
        land_pixel_count,
        normalized_risk,
        rank: thresholds.rank(normalized_risk),
    }
}

/// Combines the three debris-flow sub-layer risks into the composite.
///
/// The composite risk is the mean of the sub-layer normalized risks; any
/// positive mean ranks `large`, otherwise `none`. By construction this
/// category never reports `medium` or `small`.
#[must_use]
pub fn composite_dirtsand(sub_layer_risks: [f64; 3]) -> (Rank, f64) {
    let mean = sub_layer_risks.iter().sum::<f64>() / 3.0;
    let rank = if mean > 0.0 { Rank::Large } else { Rank::None };
    (rank, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallowest_band_over_one_land_pixel_ranks_medium() {
        let table = risk_table(HazardLayer::Flood);
        let (raw, land) = score_colors(["#ffffb3"], &table);
        let result = aggregate(raw, land, RankThresholds::for_layer(HazardLayer::Flood));

        assert_eq!(result.raw_risk_sum, 1);
        assert_eq!(result.land_pixel_count, 1);
        assert!((result.normalized_risk - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.rank, Rank::Medium);
    }

    #[test]
    fn depth_bands_accumulate() {
        let table = risk_table(HazardLayer::Flood);
        let (raw, land) = score_colors(["#ffffb3", "#dc7adc", "#f7f5a9"], &table);
        assert_eq!(raw, 1 + 128 + 2);
        assert_eq!(land, 3);
    }

    #[test]
    fn water_pixels_carry_nothing() {
        let table = risk_table(HazardLayer::Flood);
        let (raw, land) = score_colors([WATER_COLOR, WATER_COLOR, "#ffffb3"], &table);
        assert_eq!(raw, 1);
        assert_eq!(land, 1);
    }

    #[test]
    fn unknown_colors_count_as_land_with_zero_weight() {
        let table = risk_table(HazardLayer::Flood);
        let (raw, land) = score_colors(["#123456", "#abcdef"], &table);
        assert_eq!(raw, 0);
        assert_eq!(land, 2);
    }

    #[test]
    fn empty_sample_divides_by_one() {
        let result = aggregate(0, 0, RankThresholds::Standard);
        assert!((result.normalized_risk - 0.0).abs() < f64::EPSILON);
        assert_eq!(result.rank, Rank::None);
    }

    #[test]
    fn avalanche_sentinel_saturates() {
        let table = risk_table(HazardLayer::HeavySnow);
        let (raw, land) = score_colors(["#ffff65", "#eeeeee", "#eeeeee"], &table);
        let result = aggregate(raw, land, RankThresholds::Standard);
        assert_eq!(result.raw_risk_sum, PRESENCE_WEIGHT);
        assert_eq!(result.rank, Rank::Large);
    }

    #[test]
    fn other_colors_are_inert_for_avalanche() {
        let table = risk_table(HazardLayer::HeavySnow);
        let (raw, land) = score_colors(["#eeeeee", "#ff0000"], &table);
        assert_eq!(raw, 0);
        assert_eq!(land, 2);
    }

    #[test]
    fn warning_zones_score_any_non_black_presence() {
        let table = risk_table(HazardLayer::SteepSlope);
        let (raw, land) = score_colors(["#ff0000", NO_DATA_COLOR, "#00ff00"], &table);
        assert_eq!(raw, 2 * PRESENCE_WEIGHT);
        assert_eq!(land, 3);
    }

    #[test]
    fn standard_ladder_boundaries() {
        let t = RankThresholds::Standard;
        assert_eq!(t.rank(2.0), Rank::Large);
        assert_eq!(t.rank(0.25), Rank::Medium);
        assert_eq!(t.rank(0.1), Rank::Small);
        assert_eq!(t.rank(0.0), Rank::None);
    }

    // The ≥2 and ≥0.25 branches assign the same rank on purpose; both
    // sides of the dominated branch are pinned here.
    #[test]
    fn tsunami_ladder_dominated_branch() {
        let t = RankThresholds::Tsunami;
        assert_eq!(t.rank(3.0), Rank::Large);
        assert_eq!(t.rank(0.3), Rank::Large);
        assert_eq!(t.rank(0.1), Rank::Medium);
        assert_eq!(t.rank(0.0), Rank::None);
    }

    #[test]
    fn earthquake_ladder_boundaries() {
        let t = RankThresholds::Earthquake;
        assert_eq!(t.rank(2.1), Rank::Large);
        assert_eq!(t.rank(1.45), Rank::Medium);
        assert_eq!(t.rank(0.8), Rank::Small);
        assert_eq!(t.rank(0.0), Rank::None);
    }

    #[test]
    fn composite_of_zeroes_is_none() {
        let (rank, risk) = composite_dirtsand([0.0, 0.0, 0.0]);
        assert_eq!(rank, Rank::None);
        assert!((risk - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn composite_of_any_positive_mix_is_large() {
        let (rank, risk) = composite_dirtsand([0.0, 0.5, 0.0]);
        assert_eq!(rank, Rank::Large);
        assert!((risk - 0.5 / 3.0).abs() < 1e-12);
    }
}
