#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk rank and diagnosis report types.
//!
//! These are the JSON payloads the tool prints: per-category rank/risk
//! entries, the full diagnosis report, the address-only lookup response,
//! and the error envelope. Field order in [`DiagnosisReport`] is the
//! report's output order.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Qualitative risk rank for one hazard category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rank {
    /// No detected risk.
    None,
    /// Low risk.
    Small,
    /// Moderate risk.
    Medium,
    /// High risk.
    Large,
}

/// Full per-category scoring result, consumed immediately to build the
/// response entry; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskResult {
    /// Sum of color weights over the sampled pixels.
    pub raw_risk_sum: u64,
    /// Sampled pixels that were not water (clamped to ≥ 1 before use as
    /// a divisor).
    pub land_pixel_count: u64,
    /// `raw_risk_sum / land_pixel_count`.
    pub normalized_risk: f64,
    /// Rank assigned from the category's thresholds.
    pub rank: Rank,
}

/// One category's entry in the diagnosis report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRisk {
    /// Qualitative rank.
    pub rank: Rank,
    /// Normalized risk value behind the rank.
    pub risk: f64,
}

impl CategoryRisk {
    /// Entry for a category with no usable data.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            rank: Rank::None,
            risk: 0.0,
        }
    }
}

impl From<RiskResult> for CategoryRisk {
    fn from(result: RiskResult) -> Self {
        Self {
            rank: result.rank,
            risk: result.normalized_risk,
        }
    }
}

/// The full risk query response.
///
/// The three `dirtsand{1,2,3}` entries are the independently scored
/// debris-flow sub-layers; `dirtsand` is their composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    /// Flood inundation risk.
    pub flood: CategoryRisk,
    /// Seismic site-amplification risk.
    pub earthquake: CategoryRisk,
    /// Tsunami inundation risk.
    pub tsunami: CategoryRisk,
    /// Avalanche risk.
    pub heavysnow: CategoryRisk,
    /// Steep-slope failure sub-layer.
    pub dirtsand1: CategoryRisk,
    /// Debris-flow sub-layer.
    pub dirtsand2: CategoryRisk,
    /// Landslide sub-layer.
    pub dirtsand3: CategoryRisk,
    /// Debris-flow composite.
    pub dirtsand: CategoryRisk,
    /// The matched gazetteer address.
    pub address: String,
    /// The query text after numeral normalization.
    pub input_address: String,
}

/// Response for the address-only resolution flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressLookup {
    /// Whether a gazetteer record matched.
    pub exists: bool,
    /// Set when the lookup failed or found nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The matched address, or empty when none.
    pub address: String,
    /// The query text after numeral normalization.
    pub input_address: String,
}

impl AddressLookup {
    /// A successful lookup.
    #[must_use]
    pub const fn found(address: String, input_address: String) -> Self {
        Self {
            exists: true,
            error: None,
            address,
            input_address,
        }
    }

    /// A completed lookup with no match above the cutoff.
    #[must_use]
    pub const fn not_found(error: String, input_address: String) -> Self {
        Self {
            exists: false,
            error: Some(error),
            address: String::new(),
            input_address,
        }
    }
}

/// Error envelope emitted when a query cannot produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Human-readable failure description.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Rank::Large).unwrap(), "\"large\"");
        assert_eq!(serde_json::to_string(&Rank::None).unwrap(), "\"none\"");
        assert_eq!(Rank::Medium.to_string(), "medium");
    }

    #[test]
    fn ranks_order_by_severity() {
        assert!(Rank::Large > Rank::Medium);
        assert!(Rank::Medium > Rank::Small);
        assert!(Rank::Small > Rank::None);
    }

    #[test]
    fn report_keys_follow_output_order() {
        let entry = CategoryRisk::none();
        let report = DiagnosisReport {
            flood: entry,
            earthquake: entry,
            tsunami: entry,
            heavysnow: entry,
            dirtsand1: entry,
            dirtsand2: entry,
            dirtsand3: entry,
            dirtsand: entry,
            address: "東京都千代田区一番一号".to_string(),
            input_address: "東京都千代田区一番一号".to_string(),
        };

        let json = serde_json::to_string(&report).unwrap();
        let flood = json.find("\"flood\"").unwrap();
        let earthquake = json.find("\"earthquake\"").unwrap();
        let dirtsand = json.find("\"dirtsand\":").unwrap();
        let address = json.find("\"address\"").unwrap();
        assert!(flood < earthquake);
        assert!(earthquake < dirtsand);
        assert!(dirtsand < address);
    }

    #[test]
    fn lookup_omits_error_when_found() {
        let lookup = AddressLookup::found("住所".to_string(), "住所".to_string());
        let json = serde_json::to_string(&lookup).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"exists\":true"));
    }

    #[test]
    fn lookup_keeps_error_when_missing() {
        let lookup = AddressLookup::not_found("no match".to_string(), "入力".to_string());
        let json = serde_json::to_string(&lookup).unwrap();
        assert!(json.contains("\"exists\":false"));
        assert!(json.contains("\"error\":\"no match\""));
        assert!(json.contains("\"address\":\"\""));
    }
}
