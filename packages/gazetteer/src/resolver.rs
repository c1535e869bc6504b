//! Fuzzy matching of normalized query text against the gazetteer.
//!
//! Every record is scored with a normalized Levenshtein ratio in `[0, 1]`
//! and the single best-scoring record wins, provided it clears the 0.6
//! cutoff. This is a linear scan over the whole gazetteer per query —
//! fine for the small-to-medium stores this tool targets, and the first
//! thing to replace with an index if that ever stops being true.

use strsim::normalized_levenshtein;

use crate::numerals::normalize_numerals;
use crate::{AddressRecord, Gazetteer};

/// Minimum similarity ratio for a match to be accepted.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Outcome of resolving a free-text address.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The best-matching record, if any cleared the cutoff.
    pub record: Option<AddressRecord>,
    /// The query text after numeral normalization.
    pub normalized_input: String,
}

/// Resolves free-text `input` against the gazetteer.
///
/// The input is numeral-normalized first, then compared against every
/// record's address. Ties break in gazetteer order: the first record with
/// the best score wins.
#[must_use]
pub fn resolve(gazetteer: &Gazetteer, input: &str) -> Resolution {
    let normalized_input = normalize_numerals(input);

    let mut best: Option<(&AddressRecord, f64)> = None;
    for record in gazetteer.records() {
        let score = normalized_levenshtein(&normalized_input, &record.address);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((record, score));
        }
    }

    let record = match best {
        Some((record, score)) if score >= SIMILARITY_CUTOFF => {
            log::debug!(
                "resolved '{normalized_input}' to '{}' (score {score:.3})",
                record.address
            );
            Some(record.clone())
        }
        Some((record, score)) => {
            log::debug!(
                "best candidate '{}' for '{normalized_input}' below cutoff (score {score:.3})",
                record.address
            );
            None
        }
        None => None,
    };

    Resolution {
        record,
        normalized_input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer(addresses: &[&str]) -> Gazetteer {
        Gazetteer::new(
            addresses
                .iter()
                .enumerate()
                .map(|(i, address)| AddressRecord {
                    address: (*address).to_string(),
                    latitude: 35.0 + i as f64,
                    longitude: 139.0 + i as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn matches_after_numeral_conversion() {
        let gazetteer = gazetteer(&["東京都千代田区一番一号"]);
        let resolution = resolve(&gazetteer, "東京都千代田区1番1号");

        assert_eq!(resolution.normalized_input, "東京都千代田区一番一号");
        assert_eq!(
            resolution.record.unwrap().address,
            "東京都千代田区一番一号"
        );
    }

    #[test]
    fn kanji_input_still_matches_digit_spelled_records() {
        // The gazetteer itself may spell numbers with digits; the
        // normalized kanji query has to clear the cutoff on similarity
        // alone.
        let gazetteer = gazetteer(&["東京都千代田区1番1号"]);
        let resolution = resolve(&gazetteer, "東京都千代田区一番一号");
        assert!(resolution.record.is_some());
    }

    #[test]
    fn near_match_clears_cutoff() {
        let gazetteer = gazetteer(&["東京都千代田区一番一号"]);
        let resolution = resolve(&gazetteer, "千代田区一番一号");
        assert!(resolution.record.is_some());
    }

    #[test]
    fn dissimilar_input_is_rejected() {
        let gazetteer = gazetteer(&["東京都千代田区一番一号"]);
        let resolution = resolve(&gazetteer, "北海道札幌市");

        assert_eq!(resolution.record, None);
        assert_eq!(resolution.normalized_input, "北海道札幌市");
    }

    #[test]
    fn empty_gazetteer_resolves_to_none() {
        let resolution = resolve(&Gazetteer::new(Vec::new()), "どこか");
        assert_eq!(resolution.record, None);
    }

    #[test]
    fn first_best_match_wins_ties() {
        let gazetteer = gazetteer(&["同じ住所一丁目", "同じ住所一丁目"]);
        let resolution = resolve(&gazetteer, "同じ住所1丁目");

        // Both score identically; gazetteer order breaks the tie.
        let record = resolution.record.unwrap();
        assert!((record.latitude - 35.0).abs() < 1e-9);
    }
}
