#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gazetteer store and fuzzy address resolution.
//!
//! The gazetteer is a read-only list of known addresses with their
//! coordinates, loaded from a CSV file with `address,latitude,longitude`
//! columns. Free-text queries are normalized (decimal digit runs become
//! kanji numerals, matching how the gazetteer spells addresses) and then
//! matched against every record with a character-level similarity ratio.
//!
//! Both the address-only lookup and the full risk query go through the
//! same [`resolver::resolve`] path; there is exactly one matching
//! implementation.

pub mod numerals;
pub mod resolver;

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error loading the gazetteer.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// The CSV file could not be opened or a row failed to parse.
    #[error("failed to read gazetteer csv: {0}")]
    Csv(#[from] csv::Error),
}

/// One gazetteer row: a canonical address and its coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressRecord {
    /// Canonical address text as stored in the gazetteer.
    pub address: String,
    /// Latitude in degrees (WGS84).
    pub latitude: f64,
    /// Longitude in degrees (WGS84).
    pub longitude: f64,
}

/// An in-memory, read-only address → coordinate store.
///
/// Iteration order is the file's row order; the resolver relies on it for
/// deterministic tie-breaking.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    records: Vec<AddressRecord>,
}

impl Gazetteer {
    /// Creates a gazetteer from pre-built records (mostly for tests).
    #[must_use]
    pub const fn new(records: Vec<AddressRecord>) -> Self {
        Self { records }
    }

    /// Loads a gazetteer from a CSV file with a
    /// `address,latitude,longitude` header row.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Csv`] if the file cannot be opened or a
    /// row fails to deserialize.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Loads a gazetteer from any CSV reader.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError::Csv`] if a row fails to deserialize.
    pub fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, GazetteerError> {
        let records = reader
            .deserialize()
            .collect::<Result<Vec<AddressRecord>, csv::Error>>()?;
        log::debug!("loaded {} gazetteer records", records.len());
        Ok(Self::new(records))
    }

    /// All records, in gazetteer order.
    #[must_use]
    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the gazetteer holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_csv_rows_in_order() {
        let data = "address,latitude,longitude\n\
                    東京都千代田区一番一号,35.68,139.76\n\
                    大阪府大阪市北区,34.70,135.50\n";
        let gazetteer =
            Gazetteer::from_csv_reader(csv::Reader::from_reader(data.as_bytes())).unwrap();

        assert_eq!(gazetteer.len(), 2);
        assert_eq!(gazetteer.records()[0].address, "東京都千代田区一番一号");
        assert!((gazetteer.records()[1].latitude - 34.70).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_rows() {
        let data = "address,latitude,longitude\nsomewhere,not-a-number,135.50\n";
        let result = Gazetteer::from_csv_reader(csv::Reader::from_reader(data.as_bytes()));
        assert!(result.is_err());
    }
}
