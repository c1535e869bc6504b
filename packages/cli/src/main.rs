#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for natural-hazard risk diagnosis.
//!
//! Two flows over the same address resolver:
//! - `hazard-map resolve <ADDRESS>` answers whether the gazetteer knows
//!   the address;
//! - `hazard-map diagnose <ADDRESS>` resolves it and scores every hazard
//!   category around the coordinate.
//!
//! The result is a single JSON object on stdout; diagnostics go to
//! stderr via `RUST_LOG`. Exit code 1 means a missing argument or an
//! internal failure (with an error JSON payload); everything else —
//! including an address the gazetteer does not know — exits 0.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use hazard_map_gazetteer::Gazetteer;
use hazard_map_gazetteer::resolver::{Resolution, resolve};
use hazard_map_geo::Zoom;
use hazard_map_hazard::{RiskConfig, RiskEngine};
use hazard_map_hazard_models::{AddressLookup, ErrorReport};

/// Qualitative natural-hazard risk ratings for free-text addresses.
#[derive(Parser)]
#[command(name = "hazard-map")]
#[command(about = "Rate flood, tsunami, snow, debris-flow and earthquake risk around an address")]
struct Cli {
    /// Path to the gazetteer CSV (`address,latitude,longitude`).
    #[arg(long, default_value = "data/gazetteer.csv")]
    gazetteer: PathBuf,

    /// Tile pyramid zoom level used for all sampling in this run.
    #[arg(long, default_value_t = 13)]
    zoom: u8,

    /// Per-request timeout in seconds for tile and seismic fetches.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Concurrent tile-pair fetches within one category pass.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Directory to write per-category debug images into.
    #[arg(long)]
    debug_image_dir: Option<PathBuf>,

    /// Flow to run.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve a free-text address against the gazetteer.
    Resolve {
        /// Free-text address to look up.
        address: Option<String>,
    },

    /// Resolve an address and score every hazard category around it.
    Diagnose {
        /// Free-text address to diagnose.
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            print_json(&ErrorReport {
                error: e.to_string(),
            });
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Resolve { ref address } => run_resolve(&cli.gazetteer, address.as_deref()),
        Commands::Diagnose { ref address } => run_diagnose(&cli, address.as_deref()).await,
    }
}

/// Address-only flow: answers with an [`AddressLookup`] payload.
fn run_resolve(gazetteer_path: &Path, address: Option<&str>) -> ExitCode {
    let Some(address) = address else {
        print_json(&AddressLookup::not_found(
            "no address argument given".to_string(),
            String::new(),
        ));
        return ExitCode::FAILURE;
    };

    let gazetteer = match Gazetteer::from_csv_path(gazetteer_path) {
        Ok(gazetteer) => gazetteer,
        Err(e) => {
            print_json(&AddressLookup::not_found(
                format!("address lookup failed: {e}"),
                address.to_string(),
            ));
            return ExitCode::FAILURE;
        }
    };

    let resolution = resolve(&gazetteer, address);
    match resolution.record {
        Some(record) => print_json(&AddressLookup::found(
            record.address,
            resolution.normalized_input,
        )),
        None => print_json(&AddressLookup::not_found(
            "no matching address found".to_string(),
            resolution.normalized_input,
        )),
    }
    ExitCode::SUCCESS
}

/// Full risk flow; any internal failure surfaces here, once, as an
/// error JSON with exit code 1.
async fn run_diagnose(cli: &Cli, address: Option<&str>) -> ExitCode {
    let Some(address) = address else {
        print_json(&ErrorReport {
            error: "no address argument given".to_string(),
        });
        return ExitCode::FAILURE;
    };

    match diagnose(cli, address).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("diagnosis failed: {e}");
            print_json(&ErrorReport {
                error: e.to_string(),
            });
            ExitCode::FAILURE
        }
    }
}

async fn diagnose(cli: &Cli, address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let gazetteer = Gazetteer::from_csv_path(&cli.gazetteer)?;
    let Resolution {
        record,
        normalized_input,
    } = resolve(&gazetteer, address);

    let Some(record) = record else {
        // A miss is a complete answer, not a failure.
        print_json(&ErrorReport {
            error: "no matching address found".to_string(),
        });
        return Ok(());
    };

    let engine = RiskEngine::new(RiskConfig {
        zoom: Zoom::new(cli.zoom),
        fetch_timeout: Duration::from_secs(cli.timeout_secs),
        fetch_concurrency: cli.concurrency,
        debug_image_dir: cli.debug_image_dir.clone(),
        ..RiskConfig::default()
    })?;

    let report = engine.diagnose(&record, &normalized_input).await?;
    print_json(&report);
    Ok(())
}

/// Prints one JSON value to stdout.
fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("failed to serialize response: {e}"),
    }
}
