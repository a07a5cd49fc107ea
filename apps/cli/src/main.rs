// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `expo-nav` - routing and walking directions over an annotated floor plan.
//!
//! # Commands
//!
//! - `route START TARGET` - one route as JSON, optionally with directions
//! - `precompute START` - routes to every landmark region, `<start>_to_all.json`
//! - `navigate START TARGET` or `navigate --all ARTIFACT` - directions
//! - `check-types` - per-type cell counts, flags rare tags
//! - `scaffold-types` - complete a type metadata file for a grid
//! - `config` - print the effective configuration
//!
//! Regions are given as `booth:<id>`, `cell:<idx>` or a bare cell index.
//! Logs go to stderr (`RUST_LOG`, default `info`); results go to stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use expo_nav_grid::RegionKey;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "expo-nav", version, about = "Exhibition floor routing and landmark directions")]
struct Cli {
    /// Grid snapshot (JSON array of cells)
    #[arg(long, value_name = "PATH", global = true, default_value = "data/grid_cells.json")]
    cells: PathBuf,

    /// Type metadata (JSON object keyed by type tag)
    #[arg(long, value_name = "PATH", global = true, default_value = "data/type_metadata.json")]
    types: PathBuf,

    /// Exhibitor directory used for landmark names
    #[arg(long, value_name = "PATH", global = true)]
    exhibitors: Option<PathBuf>,

    /// Navigation config file (JSON)
    #[arg(long, value_name = "PATH", global = true, env = "EXPO_NAV_CONFIG")]
    config: Option<PathBuf>,

    /// Override one config value, e.g. `--set sequence_selection.min_coverage_threshold=0.3`
    #[arg(long = "set", value_name = "SECTION.KEY=VALUE", global = true)]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route between two regions and print it as JSON
    Route {
        start: RegionKey,
        target: RegionKey,
        /// Grid metadata; adds pixel waypoints to the output
        #[arg(long, value_name = "PATH")]
        meta: Option<PathBuf>,
        /// Also print the walking directions
        #[arg(long)]
        directions: bool,
    },
    /// Route from one region to every landmark region
    Precompute {
        start: RegionKey,
        /// Restrict to these targets (repeatable)
        #[arg(long = "target", value_name = "REGION")]
        targets: Vec<RegionKey>,
        #[arg(long, value_name = "DIR", default_value = "routes")]
        out_dir: PathBuf,
        #[arg(long, value_name = "PATH")]
        meta: Option<PathBuf>,
    },
    /// Produce walking directions
    Navigate {
        #[arg(required_unless_present = "all")]
        start: Option<RegionKey>,
        #[arg(required_unless_present = "all")]
        target: Option<RegionKey>,
        /// Render every route of a precomputed `<start>_to_all.json`
        #[arg(long, value_name = "ARTIFACT", conflicts_with_all = ["start", "target"])]
        all: Option<PathBuf>,
        /// Directory for `--all` output
        #[arg(long, value_name = "DIR", default_value = "navigation")]
        out_dir: PathBuf,
        /// Print the JSON document instead of text
        #[arg(long)]
        json: bool,
    },
    /// Count cells per type and list types with few cells
    CheckTypes {
        #[arg(long, default_value_t = 3)]
        threshold: usize,
    },
    /// Add default entries for every type tag missing from the metadata
    ScaffoldTypes {
        /// Output file; defaults to the `--types` path
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_references() {
        let cli = Cli::try_parse_from(["expo-nav", "route", "booth:A12", "cell:7"]).unwrap();
        match cli.command {
            Command::Route { start, target, .. } => {
                assert_eq!(start, RegionKey::Booth("A12".into()));
                assert_eq!(target.to_string(), "7");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["expo-nav", "route", "booth:", "1"]).is_err());
    }

    #[test]
    fn overrides_are_global_and_repeatable() {
        let cli = Cli::try_parse_from([
            "expo-nav",
            "config",
            "--set",
            "phrasing.units_per_booth=3",
            "--set",
            "side_calculation.ambiguous_side=left",
        ])
        .unwrap();
        assert_eq!(cli.overrides.len(), 2);
    }

    #[test]
    fn navigate_needs_regions_or_an_artifact() {
        assert!(Cli::try_parse_from(["expo-nav", "navigate"]).is_err());
        assert!(Cli::try_parse_from(["expo-nav", "navigate", "--all", "routes/1_to_all.json"]).is_ok());
        assert!(Cli::try_parse_from(["expo-nav", "navigate", "1", "--all", "x.json"]).is_err());
    }
}
