// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use expo_nav_grid::{snapshot, ExhibitorDirectory, Grid, RegionKey, TypeCensus, TypeMetadata};
use expo_nav_guide::{NavConfig, Navigator};
use expo_nav_path::{precompute, BatchRoutes, CostMatrix, Route, RouteOutcome, Router};

use crate::{Cli, Command};

/// Inputs shared by the routing commands.
struct Floor {
    grid: Grid,
    directory: Option<ExhibitorDirectory>,
    config: NavConfig,
}

impl Floor {
    fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;
        let grid = snapshot::load_grid(&cli.cells, &cli.types)
            .with_context(|| format!("Failed to load grid from {}", cli.cells.display()))?;
        let directory = cli
            .exhibitors
            .as_deref()
            .map(snapshot::load_directory)
            .transpose()
            .context("Failed to load exhibitor directory")?;
        tracing::info!(
            cells = grid.len(),
            regions = grid.regions().len(),
            exhibitors = directory.as_ref().map_or(0, |d| d.len()),
            "floor loaded"
        );
        Ok(Self {
            grid,
            directory,
            config,
        })
    }

    fn navigator(&self) -> Result<Navigator<'_>> {
        Navigator::new(&self.grid, self.directory.as_ref(), self.config.clone())
            .context("Invalid navigation config")
    }

    fn route(&self, matrix: &CostMatrix, start: &RegionKey, target: &RegionKey) -> Result<Route> {
        let router = Router::new(&self.grid, matrix, &self.config.pathfinding)?;
        match router.route(start, target)? {
            RouteOutcome::Found(route) => Ok(route),
            RouteOutcome::Unreachable { reason } => {
                bail!("No route from {start} to {target}: {reason}")
            }
        }
    }
}

/// File config, then environment, then `--set` overrides.
fn load_config(cli: &Cli) -> Result<NavConfig> {
    let mut config = match &cli.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NavConfig::default(),
    };
    config.apply_env().context("Invalid config in environment")?;
    config
        .apply_overrides(&cli.overrides)
        .context("Invalid --set override")?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Route {
            start,
            target,
            meta,
            directions,
        } => {
            let floor = Floor::load(&cli)?;
            let matrix = CostMatrix::build(&floor.grid, &floor.config.pathfinding);
            let mut route = floor.route(&matrix, start, target)?;
            if let Some(path) = meta {
                let meta = snapshot::load_meta(path).context("Failed to load grid metadata")?;
                route = route.with_pixels(&meta);
            }
            print_json(&route)?;
            if *directions {
                let doc = floor.navigator()?.navigate(&route, start, target)?;
                println!();
                print!("{}", doc.render_text());
            }
            Ok(())
        }

        Command::Precompute {
            start,
            targets,
            out_dir,
            meta,
        } => {
            let floor = Floor::load(&cli)?;
            let options = &floor.config.pathfinding;
            let matrix = CostMatrix::build(&floor.grid, options);
            let router = Router::new(&floor.grid, &matrix, options)?;
            let targets = (!targets.is_empty()).then_some(targets.as_slice());
            let mut batch = precompute(&router, start, targets)?;
            if let Some(path) = meta {
                let meta = snapshot::load_meta(path).context("Failed to load grid metadata")?;
                batch = batch.with_pixels(&meta);
            }
            let path = out_dir.join(BatchRoutes::file_name(batch.start_idx));
            batch
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{}: {} routes, {} unreachable",
                path.display(),
                batch.statistics.successful,
                batch.statistics.failed
            );
            Ok(())
        }

        Command::Navigate {
            start,
            target,
            all,
            out_dir,
            json,
        } => {
            let floor = Floor::load(&cli)?;
            let navigator = floor.navigator()?;
            if let Some(artifact) = all {
                return navigate_all(&navigator, artifact, out_dir);
            }
            let (Some(start), Some(target)) = (start, target) else {
                bail!("navigate needs START and TARGET, or --all ARTIFACT");
            };
            let matrix = CostMatrix::build(&floor.grid, &floor.config.pathfinding);
            let route = floor.route(&matrix, start, target)?;
            let doc = navigator.navigate(&route, start, target)?;
            if *json {
                print_json(&doc)
            } else {
                print!("{}", doc.render_text());
                Ok(())
            }
        }

        Command::CheckTypes { threshold } => {
            let cells = snapshot::load_cells(&cli.cells)
                .with_context(|| format!("Failed to load {}", cli.cells.display()))?;
            let types = snapshot::load_types(&cli.types).ok();
            let census = TypeCensus::from_cells(&cells);

            println!("{} cells, {} types", cells.len(), census.counts.len());
            for (tag, ids) in &census.counts {
                let note = match &types {
                    Some(types) if !types.contains(tag) => "  (missing from metadata)",
                    _ => "",
                };
                println!("  {tag:<24} {:>6}{note}", ids.len());
            }
            let rare: Vec<_> = census.rare(*threshold).collect();
            if !rare.is_empty() {
                println!("\nTypes with fewer than {threshold} cells:");
                for (tag, ids) in rare {
                    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                    println!("  {tag}: {}", ids.join(", "));
                }
            }
            Ok(())
        }

        Command::ScaffoldTypes { out } => {
            let cells = snapshot::load_cells(&cli.cells)
                .with_context(|| format!("Failed to load {}", cli.cells.display()))?;
            let existing = if cli.types.exists() {
                snapshot::load_types(&cli.types)
                    .with_context(|| format!("Failed to load {}", cli.types.display()))?
            } else {
                TypeMetadata::new()
            };
            let (types, added) = TypeMetadata::scaffold(&cells, &existing);
            let out: &Path = out.as_deref().unwrap_or(&cli.types);
            snapshot::write_json(out, &types)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{}: {} types, {} added", out.display(), types.len(), added.len());
            for tag in added {
                println!("  + {tag}");
            }
            Ok(())
        }

        Command::Config => print_json(&load_config(&cli)?),
    }
}

fn navigate_all(navigator: &Navigator<'_>, artifact: &Path, out_dir: &Path) -> Result<()> {
    let batch = BatchRoutes::load(artifact)
        .with_context(|| format!("Failed to read route artifact {}", artifact.display()))?;
    let navigation = navigator.navigate_batch(&batch);
    let written = navigation
        .save_all(out_dir)
        .with_context(|| format!("Failed to write into {}", out_dir.display()))?;
    println!(
        "{}: {written} documents, {} failed",
        out_dir.display(),
        navigation.failures.len()
    );
    for failure in &navigation.failures {
        println!("  {}: {}", failure.idx, failure.error);
    }
    Ok(())
}
