// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-to-many precompute and the route artifact file.
//!
//! Targets are searched in parallel against the same matrix. Each search
//! writes only its own slot; results are sorted by target identifier, so the
//! artifact is identical to what a sequential run would produce.

use std::collections::BTreeMap;
use std::path::Path;

use expo_nav_grid::{snapshot, CellId, Grid, GridMeta, Region, RegionKey};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::route::{Route, RouteOutcome, Router, UnreachableReason};

/// Summary of a cell as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    pub idx: CellId,
    pub region: RegionKey,
    pub name: String,
    #[serde(rename = "type")]
    pub cell_type: String,
    pub col: i32,
    pub row: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booth_id: Option<String>,
}

impl CellSummary {
    pub fn of(grid: &Grid, region: &Region) -> Result<Self> {
        let cell = grid.cell(region.representative())?;
        Ok(Self {
            idx: cell.id,
            region: region.key.clone(),
            name: grid.region_name(region),
            cell_type: cell.cell_type.clone(),
            col: cell.col,
            row: cell.row,
            booth_id: region.booth_id().map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRoute {
    #[serde(flatten)]
    pub route: Route,
    pub target_info: CellSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreachableTarget {
    pub idx: CellId,
    pub region: RegionKey,
    pub reason: UnreachableReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_targets: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Routes from one source to many targets, with the targets that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRoutes {
    pub start_idx: CellId,
    pub start_cell: CellSummary,
    pub targets: BTreeMap<CellId, TargetRoute>,
    pub unreachable: Vec<UnreachableTarget>,
    pub statistics: BatchStatistics,
}

impl BatchRoutes {
    /// Conventional artifact name for a source cell.
    pub fn file_name(start: CellId) -> String {
        format!("{start}_to_all.json")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        snapshot::write_json(path, self)?;
        tracing::info!(path = %path.display(), targets = self.targets.len(), "route artifact written");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(snapshot::read_json(path)?)
    }

    /// Adds pixel waypoints to every stored route.
    pub fn with_pixels(mut self, meta: &GridMeta) -> Self {
        for target in self.targets.values_mut() {
            target.route = target.route.clone().with_pixels(meta);
        }
        self
    }
}

/// Landmark-eligible regions other than `start`, in key order.
pub fn eligible_targets<'g>(grid: &'g Grid, start: &Region) -> Vec<&'g Region> {
    grid.landmark_regions()
        .filter(|r| r.key != start.key)
        .collect()
}

/// Routes from `start` to each of `targets` (all eligible regions when
/// `None`). Unreachable targets are listed, never fatal.
pub fn precompute(
    router: &Router<'_>,
    start: &RegionKey,
    targets: Option<&[RegionKey]>,
) -> Result<BatchRoutes> {
    let grid = router.grid();
    let start = grid.region(start)?;
    let targets: Vec<&Region> = match targets {
        Some(keys) => keys
            .iter()
            .map(|k| grid.region(k))
            .collect::<expo_nav_grid::Result<_>>()?,
        None => eligible_targets(grid, start),
    };

    tracing::info!(start = %start.key, targets = targets.len(), "batch precompute started");
    let sources = router.anchors(start);
    if sources.is_none() {
        tracing::warn!(start = %start.key, "start region has no walkable neighbour");
    }

    let mut results: Vec<(&Region, RouteOutcome)> = targets
        .par_iter()
        .map(|target| {
            let outcome = match &sources {
                Some(anchors) => router.route_from(start, anchors, target),
                None => RouteOutcome::Unreachable {
                    reason: UnreachableReason::DegenerateRegion,
                },
            };
            (*target, outcome)
        })
        .collect();
    results.sort_by_key(|(region, _)| region.representative());

    let mut routes = BTreeMap::new();
    let mut unreachable = Vec::new();
    for (region, outcome) in results {
        match outcome {
            RouteOutcome::Found(route) => {
                routes.insert(
                    region.representative(),
                    TargetRoute {
                        route,
                        target_info: CellSummary::of(grid, region)?,
                    },
                );
            }
            RouteOutcome::Unreachable { reason } => {
                tracing::warn!(target = %region.key, %reason, "target unreachable");
                unreachable.push(UnreachableTarget {
                    idx: region.representative(),
                    region: region.key.clone(),
                    reason,
                });
            }
        }
    }

    let statistics = BatchStatistics {
        total_targets: routes.len() + unreachable.len(),
        successful: routes.len(),
        failed: unreachable.len(),
    };
    tracing::info!(
        successful = statistics.successful,
        failed = statistics.failed,
        "batch precompute finished"
    );

    Ok(BatchRoutes {
        start_idx: start.representative(),
        start_cell: CellSummary::of(grid, start)?,
        targets: routes,
        unreachable,
        statistics,
    })
}
