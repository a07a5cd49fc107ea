// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routes between regions.

use expo_nav_grid::{CellId, Grid, GridMeta, Region, RegionKey, Unit};
use serde::{Deserialize, Serialize};

use crate::anchors::{resolve_anchors, Anchors};
use crate::error::Result;
use crate::matrix::CostMatrix;
use crate::options::PathOptions;
use crate::search::{search, SearchFailure};

/// A found route, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Semantic path: cell identifiers from start region to target region.
    pub route: Vec<CellId>,
    /// Geometric path: one entry per unit visited.
    pub unit_path: Vec<Unit>,
    /// Number of moves.
    pub steps: usize,
    /// Euclidean length in units.
    pub length: f64,
    /// Search cost, turn penalties included.
    pub total_cost: f64,
    /// Pixel-space waypoints (unit centres), when exported for drawing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_path: Option<Vec<[f64; 2]>>,
}

impl Route {
    /// Attaches pixel-space waypoints computed from `meta`.
    pub fn with_pixels(mut self, meta: &GridMeta) -> Self {
        self.pixel_path = Some(
            self.unit_path
                .iter()
                .map(|u| {
                    let (x, y) = meta.unit_center(*u);
                    [x, y]
                })
                .collect(),
        );
        self
    }
}

/// Why a target could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    /// Source and target anchors are not connected.
    Disconnected,
    /// A region has no walkable unit within the anchor search radius.
    DegenerateRegion,
    /// The search exceeded its expansion bound.
    ExpansionLimit,
}

impl std::fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            UnreachableReason::Disconnected => "no connecting walkable path",
            UnreachableReason::DegenerateRegion => "no walkable unit near region",
            UnreachableReason::ExpansionLimit => "search expansion limit reached",
        };
        f.write_str(text)
    }
}

/// Result of one route query. Unreachable targets are ordinary values.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    Unreachable { reason: UnreachableReason },
}

impl RouteOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::Unreachable { .. } => None,
        }
    }

    pub fn into_route(self) -> Option<Route> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::Unreachable { .. } => None,
        }
    }
}

/// Routes over one grid with one shared, read-only cost matrix.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    grid: &'a Grid,
    matrix: &'a CostMatrix,
    options: &'a PathOptions,
}

impl<'a> Router<'a> {
    /// Fails if `matrix` was not built from `grid` with these options.
    pub fn new(grid: &'a Grid, matrix: &'a CostMatrix, options: &'a PathOptions) -> Result<Self> {
        options.validate()?;
        matrix.check(grid, options)?;
        Ok(Self {
            grid,
            matrix,
            options,
        })
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn matrix(&self) -> &'a CostMatrix {
        self.matrix
    }

    pub fn options(&self) -> &'a PathOptions {
        self.options
    }

    pub fn anchors(&self, region: &Region) -> Option<Anchors> {
        resolve_anchors(self.matrix, region, self.options.anchor_search_radius)
    }

    /// Routes between two region references.
    ///
    /// Unknown identifiers are errors; everything else is an outcome.
    pub fn route(&self, start: &RegionKey, target: &RegionKey) -> Result<RouteOutcome> {
        let start = self.grid.region(start)?;
        let target = self.grid.region(target)?;
        Ok(self.route_between(start, target))
    }

    pub fn route_between(&self, start: &Region, target: &Region) -> RouteOutcome {
        match self.anchors(start) {
            Some(sources) => self.route_from(start, &sources, target),
            None => RouteOutcome::Unreachable {
                reason: UnreachableReason::DegenerateRegion,
            },
        }
    }

    /// Routes from already resolved source anchors; used by the batch
    /// precompute to resolve the source once.
    pub fn route_from(&self, start: &Region, sources: &Anchors, target: &Region) -> RouteOutcome {
        let Some(goals) = self.anchors(target) else {
            return RouteOutcome::Unreachable {
                reason: UnreachableReason::DegenerateRegion,
            };
        };

        match search(self.matrix, &sources.units, &goals.units, self.options) {
            Ok(path) => {
                tracing::debug!(
                    start = %start.key,
                    target = %target.key,
                    steps = path.units.len().saturating_sub(1),
                    cost = path.cost,
                    expansions = path.expansions,
                    "route found"
                );
                RouteOutcome::Found(self.assemble(start, target, path.units, path.cost))
            }
            Err(failure) => {
                let reason = match failure {
                    SearchFailure::Exhausted => UnreachableReason::Disconnected,
                    SearchFailure::ExpansionLimit => UnreachableReason::ExpansionLimit,
                };
                tracing::debug!(start = %start.key, target = %target.key, %reason, "target unreachable");
                RouteOutcome::Unreachable { reason }
            }
        }
    }

    fn assemble(&self, start: &Region, target: &Region, units: Vec<Unit>, cost: f64) -> Route {
        let mut route: Vec<CellId> = Vec::with_capacity(units.len() + 2);
        for unit in &units {
            if let Some(id) = self.matrix.cell_at(*unit) {
                if route.last() != Some(&id) {
                    route.push(id);
                }
            }
        }
        if !route.first().is_some_and(|id| start.contains_cell(*id)) {
            route.insert(0, start.representative());
        }
        if !route.last().is_some_and(|id| target.contains_cell(*id)) {
            route.push(target.representative());
        }

        let length = units
            .windows(2)
            .map(|w| w[0].euclidean(w[1]))
            .fold(0.0, |acc, d| acc + d);
        Route {
            route,
            steps: units.len().saturating_sub(1),
            unit_path: units,
            length,
            total_cost: cost,
            pixel_path: None,
        }
    }
}

/// One-shot convenience: builds the matrix and routes once.
pub fn find_route(
    grid: &Grid,
    start: &RegionKey,
    target: &RegionKey,
    options: &PathOptions,
) -> Result<RouteOutcome> {
    let matrix = CostMatrix::build(grid, options);
    Router::new(grid, &matrix, options)?.route(start, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use expo_nav_grid::{Cell, TypeInfo, TypeMetadata};

    fn types() -> TypeMetadata {
        TypeMetadata::new()
            .with("road", TypeInfo::walkable(1.0))
            .with("wall", TypeInfo::obstacle())
            .with("booth", TypeInfo::obstacle().landmark())
    }

    #[test]
    fn semantic_route_brackets_with_regions() {
        // row 0: [S] road road road [T]
        let cells = vec![
            Cell::new(1, 0, 0, 1, 1, "booth").with_booth("S"),
            Cell::new(2, 1, 0, 2, 1, "road"),
            Cell::new(3, 3, 0, 1, 1, "road"),
            Cell::new(4, 4, 0, 1, 1, "booth").with_booth("T"),
        ];
        let grid = Grid::build(cells, types()).unwrap();
        let outcome = find_route(
            &grid,
            &RegionKey::Booth("S".into()),
            &RegionKey::Booth("T".into()),
            &PathOptions::default(),
        )
        .unwrap();

        let route = outcome.route().unwrap();
        assert_eq!(route.route, vec![CellId(1), CellId(2), CellId(3), CellId(4)]);
        assert_eq!(
            route.unit_path,
            vec![Unit::new(1, 0), Unit::new(2, 0), Unit::new(3, 0)]
        );
        assert_eq!(route.steps, 2);
        assert_relative_eq!(route.length, 2.0);
    }

    #[test]
    fn disconnected_target_is_an_outcome() {
        let cells = vec![
            Cell::new(1, 0, 0, 1, 1, "road"),
            Cell::new(2, 1, 0, 1, 1, "wall"),
            Cell::new(3, 2, 0, 1, 1, "road"),
        ];
        let grid = Grid::build(cells, types()).unwrap();
        let outcome = find_route(
            &grid,
            &RegionKey::Cell(CellId(1)),
            &RegionKey::Cell(CellId(3)),
            &PathOptions::default(),
        )
        .unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Unreachable {
                reason: UnreachableReason::Disconnected
            }
        );
    }

    #[test]
    fn unknown_region_is_an_error() {
        let grid = Grid::build(vec![Cell::new(1, 0, 0, 1, 1, "road")], types()).unwrap();
        let result = find_route(
            &grid,
            &RegionKey::Cell(CellId(1)),
            &RegionKey::Booth("nope".into()),
            &PathOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn pixel_waypoints_use_unit_centres() {
        let route = Route {
            route: vec![CellId(1)],
            unit_path: vec![Unit::new(1, 2)],
            steps: 0,
            length: 0.0,
            total_cost: 0.0,
            pixel_path: None,
        }
        .with_pixels(&GridMeta::default());
        assert_eq!(route.pixel_path, Some(vec![[279.0, 465.0]]));
    }
}
