// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dense walkability and cost matrix over the grid's unit bounds.
//!
//! The matrix is derived from a [`Grid`] and the area options, then only
//! read. Many searches may share one matrix as long as the grid does not
//! change; [`CostMatrix::check`] enforces that through the grid fingerprint.

use expo_nav_grid::{CellId, Grid, Unit};

use crate::error::{Error, Result};
use crate::options::PathOptions;

#[derive(Debug, Clone)]
pub struct CostMatrix {
    min_col: i32,
    min_row: i32,
    width: usize,
    height: usize,
    walkable: Vec<bool>,
    cost: Vec<f64>,
    cells: Vec<Option<CellId>>,
    min_cost: f64,
    fingerprint: u64,
    large_areas: bool,
}

impl CostMatrix {
    /// Expands every cell over the units it covers.
    ///
    /// Units no cell covers are open floor: walkable at cost 1.0 with no
    /// cell identifier. Obstacles are written last so that the large-area
    /// override can never open a true obstacle.
    pub fn build(grid: &Grid, options: &PathOptions) -> Self {
        let bounds = grid.bounds();
        let width = bounds.width();
        let height = bounds.height();
        let size = width * height;
        let mut matrix = Self {
            min_col: bounds.min_col,
            min_row: bounds.min_row,
            width,
            height,
            walkable: vec![true; size],
            cost: vec![1.0; size],
            cells: vec![None; size],
            min_cost: f64::INFINITY,
            fingerprint: grid.fingerprint(),
            large_areas: options.allow_enter_large_area,
        };

        let mut obstacles = Vec::new();
        for cell in grid.cells() {
            let info = grid.type_of(cell);
            let (walkable, cost) = if info.is_walkable {
                (true, info.cost_multiplier())
            } else if info.large_area && options.allow_enter_large_area {
                (true, info.cost_multiplier().max(options.large_area_cost))
            } else {
                obstacles.push(cell);
                continue;
            };
            for unit in cell.units() {
                if let Some(i) = matrix.index(unit) {
                    matrix.walkable[i] = walkable;
                    matrix.cost[i] = cost;
                    matrix.cells[i] = Some(cell.id);
                }
            }
        }

        for cell in obstacles {
            for unit in cell.units() {
                if let Some(i) = matrix.index(unit) {
                    matrix.walkable[i] = false;
                    matrix.cells[i] = Some(cell.id);
                }
            }
        }

        matrix.min_cost = matrix
            .walkable
            .iter()
            .zip(&matrix.cost)
            .filter(|(w, _)| **w)
            .map(|(_, c)| *c)
            .fold(f64::INFINITY, f64::min);
        if !matrix.min_cost.is_finite() {
            matrix.min_cost = 1.0;
        }

        tracing::debug!(
            width,
            height,
            walkable = matrix.walkable.iter().filter(|w| **w).count(),
            min_cost = matrix.min_cost,
            large_areas = matrix.large_areas,
            "cost matrix built"
        );
        matrix
    }

    /// Fails unless this matrix was built from `grid` with the area policy
    /// of `options`.
    pub fn check(&self, grid: &Grid, options: &PathOptions) -> Result<()> {
        if self.fingerprint != grid.fingerprint() {
            return Err(Error::StaleMatrix {
                built: self.fingerprint,
                current: grid.fingerprint(),
            });
        }
        if self.large_areas != options.allow_enter_large_area {
            return Err(Error::InvalidOption {
                name: "allow_enter_large_area",
                reason: "differs from the value the cost matrix was built with".into(),
            });
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of units in the matrix.
    pub fn len(&self) -> usize {
        self.walkable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walkable.is_empty()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Smallest cost multiplier of any walkable unit.
    pub fn min_cost(&self) -> f64 {
        self.min_cost
    }

    pub fn in_bounds(&self, unit: Unit) -> bool {
        self.index(unit).is_some()
    }

    pub fn index(&self, unit: Unit) -> Option<usize> {
        let c = unit.col - self.min_col;
        let r = unit.row - self.min_row;
        if c < 0 || r < 0 || c as usize >= self.width || r as usize >= self.height {
            return None;
        }
        Some(r as usize * self.width + c as usize)
    }

    pub fn unit(&self, index: usize) -> Unit {
        Unit::new(
            self.min_col + (index % self.width) as i32,
            self.min_row + (index / self.width) as i32,
        )
    }

    /// Out-of-bounds units are never walkable.
    pub fn is_walkable(&self, unit: Unit) -> bool {
        self.index(unit).map(|i| self.walkable[i]).unwrap_or(false)
    }

    /// Cost multiplier of a walkable unit.
    pub fn cost(&self, unit: Unit) -> Option<f64> {
        self.index(unit)
            .filter(|&i| self.walkable[i])
            .map(|i| self.cost[i])
    }

    /// Cell covering `unit`, if any.
    pub fn cell_at(&self, unit: Unit) -> Option<CellId> {
        self.index(unit).and_then(|i| self.cells[i])
    }
}
