// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Landmark candidates and their display names.

use expo_nav_grid::{is_meaningful_name, ExhibitorDirectory, Grid, Region, RegionKey, Unit};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::LandmarkDetection;
use crate::geometry::Side;

/// A landmark as cited in a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRef {
    pub region: RegionKey,
    pub name: String,
    pub side: Side,
    /// Share of the step over which this landmark is the reference on its side.
    pub coverage: f64,
}

/// One citable region.
#[derive(Debug, Clone)]
pub struct Candidate<'g> {
    pub region: &'g Region,
    pub name: String,
    pub centroid: (f64, f64),
}

/// Citable regions with a unit lookup for neighbourhood scans.
#[derive(Debug, Clone)]
pub struct LandmarkIndex<'g> {
    candidates: Vec<Candidate<'g>>,
    by_unit: FxHashMap<Unit, usize>,
}

impl<'g> LandmarkIndex<'g> {
    /// Collects every landmark-eligible, citable region, in region key order.
    pub fn build(
        grid: &'g Grid,
        directory: Option<&ExhibitorDirectory>,
        config: &LandmarkDetection,
    ) -> Self {
        let mut candidates = Vec::new();
        let mut by_unit = FxHashMap::default();
        for region in grid.landmark_regions() {
            if !grid.is_citable(region, directory, config.require_meaningful_name) {
                continue;
            }
            let index = candidates.len();
            for unit in &region.units {
                by_unit.insert(*unit, index);
            }
            candidates.push(Candidate {
                region,
                name: display_name(grid, directory, region),
                centroid: region.centroid(),
            });
        }
        tracing::debug!(candidates = candidates.len(), "landmark index built");
        Self {
            candidates,
            by_unit,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> &Candidate<'g> {
        &self.candidates[index]
    }

    /// Candidate units within Chebyshev `radius` of `center`, row-major.
    pub fn near(&self, center: Unit, radius: i32) -> impl Iterator<Item = (Unit, usize)> + '_ {
        (-radius..=radius).flat_map(move |dr| {
            (-radius..=radius).filter_map(move |dc| {
                let unit = center.offset(dc, dr);
                self.by_unit.get(&unit).map(|&i| (unit, i))
            })
        })
    }

    /// Index of the candidate for `key`, if that region is citable.
    pub fn find(&self, key: &RegionKey) -> Option<usize> {
        self.candidates.iter().position(|c| &c.region.key == key)
    }

    /// Candidate covering `unit`, if any.
    pub fn at(&self, unit: Unit) -> Option<usize> {
        self.by_unit.get(&unit).copied()
    }

    pub fn reference(&self, index: usize, side: Side, coverage: f64) -> LandmarkRef {
        let candidate = self.get(index);
        LandmarkRef {
            region: candidate.region.key.clone(),
            name: candidate.name.clone(),
            side,
            coverage,
        }
    }
}

/// Display name of a region for directions.
///
/// One listed exhibitor replaces the region name; several are rendered as
/// `Region: A | B`. Without a listing, the plan name is used.
pub fn display_name(grid: &Grid, directory: Option<&ExhibitorDirectory>, region: &Region) -> String {
    let region_name = grid.region_name(region);
    let exhibitors: Vec<&str> = region
        .booth_id()
        .and_then(|booth| directory.map(|d| d.exhibitors(booth)))
        .unwrap_or(&[])
        .iter()
        .map(|e| e.name.trim())
        .filter(|name| is_meaningful_name(name))
        .collect();
    match exhibitors.as_slice() {
        [] => region_name,
        [single] => single.to_string(),
        many => format!("{region_name}: {}", many.join(" | ")),
    }
}
