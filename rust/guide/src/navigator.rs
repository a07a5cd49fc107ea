// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route to directions, end to end.

use expo_nav_grid::{ExhibitorDirectory, Grid, Region, RegionKey};
use expo_nav_path::{BatchRoutes, Route};
use rayon::prelude::*;

use crate::analyzer::{analyze, Action, Destination, NavigationStep};
use crate::config::NavConfig;
use crate::document::{
    BatchNavigation, NavigationDocument, NavigationFailure, NavigationMetadata, RegionInfo,
};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::landmarks::{display_name, LandmarkIndex};

/// Produces directions for routes over one grid.
///
/// The landmark index is built once and shared by every route.
#[derive(Debug)]
pub struct Navigator<'g> {
    grid: &'g Grid,
    directory: Option<&'g ExhibitorDirectory>,
    config: NavConfig,
    landmarks: LandmarkIndex<'g>,
}

impl<'g> Navigator<'g> {
    pub fn new(
        grid: &'g Grid,
        directory: Option<&'g ExhibitorDirectory>,
        config: NavConfig,
    ) -> Result<Self> {
        config.validate()?;
        let landmarks = LandmarkIndex::build(grid, directory, &config.landmark_detection);
        Ok(Self {
            grid,
            directory,
            config,
            landmarks,
        })
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn landmarks(&self) -> &LandmarkIndex<'g> {
        &self.landmarks
    }

    pub fn region_info(&self, region: &Region) -> Result<RegionInfo> {
        let cell = self.grid.cell(region.representative())?;
        let exhibitors = region
            .booth_id()
            .and_then(|booth| self.directory.map(|d| d.exhibitors(booth).to_vec()))
            .unwrap_or_default();
        Ok(RegionInfo {
            region: region.key.clone(),
            idx: cell.id,
            name: display_name(self.grid, self.directory, region),
            cell_type: cell.cell_type.clone(),
            col: cell.col,
            row: cell.row,
            exhibitors,
        })
    }

    /// Analyzes `route` into steps. The start and target regions are never
    /// cited as landmarks along the way.
    pub fn steps(&self, route: &Route, start: &Region, target: &Region) -> Result<Vec<NavigationStep>> {
        if route.unit_path.is_empty() {
            return Err(Error::EmptyRoute);
        }
        let excluded: Vec<usize> = [&start.key, &target.key]
            .into_iter()
            .filter_map(|key| self.landmarks.find(key))
            .collect();
        let target_name = display_name(self.grid, self.directory, target);
        Ok(analyze(
            &route.unit_path,
            &self.landmarks,
            &excluded,
            Destination {
                region: target,
                name: &target_name,
            },
            &self.config,
        ))
    }

    /// Builds the full navigation document for `route`.
    pub fn navigate(
        &self,
        route: &Route,
        start: &RegionKey,
        target: &RegionKey,
    ) -> Result<NavigationDocument> {
        let start = self.grid.region(start)?;
        let target = self.grid.region(target)?;
        let steps = self.steps(route, start, target)?;
        let start_info = self.region_info(start)?;
        let target_info = self.region_info(target)?;

        let formatter = Formatter::new(&self.config.phrasing);
        let instructions: Vec<String> = steps
            .iter()
            .map(|step| formatter.instruction(step, &start_info.name))
            .collect();

        let total_distance_units: f64 = steps
            .iter()
            .filter(|s| s.action == Action::Continue)
            .map(|s| s.distance)
            .fold(0.0, |acc, d| acc + d);
        let metadata = NavigationMetadata {
            total_distance_units,
            estimated_booths: formatter.estimated_booths(total_distance_units),
            total_steps: steps.len(),
            turn_count: steps.iter().filter(|s| s.action.is_turn()).count(),
            coverage_fallback_used: steps.iter().any(|s| s.coverage_fallback_used),
        };
        if metadata.coverage_fallback_used {
            tracing::warn!(start = %start.key, target = %target.key, "directions use front fallback");
        }

        Ok(NavigationDocument {
            start: start_info,
            target: target_info,
            steps,
            instructions,
            metadata,
        })
    }

    /// Directions for every route of a precomputed artifact. Targets that
    /// fail are collected, never fatal.
    pub fn navigate_batch(&self, batch: &BatchRoutes) -> BatchNavigation {
        let start = &batch.start_cell.region;
        let results: Vec<_> = batch
            .targets
            .par_iter()
            .map(|(idx, target)| {
                let document = self.navigate(&target.route, start, &target.target_info.region);
                (*idx, document.map_err(|e| e.to_string()))
            })
            .collect();

        let mut navigation = BatchNavigation {
            start_idx: batch.start_idx,
            documents: Default::default(),
            failures: Vec::new(),
        };
        for (idx, result) in results {
            match result {
                Ok(document) => {
                    navigation.documents.insert(idx, document);
                }
                Err(error) => {
                    tracing::warn!(target = %idx, %error, "navigation failed");
                    navigation.failures.push(NavigationFailure { idx, error });
                }
            }
        }
        tracing::info!(
            documents = navigation.documents.len(),
            failures = navigation.failures.len(),
            "batch navigation finished"
        );
        navigation
    }
}
