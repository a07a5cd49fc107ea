// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region to search-anchor resolution.
//!
//! Two stages, kept out of the search loop:
//! 1. region → the units it occupies;
//! 2. those units → every walkable unit at the minimum 8-connected
//!    distance from any of them.
//!
//! A booth with entrances on two sides therefore yields anchors on both
//! sides, and the search decides which one is cheaper.

use std::collections::VecDeque;

use expo_nav_grid::{Region, Unit};
use serde::{Deserialize, Serialize};

use crate::matrix::CostMatrix;

const NEIGHBORS_8: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Walkable units standing in for a region in a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchors {
    /// Row-major, never empty.
    pub units: Vec<Unit>,
    /// BFS distance from the region; 0 when the region itself is walkable.
    pub distance: u32,
}

/// Resolves `region` to its nearest walkable units within `radius`.
///
/// Returns `None` for a degenerate region with no walkable unit in reach.
pub fn resolve_anchors(matrix: &CostMatrix, region: &Region, radius: u32) -> Option<Anchors> {
    let occupied: Vec<Unit> = region
        .units
        .iter()
        .copied()
        .filter(|u| matrix.in_bounds(*u))
        .collect();

    let inside: Vec<Unit> = occupied
        .iter()
        .copied()
        .filter(|u| matrix.is_walkable(*u))
        .collect();
    if !inside.is_empty() {
        return Some(Anchors {
            units: inside,
            distance: 0,
        });
    }

    let mut seen = vec![false; matrix.len()];
    let mut frontier = VecDeque::new();
    for unit in &occupied {
        if let Some(i) = matrix.index(*unit) {
            seen[i] = true;
            frontier.push_back(*unit);
        }
    }

    // Level-synchronous BFS: stop at the first level that reaches floor.
    for distance in 1..=radius {
        let mut next = VecDeque::new();
        let mut found = Vec::new();
        while let Some(unit) = frontier.pop_front() {
            for (dc, dr) in NEIGHBORS_8 {
                let n = unit.offset(dc, dr);
                let Some(i) = matrix.index(n) else {
                    continue;
                };
                if seen[i] {
                    continue;
                }
                seen[i] = true;
                if matrix.is_walkable(n) {
                    found.push(n);
                } else {
                    next.push_back(n);
                }
            }
        }
        if !found.is_empty() {
            found.sort();
            tracing::trace!(region = %region.key, distance, anchors = found.len(), "anchors resolved");
            return Some(Anchors {
                units: found,
                distance,
            });
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    tracing::warn!(region = %region.key, radius, "no walkable unit near region");
    None
}
