// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-source, multi-target A* over a [`CostMatrix`].
//!
//! Every source is seeded at cost zero and every target is an equally valid
//! goal; the search stops at the first goal popped from the open set. When a
//! turn weight is set, the state is `(unit, incoming direction)` so that the
//! penalty takes part in optimality instead of being added afterwards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use expo_nav_grid::Unit;
use rustc_hash::FxHashSet;

use crate::matrix::CostMatrix;
use crate::options::PathOptions;

/// Movement directions in successor order: orthogonals, then diagonals.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Direction slot used for seeded states that have not moved yet.
const NO_DIRECTION: usize = 8;
const DIRECTION_SLOTS: usize = 9;
const NO_PARENT: usize = usize::MAX;

/// States per unit: one per incoming direction when turns are weighted,
/// otherwise a single one.
fn state_slots(options: &PathOptions) -> usize {
    if options.turn_weight > 0.0 {
        DIRECTION_SLOTS
    } else {
        1
    }
}

/// A path found by [`search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    pub units: Vec<Unit>,
    /// Accumulated step costs including turn penalties.
    pub cost: f64,
    pub expansions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// The open set ran dry.
    Exhausted,
    /// The expansion bound was hit first.
    ExpansionLimit,
}

/// Open-set entry, ordered as a min-heap on `(f, h, seq)`.
#[derive(Debug, Clone, Copy)]
struct OpenState {
    f: f64,
    h: f64,
    seq: u64,
    state: usize,
}

impl PartialEq for OpenState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenState {}

impl PartialOrd for OpenState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Admissible distance estimate to the nearest goal.
struct Heuristic<'a> {
    goals: &'a [Unit],
    diagonal: bool,
    scale: f64,
}

impl Heuristic<'_> {
    fn estimate(&self, unit: Unit) -> f64 {
        self.goals
            .iter()
            .map(|g| {
                let dx = (unit.col - g.col).abs() as f64;
                let dy = (unit.row - g.row).abs() as f64;
                if self.diagonal {
                    // Octile distance
                    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
                } else {
                    dx + dy
                }
            })
            .fold(f64::INFINITY, f64::min)
            * self.scale
    }
}

/// Runs the search from `sources` to any of `targets`.
pub fn search(
    matrix: &CostMatrix,
    sources: &[Unit],
    targets: &[Unit],
    options: &PathOptions,
) -> Result<SearchPath, SearchFailure> {
    let directions: &[(i32, i32)] = if options.allow_diagonal {
        &DIRECTIONS
    } else {
        &DIRECTIONS[..4]
    };
    let slots = state_slots(options);
    let track_turns = slots == DIRECTION_SLOTS;
    let start_slot = if track_turns { NO_DIRECTION } else { 0 };
    let heuristic = Heuristic {
        goals: targets,
        diagonal: options.allow_diagonal,
        scale: matrix.min_cost(),
    };
    let goal_set: FxHashSet<Unit> = targets.iter().copied().collect();

    let state_count = matrix.len() * slots;
    let mut g_score = vec![f64::INFINITY; state_count];
    let mut parent = vec![NO_PARENT; state_count];
    let mut closed = vec![false; state_count];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    for &source in sources {
        let Some(index) = matrix.index(source) else {
            continue;
        };
        if !matrix.is_walkable(source) {
            continue;
        }
        let state = index * slots + start_slot;
        if g_score[state] == 0.0 {
            continue;
        }
        g_score[state] = 0.0;
        let h = heuristic.estimate(source);
        open.push(OpenState { f: h, h, seq, state });
        seq += 1;
    }

    let mut expansions = 0usize;
    while let Some(OpenState { state, .. }) = open.pop() {
        if closed[state] {
            continue;
        }
        closed[state] = true;

        let index = state / slots;
        let incoming = state % slots;
        let unit = matrix.unit(index);

        if goal_set.contains(&unit) {
            return Ok(SearchPath {
                units: reconstruct(matrix, &parent, state, slots),
                cost: g_score[state],
                expansions,
            });
        }

        expansions += 1;
        if options.max_expansions.is_some_and(|max| expansions > max) {
            tracing::debug!(expansions, "search hit expansion limit");
            return Err(SearchFailure::ExpansionLimit);
        }

        for (slot, &(dc, dr)) in directions.iter().enumerate() {
            let next = unit.offset(dc, dr);
            let Some(step_cost) = matrix.cost(next) else {
                continue;
            };
            let diagonal = dc != 0 && dr != 0;
            if diagonal
                && !matrix.is_walkable(unit.offset(dc, 0))
                && !matrix.is_walkable(unit.offset(0, dr))
            {
                // Corner cutting
                continue;
            }

            let mut tentative = g_score[state] + step_cost * if diagonal { SQRT_2 } else { 1.0 };
            if track_turns && incoming != NO_DIRECTION && incoming != slot {
                tentative += options.turn_weight;
            }

            let Some(next_index) = matrix.index(next) else {
                continue;
            };
            let next_slot = if track_turns { slot } else { 0 };
            let next_state = next_index * slots + next_slot;
            if closed[next_state] || tentative >= g_score[next_state] {
                continue;
            }
            g_score[next_state] = tentative;
            parent[next_state] = state;
            let h = heuristic.estimate(next);
            open.push(OpenState {
                f: tentative + h,
                h,
                seq,
                state: next_state,
            });
            seq += 1;
        }
    }

    Err(SearchFailure::Exhausted)
}

fn reconstruct(matrix: &CostMatrix, parent: &[usize], goal: usize, slots: usize) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut state = goal;
    loop {
        units.push(matrix.unit(state / slots));
        let previous = parent[state];
        if previous == NO_PARENT {
            break;
        }
        state = previous;
    }
    units.reverse();
    units
}
