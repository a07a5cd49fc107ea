// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route analysis: from a geometric path to navigation steps.
//!
//! The path is cut into straight runs. Each run's heading is its first move;
//! later moves stay in the run while their angle to that heading is below
//! the turn tolerance, which absorbs the zig-zag of grid discretisation.
//! Between runs a turn step is emitted, left or right by the sign of the
//! cross product of the two headings.

use expo_nav_grid::{Region, Unit};
use serde::{Deserialize, Serialize};

use crate::config::NavConfig;
use crate::coverage::{observe, select};
use crate::geometry::{classify, Compass, PlaneVector, Side, Vec2};
use crate::landmarks::{LandmarkIndex, LandmarkRef};

/// A maximal straight stretch of the path.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Index of the first unit in the path.
    pub start: usize,
    /// Index of the last unit in the path (inclusive).
    pub end: usize,
    pub heading: Vec2,
    /// Walking length: sum of the Euclidean move lengths.
    pub distance: f64,
}

impl Run {
    pub fn positions(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Splits `path` into straight runs.
pub fn segment(path: &[Unit], turn_tolerance_deg: f64) -> Vec<Run> {
    let mut runs = Vec::new();
    if path.len() < 2 {
        return runs;
    }

    let mut current = Run {
        start: 0,
        end: 1,
        heading: Vec2::between(path[0], path[1]),
        distance: path[0].euclidean(path[1]),
    };
    for k in 1..path.len() - 1 {
        let step = Vec2::between(path[k], path[k + 1]);
        let angle = current.heading.angle_to(&step).unwrap_or(0.0);
        if angle < turn_tolerance_deg {
            current.end = k + 1;
            current.distance += path[k].euclidean(path[k + 1]);
        } else {
            runs.push(current);
            current = Run {
                start: k,
                end: k + 1,
                heading: step,
                distance: path[k].euclidean(path[k + 1]),
            };
        }
    }
    runs.push(current);
    runs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Orient,
    Continue,
    TurnLeft,
    TurnRight,
    Arrive,
}

impl Action {
    pub fn is_turn(self) -> bool {
        matches!(self, Action::TurnLeft | Action::TurnRight)
    }
}

/// One step of the directions, in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStep {
    pub action: Action,
    /// Walking distance in units; zero for point steps.
    pub distance: f64,
    /// Compass heading after this step begins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Compass>,
    /// Side of the presented landmarks, or of the target when arriving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Selected landmark sequence, in the order a walker meets it.
    pub landmarks: Vec<LandmarkRef>,
    #[serde(default)]
    pub coverage_fallback_used: bool,
    /// First and last path index this step describes.
    pub path_range: [usize; 2],
}

impl NavigationStep {
    fn point(action: Action, at: usize) -> Self {
        Self {
            action,
            distance: 0.0,
            heading: None,
            side: None,
            landmarks: Vec::new(),
            coverage_fallback_used: false,
            path_range: [at, at],
        }
    }

    /// Number of booths a sentence about this step may state.
    pub fn booth_count(&self) -> usize {
        self.landmarks.len()
    }
}

/// What the analyzer needs to know about the destination.
#[derive(Debug, Clone, Copy)]
pub struct Destination<'a> {
    pub region: &'a Region,
    pub name: &'a str,
}

/// Turns a geometric path into orient, continue, turn and arrive steps.
///
/// `excluded` lists landmark candidates never to cite (the start and target
/// regions).
pub fn analyze(
    path: &[Unit],
    index: &LandmarkIndex<'_>,
    excluded: &[usize],
    destination: Destination<'_>,
    config: &NavConfig,
) -> Vec<NavigationStep> {
    let sides = &config.side_calculation;
    let runs = segment(path, sides.turn_tolerance_deg);
    let mut steps = Vec::with_capacity(runs.len() * 2 + 2);

    // A zero-length route still names where it starts.
    let mut orient = NavigationStep::point(Action::Orient, 0);
    if let (Some(first), Some(&origin)) = (runs.first(), path.first()) {
        orient.heading = Compass::from_vec(first.heading);
        if let Some(c) = front_landmark(index, origin, first.heading, excluded, config) {
            orient.side = Some(Side::Front);
            orient.landmarks.push(index.reference(c, Side::Front, 1.0));
        }
    }
    steps.push(orient);

    for (i, run) in runs.iter().enumerate() {
        if i > 0 {
            let incoming = runs[i - 1].heading;
            let action = if incoming.perp(&run.heading) > 0.0 {
                Action::TurnRight
            } else {
                Action::TurnLeft
            };
            let mut turn = NavigationStep::point(action, run.start);
            turn.heading = Compass::from_vec(run.heading);
            let turn_side = if action == Action::TurnRight {
                Side::Right
            } else {
                Side::Left
            };
            if let Some((c, side)) =
                turn_landmark(index, path[run.start], incoming, turn_side, excluded, config)
            {
                turn.side = Some(side);
                turn.landmarks.push(index.reference(c, side, 1.0));
            }
            steps.push(turn);
        }

        let positions = &path[run.start..=run.end];
        let observations = observe(index, positions, run.heading, config, excluded);
        let selection = select(
            index,
            &observations,
            positions.len(),
            run.distance,
            path[run.start],
            run.heading,
            config,
        );
        if selection.fallback_used {
            tracing::debug!(run = i, "front fallback used");
        }
        steps.push(NavigationStep {
            action: Action::Continue,
            distance: run.distance,
            heading: Compass::from_vec(run.heading),
            side: selection.side,
            landmarks: selection.references(index),
            coverage_fallback_used: selection.fallback_used,
            path_range: [run.start, run.end],
        });
    }

    let last = path.len().saturating_sub(1);
    let mut arrive = NavigationStep::point(Action::Arrive, last);
    if let (Some(run), Some(&end)) = (runs.last(), path.last()) {
        let side = if destination.region.contains(end) {
            Side::Crossing
        } else {
            let offset = Vec2::to_point(end, destination.region.centroid());
            classify(run.heading, offset, sides.near_front_threshold)
                .unwrap_or(sides.ambiguous_side)
        };
        arrive.side = Some(side);
        arrive.heading = Compass::from_vec(run.heading);
    }
    arrive.landmarks.push(LandmarkRef {
        region: destination.region.key.clone(),
        name: destination.name.to_string(),
        side: arrive.side.unwrap_or(sides.ambiguous_side),
        coverage: 1.0,
    });
    steps.push(arrive);
    steps
}

/// Nearest candidate whose centroid lies in the narrow forward cone.
fn front_landmark(
    index: &LandmarkIndex<'_>,
    origin: Unit,
    heading: Vec2,
    excluded: &[usize],
    config: &NavConfig,
) -> Option<usize> {
    let radius = config.landmark_detection.search_radius as i32;
    let cone = config.side_calculation.front_angle_threshold;
    let mut best: Option<(f64, usize)> = None;
    for (_, c) in index.near(origin, radius) {
        if excluded.contains(&c) {
            continue;
        }
        let offset = Vec2::to_point(origin, index.get(c).centroid);
        if classify(heading, offset, cone) != Some(Side::Front) {
            continue;
        }
        let d = offset.norm();
        if best.map_or(true, |(bd, bc)| d < bd || (d == bd && c < bc)) {
            best = Some((d, c));
        }
    }
    best.map(|(_, c)| c)
}

/// Landmark to mention at a turn: ahead first, then on the turn side, then
/// the nearest of the rest.
fn turn_landmark(
    index: &LandmarkIndex<'_>,
    at: Unit,
    incoming: Vec2,
    turn_side: Side,
    excluded: &[usize],
    config: &NavConfig,
) -> Option<(usize, Side)> {
    let radius = config.landmark_detection.turn_search_radius as i32;
    let cone = config.side_calculation.near_front_threshold;
    let fallback = config.side_calculation.ambiguous_side;
    let mut best: Option<(u8, f64, usize, Side)> = None;
    for (_, c) in index.near(at, radius) {
        if excluded.contains(&c) {
            continue;
        }
        let offset = Vec2::to_point(at, index.get(c).centroid);
        let side = if index.get(c).region.contains(at) {
            Side::Crossing
        } else {
            classify(incoming, offset, cone).unwrap_or(fallback)
        };
        let rank = match side {
            Side::Front => 0,
            s if s == turn_side => 1,
            _ => 2,
        };
        let d = offset.norm();
        let better = match best {
            None => true,
            Some((br, bd, bc, _)) => (rank, d, c) < (br, bd, bc),
        };
        if better {
            best = Some((rank, d, c, side));
        }
    }
    best.map(|(_, _, c, side)| (c, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use expo_nav_grid::{Cell, Grid, RegionKey, TypeInfo, TypeMetadata};

    fn units(points: &[(i32, i32)]) -> Vec<Unit> {
        points.iter().map(|&p| Unit::from(p)).collect()
    }

    #[test]
    fn straight_path_is_one_run() {
        let path = units(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let runs = segment(&path, 50.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].positions(), 4);
        assert_relative_eq!(runs[0].distance, 3.0);
    }

    #[test]
    fn right_angle_splits_runs() {
        // East then south: a right turn with rows growing downward.
        let path = units(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]);
        let runs = segment(&path, 50.0);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (0, 2));
        assert_eq!((runs[1].start, runs[1].end), (2, 4));
        assert!(runs[0].heading.perp(&runs[1].heading) > 0.0);
    }

    #[test]
    fn diagonal_jitter_is_not_a_turn() {
        let path = units(&[(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]);
        let runs = segment(&path, 50.0);
        assert_eq!(runs.len(), 1);
        let expected = 2.0 + 2.0 * std::f64::consts::SQRT_2;
        assert_relative_eq!(runs[0].distance, expected);
    }

    #[test]
    fn single_unit_path_has_no_runs() {
        assert!(segment(&units(&[(3, 3)]), 50.0).is_empty());
    }

    /// Road east along row 0 from col 3, then south down col 4. The kiosk at
    /// (2, 0) sits straight behind a walker heading east.
    fn junction() -> Grid {
        let types = TypeMetadata::new()
            .with("road", TypeInfo::walkable(1.0))
            .with("booth", TypeInfo::obstacle().landmark());
        let cells = vec![
            Cell::new(1, 3, 0, 2, 1, "road"),
            Cell::new(2, 4, 1, 1, 2, "road"),
            Cell::new(3, 2, 0, 1, 1, "booth").with_booth("K").with_name("Kiosk"),
            Cell::new(4, 4, 3, 1, 1, "booth").with_booth("T").with_name("Target"),
        ];
        Grid::build(cells, types).unwrap()
    }

    fn with_ambiguous(side: Side) -> NavConfig {
        let mut config = NavConfig::default();
        config.side_calculation.ambiguous_side = side;
        config
    }

    #[test]
    fn landmark_behind_a_turn_takes_the_ambiguous_side() {
        let grid = junction();
        let target = grid.region(&RegionKey::Booth("T".into())).unwrap();
        let path = units(&[(3, 0), (4, 0), (4, 1), (4, 2)]);

        let turn_side = |side: Side| {
            let config = with_ambiguous(side);
            let index = LandmarkIndex::build(&grid, None, &config.landmark_detection);
            let excluded: Vec<usize> = index.find(&target.key).into_iter().collect();
            let destination = Destination {
                region: target,
                name: "Target",
            };
            let steps = analyze(&path, &index, &excluded, destination, &config);
            let turn = steps.iter().find(|s| s.action.is_turn()).cloned().unwrap();
            assert_eq!(turn.action, Action::TurnRight);
            assert_eq!(turn.landmarks[0].name, "Kiosk");
            turn.side
        };
        assert_eq!(turn_side(Side::Front), Some(Side::Front));
        assert_eq!(turn_side(Side::Left), Some(Side::Left));
        assert_eq!(turn_side(Side::Right), Some(Side::Right));
    }

    #[test]
    fn destination_behind_the_walker_takes_the_ambiguous_side() {
        let grid = junction();
        let kiosk = grid.region(&RegionKey::Booth("K".into())).unwrap();
        // Walk away from the kiosk and arrive with it directly behind.
        let path = units(&[(3, 0), (4, 0)]);

        let arrive_side = |side: Side| {
            let config = with_ambiguous(side);
            let index = LandmarkIndex::build(&grid, None, &config.landmark_detection);
            let destination = Destination {
                region: kiosk,
                name: "Kiosk",
            };
            let steps = analyze(&path, &index, &[], destination, &config);
            let arrive = steps.last().cloned().unwrap();
            assert_eq!(arrive.action, Action::Arrive);
            assert_eq!(arrive.landmarks[0].side, arrive.side.unwrap());
            arrive.side
        };
        assert_eq!(arrive_side(Side::Front), Some(Side::Front));
        assert_eq!(arrive_side(Side::Left), Some(Side::Left));
        assert_eq!(arrive_side(Side::Right), Some(Side::Right));
    }

    #[test]
    fn zero_length_path_still_orients_and_arrives() {
        let grid = junction();
        let target = grid.region(&RegionKey::Booth("T".into())).unwrap();
        let config = NavConfig::default();
        let index = LandmarkIndex::build(&grid, None, &config.landmark_detection);
        let destination = Destination {
            region: target,
            name: "Target",
        };
        let steps = analyze(&units(&[(4, 2)]), &index, &[], destination, &config);
        let actions: Vec<Action> = steps.iter().map(|s| s.action).collect();
        assert_eq!(actions, vec![Action::Orient, Action::Arrive]);
        assert!(steps[0].landmarks.is_empty());
    }
}
