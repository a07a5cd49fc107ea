// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Landmark coverage along a straight step, and the selection it drives.
//!
//! At every position of a step, each side (crossing, left, right, front) is
//! held by at most one landmark: the nearest one observed there. A
//! landmark's coverage is the share of positions it holds on its side.
//! Coverage decides which landmarks are cited; path order decides the order
//! they are cited in.

use std::cmp::Ordering;

use expo_nav_grid::Unit;
use rustc_hash::FxHashMap;

use crate::config::NavConfig;
use crate::geometry::{classify, PlaneVector, Side, Vec2};
use crate::landmarks::{LandmarkIndex, LandmarkRef};

/// Projection along the heading within which a unit counts as abeam.
const ABEAM: f64 = 0.5;

/// What one candidate held along one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub candidate: usize,
    /// Position at which the candidate was first observed on any side.
    pub first_seen: usize,
    /// Positions held, per side (indexed by [`Side::index`]).
    pub held: [usize; 4],
    pub first_held: [Option<usize>; 4],
    /// Sum of distances at the held positions, per side.
    pub distance_sum: [f64; 4],
    /// Positions held on at least one side.
    pub positions_held: usize,
}

impl Observation {
    fn new(candidate: usize, first_seen: usize) -> Self {
        Self {
            candidate,
            first_seen,
            held: [0; 4],
            first_held: [None; 4],
            distance_sum: [0.0; 4],
            positions_held: 0,
        }
    }

    pub fn total_held(&self) -> usize {
        self.held.iter().sum()
    }
}

/// Scans every position of a step and records which candidate holds each
/// side there. Candidates in `excluded` are never observed.
pub fn observe(
    index: &LandmarkIndex<'_>,
    positions: &[Unit],
    heading: Vec2,
    config: &NavConfig,
    excluded: &[usize],
) -> Vec<Observation> {
    let Some(h) = heading.direction() else {
        return Vec::new();
    };
    let detection = &config.landmark_detection;
    let lateral_max = detection.distance_filter;
    let front_reach = detection.search_radius as i32;
    let reach = front_reach.max(lateral_max.ceil() as i32 + 1);
    let front_cos = config.side_calculation.front_angle_threshold;

    let mut observations: Vec<Observation> = Vec::new();
    let mut slot_of: FxHashMap<usize, usize> = FxHashMap::default();

    for (k, &p) in positions.iter().enumerate() {
        // Best distance per candidate and side at this position.
        let mut seen_here: FxHashMap<usize, [f64; 4]> = FxHashMap::default();
        let mut offer = |candidate: usize, side: Side, distance: f64| {
            let best = seen_here.entry(candidate).or_insert([f64::INFINITY; 4]);
            let slot = &mut best[side.index()];
            if distance < *slot {
                *slot = distance;
            }
        };

        if let Some(c) = index.at(p).filter(|c| !excluded.contains(c)) {
            offer(c, Side::Crossing, 0.0);
        }
        for (u, c) in index.near(p, reach) {
            if u == p || excluded.contains(&c) {
                continue;
            }
            let rel = Vec2::between(p, u);
            let along = rel.dot(&h);
            let lateral = h.perp(&rel);
            if along.abs() <= ABEAM && lateral.abs() > 1e-9 && lateral.abs() <= lateral_max {
                let side = if lateral > 0.0 { Side::Right } else { Side::Left };
                offer(c, side, lateral.abs());
            }
            if p.chebyshev(u) <= front_reach && h.cos_to(&rel).is_some_and(|cos| cos >= front_cos) {
                offer(c, Side::Front, rel.norm());
            }
        }

        for &c in seen_here.keys() {
            if !slot_of.contains_key(&c) {
                slot_of.insert(c, observations.len());
                observations.push(Observation::new(c, k));
            }
        }

        let mut won_here: Vec<usize> = Vec::new();
        for side in Side::ALL {
            let s = side.index();
            let winner = seen_here
                .iter()
                .filter(|(_, d)| d[s].is_finite())
                .map(|(&c, d)| (c, d[s]))
                .min_by(|a, b| {
                    a.1.total_cmp(&b.1)
                        .then_with(|| {
                            let fa = observations[slot_of[&a.0]].first_seen;
                            let fb = observations[slot_of[&b.0]].first_seen;
                            fa.cmp(&fb)
                        })
                        .then_with(|| a.0.cmp(&b.0))
                });
            if let Some((c, distance)) = winner {
                let obs = &mut observations[slot_of[&c]];
                obs.held[s] += 1;
                obs.first_held[s].get_or_insert(k);
                obs.distance_sum[s] += distance;
                if !won_here.contains(&c) {
                    won_here.push(c);
                    obs.positions_held += 1;
                }
            }
        }
    }

    observations.retain(|o| o.total_held() > 0);
    observations.sort_by_key(|o| (o.first_seen, o.candidate));
    observations
}

/// A candidate placed on one side with its coverage and score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLandmark {
    pub candidate: usize,
    pub side: Side,
    pub coverage: f64,
    pub score: f64,
    /// First position held on `side`; the presentation order.
    pub order: usize,
}

/// The landmarks chosen for one step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    /// Side whose sequence is presented; `None` when nothing survived.
    pub side: Option<Side>,
    /// Presented sequence, in path order.
    pub landmarks: Vec<RankedLandmark>,
    /// Survivors of every side, in path order.
    pub by_side: [Vec<RankedLandmark>; 4],
    pub fallback_used: bool,
}

impl Selection {
    pub fn references(&self, index: &LandmarkIndex<'_>) -> Vec<LandmarkRef> {
        self.landmarks
            .iter()
            .map(|r| index.reference(r.candidate, r.side, r.coverage))
            .collect()
    }
}

/// Decides each observed candidate's side, ranks, filters and orders them.
///
/// `start` and `heading` describe the step for point classification; `distance`
/// is its walking length; `positions` the number of units it covers.
pub fn select(
    index: &LandmarkIndex<'_>,
    observations: &[Observation],
    positions: usize,
    distance: f64,
    start: Unit,
    heading: Vec2,
    config: &NavConfig,
) -> Selection {
    let sides = &config.side_calculation;
    let selection = &config.sequence_selection;
    let hybrid = sides.use_hybrid_method && distance >= sides.long_segment_threshold;
    let positions = positions.max(1) as f64;

    let mut ranked: [Vec<RankedLandmark>; 4] = Default::default();
    for obs in observations {
        let (side, held, distance_sum) = if hybrid {
            let side = dominant_side(obs);
            let s = side.index();
            (side, obs.held[s], obs.distance_sum[s])
        } else {
            // Short steps: the side is a point classification, falling back to
            // the observed side when the candidate never held the classified
            // one. Coverage counts every position held on any side.
            let side = if obs.held[Side::Crossing.index()] > 0 {
                Side::Crossing
            } else {
                let offset = Vec2::to_point(start, index.get(obs.candidate).centroid);
                let classified = classify(heading, offset, sides.near_front_threshold)
                    .unwrap_or(sides.ambiguous_side);
                if obs.held[classified.index()] > 0 {
                    classified
                } else {
                    dominant_side(obs)
                }
            };
            (side, obs.positions_held, obs.distance_sum.iter().sum::<f64>())
        };
        let s = side.index();
        let coverage = (held as f64 / positions).clamp(0.0, 1.0);
        let total_held = if hybrid { held } else { obs.total_held() };
        let mean_distance = if total_held > 0 {
            distance_sum / total_held as f64
        } else {
            Vec2::to_point(start, index.get(obs.candidate).centroid).norm()
        };
        let proximity = 1.0 / (1.0 + mean_distance);
        let w = selection.coverage_weight;
        let order = obs.first_held[s]
            .or_else(|| obs.first_held.iter().flatten().min().copied())
            .unwrap_or(obs.first_seen);
        ranked[s].push(RankedLandmark {
            candidate: obs.candidate,
            side,
            coverage,
            score: w * coverage + (1.0 - w) * proximity,
            order,
        });
    }

    for list in ranked.iter_mut() {
        list.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.order.cmp(&b.order))
                .then_with(|| index.get(a.candidate).region.key.cmp(&index.get(b.candidate).region.key))
        });
    }

    let mut survivors: [Vec<RankedLandmark>; 4] = Default::default();
    for (s, list) in ranked.iter().enumerate() {
        survivors[s] = list
            .iter()
            .filter(|r| r.coverage >= selection.min_coverage_threshold)
            .cloned()
            .collect();
    }

    let mut fallback_used = false;
    if survivors.iter().all(Vec::is_empty) && selection.use_front_fallback {
        if let Some(best) = ranked[Side::Front.index()].first() {
            survivors[Side::Front.index()].push(best.clone());
            fallback_used = true;
        }
    }

    for list in survivors.iter_mut() {
        list.truncate(selection.max_landmarks_per_side);
        list.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| index.get(a.candidate).region.key.cmp(&index.get(b.candidate).region.key))
        });
    }

    let side = presented_side(&survivors);
    Selection {
        side,
        landmarks: side.map(|s| survivors[s.index()].clone()).unwrap_or_default(),
        by_side: survivors,
        fallback_used,
    }
}

/// Side with the most held positions; earlier sides win ties.
fn dominant_side(obs: &Observation) -> Side {
    let mut best = Side::Crossing;
    for side in Side::ALL {
        if obs.held[side.index()] > obs.held[best.index()] {
            best = side;
        }
    }
    best
}

/// Highest mean coverage among crossing, left and right; front only when
/// those are empty.
fn presented_side(survivors: &[Vec<RankedLandmark>; 4]) -> Option<Side> {
    let mean = |list: &[RankedLandmark]| {
        list.iter().map(|r| r.coverage).sum::<f64>() / list.len() as f64
    };
    let mut best: Option<(Side, f64)> = None;
    for side in [Side::Crossing, Side::Left, Side::Right] {
        let list = &survivors[side.index()];
        if list.is_empty() {
            continue;
        }
        let m = mean(list);
        if best.map_or(true, |(_, b)| m.total_cmp(&b) == Ordering::Greater) {
            best = Some((side, m));
        }
    }
    best.map(|(side, _)| side).or_else(|| {
        (!survivors[Side::Front.index()].is_empty()).then_some(Side::Front)
    })
}
