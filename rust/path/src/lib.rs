// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Expo-Nav Path
//!
//! Shortest walking routes between regions of an exhibition grid.
//!
//! The pipeline is explicit and every stage is testable alone:
//!
//! 1. [`CostMatrix::build`] turns the grid and the area policy into a dense
//!    walkability/cost array.
//! 2. [`resolve_anchors`] turns a region (often a non-walkable booth) into
//!    all walkable units at minimum distance from it.
//! 3. [`search`] runs one multi-source, multi-target A* with optional
//!    diagonals, corner-cutting prohibition and turn penalties.
//! 4. [`Router`] assembles the semantic and geometric [`Route`].
//!
//! [`precompute`] runs step 3 for many targets in parallel against one
//! shared matrix.

pub mod anchors;
pub mod batch;
pub mod error;
pub mod matrix;
pub mod options;
pub mod route;
pub mod search;

pub use anchors::{resolve_anchors, Anchors};
pub use batch::{
    eligible_targets, precompute, BatchRoutes, BatchStatistics, CellSummary, TargetRoute,
    UnreachableTarget,
};
pub use error::{Error, Result};
pub use matrix::CostMatrix;
pub use options::PathOptions;
pub use route::{find_route, Route, RouteOutcome, Router, UnreachableReason};
pub use search::{search, SearchFailure, SearchPath};
