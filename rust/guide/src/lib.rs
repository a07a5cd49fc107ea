// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Expo-Nav Guide
//!
//! Landmark-based walking directions for routes produced by
//! `expo-nav-path`.
//!
//! 1. The **analyzer** cuts a route's unit path into straight runs and turns.
//! 2. The **coverage selector** finds, for every run, which named booths a
//!    walker actually passes and on which side, keeping only those that stay
//!    the nearest reference for a large enough share of the run.
//! 3. The **formatter** renders steps with graded English templates whose
//!    booth counts always equal the number of booths they name.
//!
//! All thresholds come from one [`NavConfig`].

pub mod analyzer;
pub mod config;
pub mod coverage;
pub mod document;
pub mod error;
pub mod formatter;
pub mod geometry;
pub mod landmarks;
pub mod navigator;

pub use analyzer::{analyze, segment, Action, Destination, NavigationStep, Run};
pub use config::{
    LandmarkDetection, NavConfig, Phrasing, SequenceSelection, SideCalculation, ENV_PREFIX,
};
pub use coverage::{observe, select, Observation, RankedLandmark, Selection};
pub use document::{
    BatchNavigation, NavigationDocument, NavigationFailure, NavigationMetadata, RegionInfo,
};
pub use error::{Error, Result};
pub use formatter::{join_names, Formatter, Grade};
pub use geometry::{classify, Compass, PlaneVector, Side, Vec2};
pub use landmarks::{display_name, Candidate, LandmarkIndex, LandmarkRef};
pub use navigator::Navigator;
