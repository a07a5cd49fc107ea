// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the path engine.
//!
//! Only fatal conditions are errors. A target that cannot be reached is a
//! normal outcome, see [`crate::RouteOutcome`].

/// Result type alias for path engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grid lookup or snapshot failure.
    #[error(transparent)]
    Grid(#[from] expo_nav_grid::Error),

    /// The cost matrix was built from a different grid or with different
    /// area options than the ones it is being used with.
    #[error("cost matrix is stale: built for grid {built:016x}, used with grid {current:016x}")]
    StaleMatrix { built: u64, current: u64 },

    /// A path option is out of range.
    #[error("invalid path option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// Serialization error outside of a file context.
    #[error("serialization error: {0}")]
    Serialization(String),
}
