// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for direction generation.

use std::path::PathBuf;

/// Result type alias for guide operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] expo_nav_grid::Error),

    #[error(transparent)]
    Path(#[from] expo_nav_path::Error),

    /// A `section.key=value` override could not be applied.
    #[error("invalid config override '{input}': {reason}")]
    InvalidOverride { input: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid config value {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    /// The configuration file could not be parsed.
    #[error("cannot parse config {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A route has no geometric path to describe.
    #[error("route has an empty unit path")]
    EmptyRoute,

    #[error("serialization error: {0}")]
    Serialization(String),
}
