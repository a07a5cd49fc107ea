// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for grid construction and lookups.

use std::path::PathBuf;

use crate::cell::{CellId, Unit};

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating a grid snapshot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cell references a type tag that the type metadata does not define.
    ///
    /// This is a configuration error: it is raised while the grid is built,
    /// before any search can run.
    #[error("cell {cell} has type '{tag}' which is missing from the type metadata")]
    UnknownType { cell: CellId, tag: String },

    /// Two cells share the same identifier.
    #[error("duplicate cell identifier {0}")]
    DuplicateCell(CellId),

    /// Two cells claim the same logical unit.
    #[error("cells {first} and {second} both cover unit {unit}")]
    OverlappingCells {
        unit: Unit,
        first: CellId,
        second: CellId,
    },

    /// A cell spans zero units in one direction.
    #[error("cell {0} has an empty unit extent")]
    EmptyExtent(CellId),

    /// A type declares a cost multiplier that is not a positive finite number.
    #[error("type '{tag}' has invalid cost multiplier {cost}")]
    InvalidCost { tag: String, cost: f64 },

    /// The snapshot contains no cells.
    #[error("grid snapshot contains no cells")]
    EmptyGrid,

    /// Cell identifier not present in the grid.
    #[error("cell not found: {0}")]
    CellNotFound(CellId),

    /// No cell carries the requested booth identifier.
    #[error("booth not found: {0}")]
    BoothNotFound(String),

    /// A region reference could not be parsed.
    #[error("invalid region reference '{0}': expected a cell index or 'booth:<id>'")]
    InvalidRegionRef(String),

    /// Reading a snapshot file failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file is not valid JSON for the expected schema.
    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error outside of a file context.
    #[error("serialization error: {0}")]
    Serialization(String),
}
