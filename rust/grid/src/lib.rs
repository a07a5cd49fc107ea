// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Expo-Nav Grid
//!
//! The data layer of an exhibition floor: annotated rectangular cells, the
//! type metadata that gives their tags meaning, and the regions (booths)
//! formed by cells sharing an external identifier.
//!
//! A [`Grid`] is built once per run from a snapshot and never mutated. Path
//! search and direction generation only read it.
//!
//! ## Quick Start
//!
//! ```rust
//! use expo_nav_grid::{Cell, Grid, RegionKey, TypeInfo, TypeMetadata, Unit};
//!
//! let types = TypeMetadata::new()
//!     .with("road", TypeInfo::walkable(1.0))
//!     .with("booth", TypeInfo::obstacle().landmark());
//! let cells = vec![
//!     Cell::new(1, 0, 0, 4, 1, "road"),
//!     Cell::new(2, 0, 1, 2, 1, "booth").with_booth("A1").with_name("Acme"),
//! ];
//!
//! let grid = Grid::build(cells, types).unwrap();
//! let booth = grid.region(&RegionKey::Booth("A1".into())).unwrap();
//! assert_eq!(booth.units, vec![Unit::new(0, 1), Unit::new(1, 1)]);
//! ```

pub mod cell;
pub mod directory;
pub mod error;
pub mod grid;
pub mod meta;
pub mod region;
pub mod snapshot;
pub mod types;

pub use cell::{Cell, CellId, Unit};
pub use directory::{Exhibitor, ExhibitorDirectory};
pub use error::{Error, Result};
pub use grid::{is_meaningful_name, Grid, UnitBounds};
pub use meta::GridMeta;
pub use region::{Region, RegionKey};
pub use types::{TypeCensus, TypeInfo, TypeMetadata};
