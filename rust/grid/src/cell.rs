// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cells and logical unit coordinates.
//!
//! A [`Cell`] is one rectangle of the annotated floor plan. It carries both
//! its pixel rectangle (as drawn on the source image) and its footprint in
//! logical grid units. Several cells may share a `booth_id`; together they
//! form one region (see [`crate::region`]).

use serde::{Deserialize, Serialize};

/// Stable cell identifier, assigned once when the grid is annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(value: u32) -> Self {
        CellId(value)
    }
}

/// A logical grid unit, addressed by column and row.
///
/// Rows grow downward (image convention). Serialized as `[col, row]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Unit {
    pub col: i32,
    pub row: i32,
}

impl Unit {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the unit displaced by `(dc, dr)`.
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(self, other: Unit) -> i32 {
        (self.col - other.col).abs().max((self.row - other.row).abs())
    }

    pub fn euclidean(self, other: Unit) -> f64 {
        let dc = (self.col - other.col) as f64;
        let dr = (self.row - other.row) as f64;
        (dc * dc + dr * dr).sqrt()
    }
}

// Row-major ordering keeps anchor lists and unit sets reproducible.
impl Ord for Unit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl PartialOrd for Unit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i32, i32)> for Unit {
    fn from((col, row): (i32, i32)) -> Self {
        Unit { col, row }
    }
}

impl From<Unit> for (i32, i32) {
    fn from(u: Unit) -> Self {
        (u.col, u.row)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

fn one() -> u32 {
    1
}

/// One annotated rectangle of the floor plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "idx")]
    pub id: CellId,
    /// Pixel-space origin and extent on the source image.
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Logical origin in grid units.
    pub col: i32,
    pub row: i32,
    /// Logical extent in grid units.
    #[serde(default = "one")]
    pub unit_w: u32,
    #[serde(default = "one")]
    pub unit_h: u32,
    /// Type tag, resolved through [`crate::TypeMetadata`].
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default)]
    pub name: Option<String>,
    /// External region identifier (one booth may span several cells).
    #[serde(default)]
    pub booth_id: Option<String>,
}

impl Cell {
    /// Creates a cell covering a `unit_w × unit_h` block at `(col, row)`.
    ///
    /// Pixel fields are left at zero; this is mostly useful for fixtures.
    pub fn new(id: u32, col: i32, row: i32, unit_w: u32, unit_h: u32, cell_type: &str) -> Self {
        Self {
            id: CellId(id),
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            col,
            row,
            unit_w,
            unit_h,
            cell_type: cell_type.to_string(),
            name: None,
            booth_id: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_booth(mut self, booth_id: &str) -> Self {
        self.booth_id = Some(booth_id.to_string());
        self
    }

    pub fn with_pixels(mut self, x: i32, y: i32, w: i32, h: i32) -> Self {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
        self
    }

    /// Iterates every logical unit covered by this cell, row-major.
    pub fn units(&self) -> impl Iterator<Item = Unit> + '_ {
        (0..self.unit_h as i32).flat_map(move |dr| {
            (0..self.unit_w as i32).map(move |dc| Unit::new(self.col + dc, self.row + dr))
        })
    }

    pub fn contains(&self, unit: Unit) -> bool {
        unit.col >= self.col
            && unit.col < self.col + self.unit_w as i32
            && unit.row >= self.row
            && unit.row < self.row + self.unit_h as i32
    }

    /// Number of covered units.
    pub fn area(&self) -> u32 {
        self.unit_w * self.unit_h
    }

    /// Centre in unit coordinates (unit centres sit on integers).
    pub fn centroid(&self) -> (f64, f64) {
        (
            self.col as f64 + (self.unit_w as f64 - 1.0) / 2.0,
            self.row as f64 + (self.unit_h as f64 - 1.0) / 2.0,
        )
    }

    /// Display name if present and non-blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
