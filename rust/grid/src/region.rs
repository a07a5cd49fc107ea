// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named regions: one or more cells sharing an external identifier.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell::{CellId, Unit};
use crate::error::Error;

/// Identity of a region.
///
/// Cells with a `booth_id` are grouped under [`RegionKey::Booth`]; any other
/// cell is a region of its own. Parsed from and rendered as `booth:<id>` or a
/// bare cell index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RegionKey {
    Booth(String),
    Cell(CellId),
}

impl std::fmt::Display for RegionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKey::Booth(id) => write!(f, "booth:{id}"),
            RegionKey::Cell(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for RegionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(booth) = s.strip_prefix("booth:") {
            if booth.is_empty() {
                return Err(Error::InvalidRegionRef(s.to_string()));
            }
            return Ok(RegionKey::Booth(booth.to_string()));
        }
        let idx = s.strip_prefix("cell:").unwrap_or(s);
        idx.parse::<u32>()
            .map(|id| RegionKey::Cell(CellId(id)))
            .map_err(|_| Error::InvalidRegionRef(s.to_string()))
    }
}

impl From<RegionKey> for String {
    fn from(key: RegionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for RegionKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for RegionKey {
    fn from(id: CellId) -> Self {
        RegionKey::Cell(id)
    }
}

/// A region resolved against a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub key: RegionKey,
    /// Member cells, ascending.
    pub cells: Vec<CellId>,
    /// Covered units, row-major.
    pub units: Vec<Unit>,
    /// Type tag of the first member cell.
    pub cell_type: String,
}

impl Region {
    /// The lowest member cell identifier; stands for the region in routes.
    pub fn representative(&self) -> CellId {
        self.cells[0]
    }

    pub fn booth_id(&self) -> Option<&str> {
        match &self.key {
            RegionKey::Booth(id) => Some(id),
            RegionKey::Cell(_) => None,
        }
    }

    pub fn contains(&self, unit: Unit) -> bool {
        self.units.binary_search(&unit).is_ok()
    }

    pub fn contains_cell(&self, id: CellId) -> bool {
        self.cells.binary_search(&id).is_ok()
    }

    pub fn area(&self) -> usize {
        self.units.len()
    }

    /// Mean of the covered unit centres.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.units.len().max(1) as f64;
        let (sc, sr) = self.units.iter().fold((0.0, 0.0), |(c, r), u| {
            (c + u.col as f64, r + u.row as f64)
        });
        (sc / n, sr / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_region_keys() {
        assert_eq!("52".parse::<RegionKey>().unwrap(), RegionKey::Cell(CellId(52)));
        assert_eq!("cell:7".parse::<RegionKey>().unwrap(), RegionKey::Cell(CellId(7)));
        assert_eq!(
            "booth:A12".parse::<RegionKey>().unwrap(),
            RegionKey::Booth("A12".into())
        );
        assert!("booth:".parse::<RegionKey>().is_err());
        assert!("north".parse::<RegionKey>().is_err());
    }

    #[test]
    fn region_key_round_trips_through_json() {
        let key = RegionKey::Booth("B 7".into());
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"booth:B 7\"");
        assert_eq!(serde_json::from_str::<RegionKey>(&json).unwrap(), key);
    }

    #[test]
    fn region_centroid_and_membership() {
        let region = Region {
            key: RegionKey::Booth("X".into()),
            cells: vec![CellId(1), CellId(2)],
            units: vec![Unit::new(0, 0), Unit::new(1, 0), Unit::new(0, 1), Unit::new(1, 1)],
            cell_type: "booth".into(),
        };
        assert_eq!(region.centroid(), (0.5, 0.5));
        assert!(region.contains(Unit::new(1, 1)));
        assert!(!region.contains(Unit::new(2, 1)));
        assert_eq!(region.representative(), CellId(1));
    }
}
