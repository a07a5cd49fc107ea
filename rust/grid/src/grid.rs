// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The validated, immutable grid snapshot.
//!
//! [`Grid::build`] is the only way to obtain a grid. It checks every
//! structural invariant once, so downstream code can index freely: each cell
//! has a resolvable type, each unit is covered by at most one cell, and each
//! cell belongs to exactly one region.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellId, Unit};
use crate::directory::ExhibitorDirectory;
use crate::error::{Error, Result};
use crate::region::{Region, RegionKey};
use crate::types::{TypeInfo, TypeMetadata};

/// Inclusive bounding box of all covered units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBounds {
    pub min_col: i32,
    pub min_row: i32,
    pub max_col: i32,
    pub max_row: i32,
}

impl UnitBounds {
    pub fn width(&self) -> usize {
        (self.max_col - self.min_col + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_row - self.min_row + 1) as usize
    }

    pub fn contains(&self, unit: Unit) -> bool {
        unit.col >= self.min_col
            && unit.col <= self.max_col
            && unit.row >= self.min_row
            && unit.row <= self.max_row
    }

    fn include(&mut self, unit: Unit) {
        self.min_col = self.min_col.min(unit.col);
        self.min_row = self.min_row.min(unit.row);
        self.max_col = self.max_col.max(unit.col);
        self.max_row = self.max_row.max(unit.row);
    }
}

/// Cells, type metadata and the lookup tables derived from them.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    types: TypeMetadata,
    by_id: FxHashMap<CellId, usize>,
    by_unit: FxHashMap<Unit, usize>,
    regions: Vec<Region>,
    region_of_cell: FxHashMap<CellId, usize>,
    region_by_booth: FxHashMap<String, usize>,
    bounds: UnitBounds,
    fingerprint: u64,
}

impl Grid {
    /// Validates `cells` against `types` and builds the lookup tables.
    pub fn build(mut cells: Vec<Cell>, types: TypeMetadata) -> Result<Self> {
        if cells.is_empty() {
            return Err(Error::EmptyGrid);
        }
        types.validate()?;
        cells.sort_by_key(|c| c.id);

        let mut by_id = FxHashMap::default();
        let mut by_unit: FxHashMap<Unit, usize> = FxHashMap::default();
        let first = Unit::new(cells[0].col, cells[0].row);
        let mut bounds = UnitBounds {
            min_col: first.col,
            min_row: first.row,
            max_col: first.col,
            max_row: first.row,
        };

        for (index, cell) in cells.iter().enumerate() {
            if by_id.insert(cell.id, index).is_some() {
                return Err(Error::DuplicateCell(cell.id));
            }
            if !types.contains(&cell.cell_type) {
                return Err(Error::UnknownType {
                    cell: cell.id,
                    tag: cell.cell_type.clone(),
                });
            }
            if cell.unit_w == 0 || cell.unit_h == 0 {
                return Err(Error::EmptyExtent(cell.id));
            }
            for unit in cell.units() {
                if let Some(&other) = by_unit.get(&unit) {
                    return Err(Error::OverlappingCells {
                        unit,
                        first: cells[other].id,
                        second: cell.id,
                    });
                }
                by_unit.insert(unit, index);
                bounds.include(unit);
            }
        }

        // Group cells into regions; BTreeMap keeps region order stable.
        let mut grouped: BTreeMap<RegionKey, Vec<usize>> = BTreeMap::new();
        for (index, cell) in cells.iter().enumerate() {
            let key = match cell.booth_id.as_deref().map(str::trim) {
                Some(booth) if !booth.is_empty() => RegionKey::Booth(booth.to_string()),
                _ => RegionKey::Cell(cell.id),
            };
            grouped.entry(key).or_default().push(index);
        }

        let mut regions = Vec::with_capacity(grouped.len());
        let mut region_of_cell = FxHashMap::default();
        let mut region_by_booth = FxHashMap::default();
        for (key, members) in grouped {
            let region_index = regions.len();
            let mut units: Vec<Unit> = members.iter().flat_map(|&i| cells[i].units()).collect();
            units.sort();
            let member_ids: Vec<CellId> = members.iter().map(|&i| cells[i].id).collect();
            for id in &member_ids {
                region_of_cell.insert(*id, region_index);
            }
            if let RegionKey::Booth(booth) = &key {
                region_by_booth.insert(booth.clone(), region_index);
            }
            regions.push(Region {
                key,
                cell_type: cells[members[0]].cell_type.clone(),
                cells: member_ids,
                units,
            });
        }

        let mut hasher = FxHasher::default();
        cells.hash(&mut hasher);
        types.hash_into(&mut hasher);
        let fingerprint = hasher.finish();

        tracing::debug!(
            cells = cells.len(),
            regions = regions.len(),
            width = bounds.width(),
            height = bounds.height(),
            fingerprint,
            "grid built"
        );

        Ok(Self {
            cells,
            types,
            by_id,
            by_unit,
            regions,
            region_of_cell,
            region_by_booth,
            bounds,
            fingerprint,
        })
    }

    /// All cells, ordered by identifier.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn types(&self) -> &TypeMetadata {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn bounds(&self) -> UnitBounds {
        self.bounds
    }

    /// Deterministic hash of cells and type metadata.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.by_id.get(&id).map(|&i| &self.cells[i])
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        self.get(id).ok_or(Error::CellNotFound(id))
    }

    /// The cell covering `unit`, if any.
    pub fn cell_at(&self, unit: Unit) -> Option<&Cell> {
        self.by_unit.get(&unit).map(|&i| &self.cells[i])
    }

    /// Type info of a cell. Always present for cells of this grid.
    pub fn type_of(&self, cell: &Cell) -> &TypeInfo {
        self.info(&cell.cell_type)
    }

    fn info(&self, tag: &str) -> &TypeInfo {
        // Presence checked in build(); the fallback is never hit.
        static OBSTACLE: TypeInfo = TypeInfo {
            description: String::new(),
            is_walkable: false,
            cost: None,
            is_landmark: false,
            large_area: false,
            display_color: String::new(),
        };
        self.types.get(tag).unwrap_or(&OBSTACLE)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// The region a cell belongs to.
    pub fn region_of(&self, id: CellId) -> Result<&Region> {
        self.region_of_cell
            .get(&id)
            .map(|&i| &self.regions[i])
            .ok_or(Error::CellNotFound(id))
    }

    /// Resolves a key to its region. A cell key resolves to the region the
    /// cell belongs to, which may be a booth.
    pub fn region(&self, key: &RegionKey) -> Result<&Region> {
        match key {
            RegionKey::Cell(id) => self.region_of(*id),
            RegionKey::Booth(booth) => self
                .region_by_booth
                .get(booth)
                .map(|&i| &self.regions[i])
                .ok_or_else(|| Error::BoothNotFound(booth.clone())),
        }
    }

    pub fn region_type(&self, region: &Region) -> &TypeInfo {
        self.info(&region.cell_type)
    }

    /// Regions whose type is flagged as a landmark.
    pub fn landmark_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter(move |r| self.region_type(r).is_landmark)
    }

    /// Name of the region as drawn on the plan: the first member cell with a
    /// non-blank name, else the booth id, else `cell <id>`.
    pub fn region_name(&self, region: &Region) -> String {
        region
            .cells
            .iter()
            .filter_map(|id| self.get(*id))
            .find_map(Cell::display_name)
            .map(str::to_string)
            .or_else(|| region.booth_id().map(str::to_string))
            .unwrap_or_else(|| format!("cell {}", region.representative()))
    }

    /// Whether a landmark-eligible region is worth citing in directions.
    ///
    /// Large areas always qualify. Others need a meaningful name, taken from
    /// their cells or from the exhibitor directory, unless `require_name` is
    /// off.
    pub fn is_citable(
        &self,
        region: &Region,
        directory: Option<&ExhibitorDirectory>,
        require_name: bool,
    ) -> bool {
        let info = self.region_type(region);
        if !info.is_landmark {
            return false;
        }
        if info.large_area || !require_name {
            return true;
        }
        let named_cell = region
            .cells
            .iter()
            .filter_map(|id| self.get(*id))
            .filter_map(Cell::display_name)
            .any(is_meaningful_name);
        let named_exhibitor = region
            .booth_id()
            .and_then(|booth| directory.map(|d| d.exhibitors(booth)))
            .map(|list| list.iter().any(|e| is_meaningful_name(&e.name)))
            .unwrap_or(false);
        named_cell || named_exhibitor
    }
}

/// A name that a visitor can recognise: not blank and not just a number.
pub fn is_meaningful_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types() -> TypeMetadata {
        TypeMetadata::new()
            .with("road", TypeInfo::walkable(1.0))
            .with("booth", TypeInfo::obstacle().landmark())
            .with("stage", TypeInfo::obstacle().landmark().large_area())
    }

    #[test]
    fn build_indexes_units_and_regions() {
        let cells = vec![
            Cell::new(1, 0, 0, 3, 1, "road"),
            Cell::new(2, 0, 1, 1, 1, "booth").with_booth("A1").with_name("Acme"),
            Cell::new(3, 1, 1, 1, 1, "booth").with_booth("A1"),
            Cell::new(4, 2, 1, 1, 1, "booth"),
        ];
        let grid = Grid::build(cells, types()).unwrap();

        assert_eq!(grid.cell_at(Unit::new(2, 0)).unwrap().id, CellId(1));
        assert_eq!(grid.bounds().width(), 3);
        assert_eq!(grid.bounds().height(), 2);

        let booth = grid.region(&RegionKey::Booth("A1".into())).unwrap();
        assert_eq!(booth.cells, vec![CellId(2), CellId(3)]);
        assert_eq!(grid.region_of(CellId(3)).unwrap().key, booth.key);
        assert_eq!(grid.region_name(booth), "Acme");

        let lone = grid.region(&RegionKey::Cell(CellId(4))).unwrap();
        assert_eq!(grid.region_name(lone), "cell 4");
        assert_eq!(grid.landmark_regions().count(), 2);
    }

    #[test]
    fn unknown_type_is_a_configuration_error() {
        let cells = vec![Cell::new(1, 0, 0, 1, 1, "kiosk")];
        let err = Grid::build(cells, types()).unwrap_err();
        assert!(matches!(err, Error::UnknownType { tag, .. } if tag == "kiosk"));
    }

    #[test]
    fn overlapping_cells_are_rejected() {
        let cells = vec![
            Cell::new(1, 0, 0, 2, 2, "road"),
            Cell::new(2, 1, 1, 1, 1, "booth"),
        ];
        let err = Grid::build(cells, types()).unwrap_err();
        assert!(matches!(
            err,
            Error::OverlappingCells { unit, first: CellId(1), second: CellId(2) } if unit == Unit::new(1, 1)
        ));
    }

    #[test]
    fn duplicate_ids_and_empty_extents_are_rejected() {
        let dup = vec![
            Cell::new(1, 0, 0, 1, 1, "road"),
            Cell::new(1, 1, 0, 1, 1, "road"),
        ];
        assert!(matches!(
            Grid::build(dup, types()),
            Err(Error::DuplicateCell(CellId(1)))
        ));

        let empty = vec![Cell::new(1, 0, 0, 0, 1, "road")];
        assert!(matches!(
            Grid::build(empty, types()),
            Err(Error::EmptyExtent(CellId(1)))
        ));
        assert!(matches!(Grid::build(vec![], types()), Err(Error::EmptyGrid)));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let cells = vec![Cell::new(1, 0, 0, 1, 1, "road")];
        let a = Grid::build(cells.clone(), types()).unwrap();
        let b = Grid::build(cells.clone(), types()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let heavier = types().with("road", TypeInfo::walkable(3.0));
        let c = Grid::build(cells, heavier).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn citable_requires_meaningful_name() {
        let cells = vec![
            Cell::new(1, 0, 0, 1, 1, "booth").with_name("1024"),
            Cell::new(2, 1, 0, 1, 1, "booth").with_name("Nordic Foods"),
            Cell::new(3, 2, 0, 1, 1, "stage"),
        ];
        let grid = Grid::build(cells, types()).unwrap();
        let numeric = grid.region_of(CellId(1)).unwrap();
        let named = grid.region_of(CellId(2)).unwrap();
        let stage = grid.region_of(CellId(3)).unwrap();

        assert!(!grid.is_citable(numeric, None, true));
        assert!(grid.is_citable(numeric, None, false));
        assert!(grid.is_citable(named, None, true));
        assert!(grid.is_citable(stage, None, true));
    }

    #[test]
    fn meaningful_names() {
        assert!(is_meaningful_name("Hall B"));
        assert!(!is_meaningful_name(" 12 34 "));
        assert!(!is_meaningful_name(""));
    }
}
