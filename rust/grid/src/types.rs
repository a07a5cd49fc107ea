// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type metadata: what a cell's type tag means for walking and for landmarks.
//!
//! Every tag used by a cell must be declared here. The only implicit default
//! is the cost multiplier, which falls back to 1.0.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellId};
use crate::error::{Error, Result};

/// Tags treated as walkable when scaffolding metadata for a new grid.
const SCAFFOLD_WALKABLE: &[&str] = &["road", "exp hall", "Lounge"];

/// Properties attached to one type tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_walkable: bool,
    /// Per-entry traversal cost multiplier; `None` means 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Cells of this type may be cited as landmarks.
    #[serde(default)]
    pub is_landmark: bool,
    /// Large open area (exhibit hall, stage) that the engine may optionally
    /// cut through at an elevated cost.
    #[serde(default)]
    pub large_area: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_color: String,
}

impl TypeInfo {
    pub fn walkable(cost: f64) -> Self {
        Self {
            is_walkable: true,
            cost: Some(cost),
            ..Self::default()
        }
    }

    pub fn obstacle() -> Self {
        Self::default()
    }

    pub fn landmark(mut self) -> Self {
        self.is_landmark = true;
        self
    }

    pub fn large_area(mut self) -> Self {
        self.large_area = true;
        self
    }

    pub fn cost_multiplier(&self) -> f64 {
        self.cost.unwrap_or(1.0)
    }
}

/// Mapping from type tag to [`TypeInfo`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMetadata {
    entries: BTreeMap<String, TypeInfo>,
}

impl TypeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient for fixtures.
    pub fn with(mut self, tag: &str, info: TypeInfo) -> Self {
        self.insert(tag, info);
        self
    }

    pub fn insert(&mut self, tag: &str, info: TypeInfo) {
        self.entries.insert(tag.to_string(), info);
    }

    pub fn get(&self, tag: &str) -> Option<&TypeInfo> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Iterates entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every declared cost multiplier is usable.
    pub fn validate(&self) -> Result<()> {
        for (tag, info) in &self.entries {
            let cost = info.cost_multiplier();
            if !cost.is_finite() || cost <= 0.0 {
                return Err(Error::InvalidCost {
                    tag: tag.clone(),
                    cost,
                });
            }
        }
        Ok(())
    }

    /// Produces metadata covering every tag used by `cells`.
    ///
    /// Existing entries are kept as they are; new tags get an obstacle
    /// default (walkable for the usual corridor and hall tags). This backs
    /// the offline authoring command and is never applied implicitly.
    pub fn scaffold(cells: &[Cell], existing: &TypeMetadata) -> (TypeMetadata, Vec<String>) {
        let mut out = existing.clone();
        let mut added = Vec::new();
        let tags: std::collections::BTreeSet<&str> =
            cells.iter().map(|c| c.cell_type.as_str()).collect();

        for tag in tags {
            if out.contains(tag) {
                continue;
            }
            let info = TypeInfo {
                description: format!("Cells of type '{tag}'."),
                is_walkable: SCAFFOLD_WALKABLE.contains(&tag),
                cost: Some(1.0),
                ..TypeInfo::default()
            };
            out.insert(tag, info);
            added.push(tag.to_string());
        }

        (out, added)
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        for (tag, info) in &self.entries {
            tag.hash(state);
            info.is_walkable.hash(state);
            info.cost_multiplier().to_bits().hash(state);
            info.is_landmark.hash(state);
            info.large_area.hash(state);
        }
    }
}

/// Per-type cell counts, used to spot annotation mistakes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeCensus {
    pub counts: BTreeMap<String, Vec<CellId>>,
}

impl TypeCensus {
    pub fn from_cells(cells: &[Cell]) -> Self {
        let mut counts: BTreeMap<String, Vec<CellId>> = BTreeMap::new();
        for cell in cells {
            counts.entry(cell.cell_type.clone()).or_default().push(cell.id);
        }
        Self { counts }
    }

    /// Types with fewer than `threshold` cells; often typos in the annotation.
    pub fn rare(&self, threshold: usize) -> impl Iterator<Item = (&str, &[CellId])> {
        self.counts
            .iter()
            .filter(move |(_, ids)| ids.len() < threshold)
            .map(|(tag, ids)| (tag.as_str(), ids.as_slice()))
    }
}
