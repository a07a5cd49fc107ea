// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Navigation output: the structured document and its text rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use expo_nav_grid::{snapshot, CellId, Exhibitor, RegionKey};
use serde::{Deserialize, Serialize};

use crate::analyzer::NavigationStep;
use crate::error::Result;

/// A start or target region as presented to the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub region: RegionKey,
    pub idx: CellId,
    pub name: String,
    #[serde(rename = "type")]
    pub cell_type: String,
    pub col: i32,
    pub row: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exhibitors: Vec<Exhibitor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationMetadata {
    pub total_distance_units: f64,
    pub estimated_booths: usize,
    pub total_steps: usize,
    pub turn_count: usize,
    pub coverage_fallback_used: bool,
}

/// Directions for one route. `instructions[i]` renders `steps[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationDocument {
    pub start: RegionInfo,
    pub target: RegionInfo,
    pub steps: Vec<NavigationStep>,
    pub instructions: Vec<String>,
    pub metadata: NavigationMetadata,
}

impl NavigationDocument {
    /// Plain text: a short header followed by the numbered instructions.
    pub fn render_text(&self) -> String {
        let meta = &self.metadata;
        let mut out = String::new();
        let _ = writeln!(out, "From {} to {}", self.start.name, self.target.name);
        let _ = writeln!(
            out,
            "Distance: {:.1} units (about {} booths), {} steps, {} turns",
            meta.total_distance_units, meta.estimated_booths, meta.total_steps, meta.turn_count
        );
        if meta.coverage_fallback_used {
            let _ = writeln!(out, "Note: some steps name the landmark ahead instead of landmarks passed.");
        }
        out.push('\n');
        for (i, line) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "{}. {line}", i + 1);
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(snapshot::write_json(path, self)?)
    }
}

/// A target whose directions could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationFailure {
    pub idx: CellId,
    pub error: String,
}

/// Directions from one start to every routed target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNavigation {
    pub start_idx: CellId,
    pub documents: BTreeMap<CellId, NavigationDocument>,
    pub failures: Vec<NavigationFailure>,
}

impl BatchNavigation {
    /// Writes one `<start>_to_<target>.json` and `.txt` per document.
    pub fn save_all(&self, dir: &Path) -> Result<usize> {
        for (target, document) in &self.documents {
            let stem = format!("{}_to_{}", self.start_idx, target);
            document.save(&dir.join(format!("{stem}.json")))?;
            let text_path = dir.join(format!("{stem}.txt"));
            std::fs::write(&text_path, document.render_text()).map_err(|source| {
                expo_nav_grid::Error::Io {
                    path: text_path.clone(),
                    source,
                }
            })?;
        }
        Ok(self.documents.len())
    }
}
