// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exhibitor directory: optional per-booth enrichment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One exhibitor listed at a booth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exhibitor {
    pub booth_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Exhibitors grouped by booth identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExhibitorDirectory {
    by_booth: BTreeMap<String, Vec<Exhibitor>>,
}

impl ExhibitorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups a flat exhibitor list; entries with a blank booth id are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = Exhibitor>) -> Self {
        let mut directory = Self::new();
        for entry in entries {
            directory.insert(entry);
        }
        directory
    }

    pub fn insert(&mut self, mut entry: Exhibitor) {
        entry.booth_id = entry.booth_id.trim().to_string();
        if entry.booth_id.is_empty() {
            return;
        }
        self.by_booth
            .entry(entry.booth_id.clone())
            .or_default()
            .push(entry);
    }

    /// Exhibitors at `booth_id`, in listing order. Empty when unknown.
    pub fn exhibitors(&self, booth_id: &str) -> &[Exhibitor] {
        self.by_booth
            .get(booth_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of booths with at least one exhibitor.
    pub fn len(&self) -> usize {
        self.by_booth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_booth.is_empty()
    }
}
