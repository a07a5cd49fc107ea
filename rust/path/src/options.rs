// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Movement policy for one search.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Every movement-cost policy the engine supports, in one place.
///
/// The same search runs for all combinations; only its successor and cost
/// functions consult these flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// 8-connected movement instead of the 4-connected default.
    pub allow_diagonal: bool,
    /// Penalty added whenever the movement direction changes.
    pub turn_weight: f64,
    /// Let the search cut through large-area types (halls, stages).
    pub allow_enter_large_area: bool,
    /// Minimum cost multiplier for large-area units when entered.
    pub large_area_cost: f64,
    /// How far (in units) to look for walkable units around a region.
    pub anchor_search_radius: u32,
    /// Upper bound on expanded search states; `None` disables the bound.
    pub max_expansions: Option<usize>,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: false,
            turn_weight: 0.0,
            allow_enter_large_area: false,
            large_area_cost: 2.0,
            anchor_search_radius: 8,
            max_expansions: Some(2_000_000),
        }
    }
}

impl PathOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.turn_weight.is_finite() || self.turn_weight < 0.0 {
            return Err(Error::InvalidOption {
                name: "turn_weight",
                reason: format!("must be a non-negative number, got {}", self.turn_weight),
            });
        }
        if !self.large_area_cost.is_finite() || self.large_area_cost <= 0.0 {
            return Err(Error::InvalidOption {
                name: "large_area_cost",
                reason: format!("must be positive, got {}", self.large_area_cost),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: PathOptions =
            serde_json::from_str(r#"{"allow_diagonal": true, "turn_weight": 0.5}"#).unwrap();
        assert!(options.allow_diagonal);
        assert_eq!(options.turn_weight, 0.5);
        assert_eq!(options.anchor_search_radius, 8);
        assert_eq!(options.max_expansions, Some(2_000_000));
    }

    #[test]
    fn negative_turn_weight_is_rejected() {
        let options = PathOptions {
            turn_weight: -1.0,
            ..PathOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
