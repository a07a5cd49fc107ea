// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Navigation configuration.
//!
//! All tunable thresholds live here, grouped by component, and are injected
//! into the analyzer, the selector and the formatter. Values can come from a
//! JSON file, from `EXPO_NAV__SECTION__KEY` environment variables, and from
//! `section.key=value` overrides, applied in that order.

use std::path::Path;

use expo_nav_path::PathOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::Side;

/// Prefix of environment variables read by [`NavConfig::apply_env`].
pub const ENV_PREFIX: &str = "EXPO_NAV__";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub pathfinding: PathOptions,
    pub landmark_detection: LandmarkDetection,
    pub sequence_selection: SequenceSelection,
    pub side_calculation: SideCalculation,
    pub phrasing: Phrasing,
}

/// Which cells are considered as landmarks and how far to look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkDetection {
    /// Chebyshev reach for front-facing candidates, in units.
    pub search_radius: u32,
    /// Maximum lateral distance for left/right candidates, in units.
    pub distance_filter: f64,
    /// Reach around a turn point.
    pub turn_search_radius: u32,
    /// Skip landmarks whose only name is a number.
    pub require_meaningful_name: bool,
}

impl Default for LandmarkDetection {
    fn default() -> Self {
        Self {
            search_radius: 3,
            distance_filter: 2.0,
            turn_search_radius: 2,
            require_meaningful_name: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceSelection {
    pub max_landmarks_per_side: usize,
    /// Weight of coverage against proximity in the ranking score.
    pub coverage_weight: f64,
    pub min_coverage_threshold: f64,
    /// Promote the best front landmark when nothing clears the threshold.
    pub use_front_fallback: bool,
}

impl Default for SequenceSelection {
    fn default() -> Self {
        Self {
            max_landmarks_per_side: 3,
            coverage_weight: 1.0,
            min_coverage_threshold: 0.2,
            use_front_fallback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideCalculation {
    /// Steps at least this long use per-position side voting.
    pub long_segment_threshold: f64,
    /// Cosine of the narrow forward cone.
    pub front_angle_threshold: f64,
    /// Cosine of the wide cone used for point classification.
    pub near_front_threshold: f64,
    pub use_hybrid_method: bool,
    /// Direction changes below this angle continue the current run.
    pub turn_tolerance_deg: f64,
    /// Side assumed when a point cannot be classified.
    pub ambiguous_side: Side,
}

impl Default for SideCalculation {
    fn default() -> Self {
        Self {
            long_segment_threshold: 5.0,
            front_angle_threshold: 0.966,
            near_front_threshold: 0.707,
            use_hybrid_method: true,
            turn_tolerance_deg: 50.0,
            ambiguous_side: Side::Front,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phrasing {
    /// Up to this distance a step is a short booth-count statement.
    pub short_max_units: f64,
    /// Up to this distance a step states a booth count; beyond, a time.
    pub medium_max_units: f64,
    pub units_per_booth: f64,
    pub units_per_minute: f64,
}

impl Default for Phrasing {
    fn default() -> Self {
        Self {
            short_max_units: 3.0,
            medium_max_units: 15.0,
            units_per_booth: 2.5,
            units_per_minute: 20.0,
        }
    }
}

impl NavConfig {
    /// Reads a JSON config file; missing sections and keys keep defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            Error::Grid(expo_nav_grid::Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `section.key=value` overrides in order.
    ///
    /// The value is parsed as JSON when possible (`true`, `0.3`, `null`) and
    /// taken as a string otherwise.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<()> {
        if overrides.is_empty() {
            return Ok(());
        }
        let mut tree =
            serde_json::to_value(&*self).map_err(|e| Error::Serialization(e.to_string()))?;
        for input in overrides {
            set_path(&mut tree, input.as_ref())?;
        }
        let updated: Self = serde_json::from_value(tree).map_err(|e| Error::InvalidOverride {
            input: overrides
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Applies `EXPO_NAV__SECTION__KEY=value` variables from the process
    /// environment.
    pub fn apply_env(&mut self) -> Result<()> {
        let mut overrides: Vec<String> = std::env::vars()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(ENV_PREFIX)?;
                let (section, key) = rest.split_once("__")?;
                Some(format!(
                    "{}.{}={}",
                    section.to_ascii_lowercase(),
                    key.to_ascii_lowercase(),
                    value
                ))
            })
            .collect();
        overrides.sort();
        if !overrides.is_empty() {
            tracing::debug!(count = overrides.len(), "applying config from environment");
        }
        self.apply_overrides(&overrides)
    }

    pub fn validate(&self) -> Result<()> {
        self.pathfinding.validate()?;
        let weight = self.sequence_selection.coverage_weight;
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidConfig {
                key: "sequence_selection.coverage_weight",
                reason: format!("must be within [0, 1], got {weight}"),
            });
        }
        let threshold = self.sequence_selection.min_coverage_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig {
                key: "sequence_selection.min_coverage_threshold",
                reason: format!("must be within [0, 1], got {threshold}"),
            });
        }
        for (key, cos) in [
            ("side_calculation.front_angle_threshold", self.side_calculation.front_angle_threshold),
            ("side_calculation.near_front_threshold", self.side_calculation.near_front_threshold),
        ] {
            if !(-1.0..=1.0).contains(&cos) {
                return Err(Error::InvalidConfig {
                    key,
                    reason: format!("must be a cosine within [-1, 1], got {cos}"),
                });
            }
        }
        let phrasing = &self.phrasing;
        if phrasing.units_per_booth <= 0.0 || phrasing.units_per_minute <= 0.0 {
            return Err(Error::InvalidConfig {
                key: "phrasing",
                reason: "units_per_booth and units_per_minute must be positive".into(),
            });
        }
        if phrasing.short_max_units > phrasing.medium_max_units {
            return Err(Error::InvalidConfig {
                key: "phrasing.short_max_units",
                reason: "must not exceed medium_max_units".into(),
            });
        }
        Ok(())
    }
}

fn set_path(tree: &mut Value, input: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidOverride {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    let (path, raw) = input
        .split_once('=')
        .ok_or_else(|| invalid("expected section.key=value"))?;
    let (section, key) = path
        .trim()
        .split_once('.')
        .ok_or_else(|| invalid("expected section.key=value"))?;

    let slot = tree
        .get_mut(section)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| invalid(&format!("unknown section '{section}'")))?;
    if !slot.contains_key(key) {
        return Err(invalid(&format!("unknown key '{key}' in section '{section}'")));
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    slot.insert(key.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NavConfig::default();
        assert_eq!(config.landmark_detection.search_radius, 3);
        assert_eq!(config.sequence_selection.min_coverage_threshold, 0.2);
        assert_eq!(config.side_calculation.front_angle_threshold, 0.966);
        assert_eq!(config.side_calculation.ambiguous_side, Side::Front);
        assert!(!config.pathfinding.allow_diagonal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: NavConfig = serde_json::from_str(
            r#"{"sequence_selection": {"max_landmarks_per_side": 1},
                "pathfinding": {"allow_diagonal": true}}"#,
        )
        .unwrap();
        assert_eq!(config.sequence_selection.max_landmarks_per_side, 1);
        assert_eq!(config.sequence_selection.coverage_weight, 1.0);
        assert!(config.pathfinding.allow_diagonal);
        assert_eq!(config.phrasing.units_per_minute, 20.0);
    }

    #[test]
    fn overrides_parse_json_scalars_and_strings() {
        let mut config = NavConfig::default();
        config
            .apply_overrides(&[
                "sequence_selection.min_coverage_threshold=0.35",
                "side_calculation.use_hybrid_method=false",
                "side_calculation.ambiguous_side=left",
                "pathfinding.max_expansions=null",
            ])
            .unwrap();
        assert_eq!(config.sequence_selection.min_coverage_threshold, 0.35);
        assert!(!config.side_calculation.use_hybrid_method);
        assert_eq!(config.side_calculation.ambiguous_side, Side::Left);
        assert_eq!(config.pathfinding.max_expansions, None);
    }

    #[test]
    fn bad_overrides_leave_config_untouched() {
        let mut config = NavConfig::default();
        assert!(config.apply_overrides(&["phrasing.nope=1"]).is_err());
        assert!(config.apply_overrides(&["nosection.key=1"]).is_err());
        assert!(config.apply_overrides(&["phrasing"]).is_err());
        assert!(config
            .apply_overrides(&["landmark_detection.search_radius=wide"])
            .is_err());
        assert!(config
            .apply_overrides(&["sequence_selection.coverage_weight=1.5"])
            .is_err());
        assert_eq!(config, NavConfig::default());
    }
}
