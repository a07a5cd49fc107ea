// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping between logical units and source-image pixels.

use serde::{Deserialize, Serialize};

use crate::cell::Unit;

fn default_unit() -> f64 {
    186.0
}

/// Pixel size of one logical unit and the pixel origin of unit `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMeta {
    #[serde(default = "default_unit")]
    pub unit_w: f64,
    #[serde(default = "default_unit")]
    pub unit_h: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
}

impl Default for GridMeta {
    fn default() -> Self {
        Self {
            unit_w: default_unit(),
            unit_h: default_unit(),
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

impl GridMeta {
    /// Pixel position of the top-left corner of `unit`.
    pub fn grid_to_pixel(&self, unit: Unit) -> (f64, f64) {
        (
            self.origin_x + unit.col as f64 * self.unit_w,
            self.origin_y + unit.row as f64 * self.unit_h,
        )
    }

    /// Pixel position of the centre of `unit`.
    pub fn unit_center(&self, unit: Unit) -> (f64, f64) {
        let (x, y) = self.grid_to_pixel(unit);
        (x + self.unit_w / 2.0, y + self.unit_h / 2.0)
    }

    /// Nearest unit origin to a pixel position.
    pub fn pixel_to_grid(&self, x: f64, y: f64) -> Unit {
        Unit::new(
            ((x - self.origin_x) / self.unit_w).round() as i32,
            ((y - self.origin_y) / self.unit_h).round() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pixel_conversion() {
        let meta = GridMeta {
            origin_x: 40.0,
            origin_y: 12.0,
            ..GridMeta::default()
        };
        let (x, y) = meta.grid_to_pixel(Unit::new(2, 3));
        assert_relative_eq!(x, 412.0);
        assert_relative_eq!(y, 570.0);
        assert_eq!(meta.pixel_to_grid(x + 80.0, y - 80.0), Unit::new(2, 3));
        assert_eq!(meta.pixel_to_grid(x + 100.0, y), Unit::new(3, 3));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let meta: GridMeta = serde_json::from_str(r#"{"origin_x": 5}"#).unwrap();
        assert_eq!(meta.unit_w, 186.0);
        assert_eq!(meta.origin_x, 5.0);
    }
}
