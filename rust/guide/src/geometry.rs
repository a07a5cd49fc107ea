// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane geometry in unit space.
//!
//! Rows grow downward, so for a heading `h` and an offset `v` a positive
//! `h.perp(&v)` means `v` lies to the walker's right.

use expo_nav_grid::Unit;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

/// Offset or heading in unit space (x = columns, y = rows).
pub type Vec2 = Vector2<f64>;

/// Unit-space helpers for [`Vec2`].
pub trait PlaneVector: Sized {
    /// Offset from `a` to `b`.
    fn between(a: Unit, b: Unit) -> Self;

    /// Offset from a unit to an arbitrary point.
    fn to_point(a: Unit, point: (f64, f64)) -> Self;

    /// Unit-length copy; `None` for a zero vector.
    fn direction(&self) -> Option<Self>;

    /// Cosine of the angle to `other`; `None` if either is zero.
    fn cos_to(&self, other: &Self) -> Option<f64>;

    /// Unsigned angle to `other` in degrees.
    fn angle_to(&self, other: &Self) -> Option<f64> {
        self.cos_to(other).map(|c| c.acos().to_degrees())
    }
}

impl PlaneVector for Vec2 {
    fn between(a: Unit, b: Unit) -> Self {
        Vec2::new((b.col - a.col) as f64, (b.row - a.row) as f64)
    }

    fn to_point(a: Unit, (x, y): (f64, f64)) -> Self {
        Vec2::new(x - a.col as f64, y - a.row as f64)
    }

    fn direction(&self) -> Option<Self> {
        self.try_normalize(EPSILON)
    }

    fn cos_to(&self, other: &Self) -> Option<f64> {
        let a = self.direction()?;
        let b = other.direction()?;
        Some(a.dot(&b).clamp(-1.0, 1.0))
    }
}

/// Where something lies relative to a walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The path runs through it.
    Crossing,
    Left,
    Right,
    Front,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Crossing, Side::Left, Side::Right, Side::Front];

    pub fn index(self) -> usize {
        match self {
            Side::Crossing => 0,
            Side::Left => 1,
            Side::Right => 2,
            Side::Front => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Crossing => "crossing",
            Side::Left => "left",
            Side::Right => "right",
            Side::Front => "front",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-to-point side classification.
///
/// Returns `None` when the side is ambiguous: the point coincides with the
/// origin or lies straight behind it.
pub fn classify(heading: Vec2, offset: Vec2, front_cos: f64) -> Option<Side> {
    let cos = heading.cos_to(&offset)?;
    if cos >= front_cos {
        return Some(Side::Front);
    }
    let h = heading.direction()?;
    let o = offset.direction()?;
    let cross = h.perp(&o);
    if cross > EPSILON {
        Some(Side::Right)
    } else if cross < -EPSILON {
        Some(Side::Left)
    } else {
        None
    }
}

/// Eight-way compass heading; north is decreasing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Compass {
    pub fn from_vec(v: Vec2) -> Option<Self> {
        v.direction()?;
        // Angle measured clockwise from north.
        let degrees = v.x.atan2(-v.y).to_degrees().rem_euclid(360.0);
        let sector = ((degrees + 22.5) / 45.0).floor() as usize % 8;
        Some(
            [
                Compass::North,
                Compass::NorthEast,
                Compass::East,
                Compass::SouthEast,
                Compass::South,
                Compass::SouthWest,
                Compass::West,
                Compass::NorthWest,
            ][sector],
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compass::North => "north",
            Compass::NorthEast => "north-east",
            Compass::East => "east",
            Compass::SouthEast => "south-east",
            Compass::South => "south",
            Compass::SouthWest => "south-west",
            Compass::West => "west",
            Compass::NorthWest => "north-west",
        }
    }
}

impl std::fmt::Display for Compass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn east() -> Vec2 {
        Vec2::new(1.0, 0.0)
    }

    #[test]
    fn right_is_positive_cross_with_rows_down() {
        // Walking east, the next row down is on the right.
        assert_eq!(classify(east(), Vec2::new(0.0, 1.0), 0.966), Some(Side::Right));
        assert_eq!(classify(east(), Vec2::new(0.0, -1.0), 0.966), Some(Side::Left));
        assert_eq!(classify(east(), Vec2::new(5.0, 0.5), 0.966), Some(Side::Front));
        assert_eq!(classify(east(), Vec2::new(-3.0, 0.0), 0.966), None);
        assert_eq!(classify(east(), Vec2::new(0.0, 0.0), 0.966), None);
    }

    #[test]
    fn wide_cone_catches_diagonals() {
        let offset = Vec2::new(2.0, 1.9);
        assert_eq!(classify(east(), offset, 0.966), Some(Side::Right));
        assert_eq!(classify(east(), offset, 0.707), Some(Side::Front));
    }

    #[test]
    fn angles_and_compass() {
        assert_relative_eq!(east().angle_to(&Vec2::new(1.0, 1.0)).unwrap(), 45.0, epsilon = 1e-9);
        assert_eq!(Compass::from_vec(Vec2::new(0.0, -1.0)), Some(Compass::North));
        assert_eq!(Compass::from_vec(east()), Some(Compass::East));
        assert_eq!(Compass::from_vec(Vec2::new(-1.0, 1.0)), Some(Compass::SouthWest));
        assert_eq!(Compass::from_vec(Vec2::new(0.0, 0.0)), None);
    }
}
