// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! English instruction templates.
//!
//! Every booth count in a sentence is the length of the step's selected
//! landmark sequence, the same list whose names the sentence prints.

use crate::analyzer::{Action, NavigationStep};
use crate::config::Phrasing;
use crate::geometry::Side;

/// Distance grade of a continue step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a> {
    phrasing: &'a Phrasing,
}

impl<'a> Formatter<'a> {
    pub fn new(phrasing: &'a Phrasing) -> Self {
        Self { phrasing }
    }

    pub fn grade(&self, distance: f64) -> Grade {
        if distance <= self.phrasing.short_max_units {
            Grade::Short
        } else if distance <= self.phrasing.medium_max_units {
            Grade::Medium
        } else {
            Grade::Long
        }
    }

    /// Walking time in whole minutes, at least one.
    pub fn minutes(&self, distance: f64) -> usize {
        ((distance / self.phrasing.units_per_minute).round() as usize).max(1)
    }

    /// Rough booth-equivalent length of a route, at least one.
    pub fn estimated_booths(&self, distance: f64) -> usize {
        ((distance / self.phrasing.units_per_booth).round() as usize).max(1)
    }

    /// Renders one step. `start` names the starting region.
    pub fn instruction(&self, step: &NavigationStep, start: &str) -> String {
        match step.action {
            Action::Orient => self.orient(step, start),
            Action::Continue => self.continue_step(step),
            Action::TurnLeft | Action::TurnRight => self.turn(step),
            Action::Arrive => self.arrive(step),
        }
    }

    fn orient(&self, step: &NavigationStep, start: &str) -> String {
        let heading = step
            .heading
            .map(|h| format!(" and head {h}"))
            .unwrap_or_default();
        match step.landmarks.first() {
            Some(ahead) => format!("Start at {start}{heading} towards {}.", ahead.name),
            None => format!("Start at {start}{heading}."),
        }
    }

    fn continue_step(&self, step: &NavigationStep) -> String {
        let names: Vec<&str> = step.landmarks.iter().map(|l| l.name.as_str()).collect();
        let count = step.booth_count();
        let grade = self.grade(step.distance);

        if names.is_empty() {
            return match grade {
                Grade::Short => "Go straight a few steps.".to_string(),
                Grade::Medium => "Continue straight ahead.".to_string(),
                Grade::Long => format!(
                    "Continue straight ahead for about {}.",
                    minutes_phrase(self.minutes(step.distance))
                ),
            };
        }

        let sequence = join_names(&names);
        let passing = match step.side {
            Some(Side::Left) => format!("past {sequence} on your left"),
            Some(Side::Right) => format!("past {sequence} on your right"),
            Some(Side::Crossing) => format!("through {sequence}"),
            Some(Side::Front) | None => format!("towards {sequence}"),
        };
        match grade {
            Grade::Short => format!("Go straight {}, {passing}.", booths_phrase(count)),
            Grade::Medium => format!("Continue {passing}, about {}.", booths_phrase(count)),
            Grade::Long => format!(
                "Continue {passing}, about {}.",
                minutes_phrase(self.minutes(step.distance))
            ),
        }
    }

    fn turn(&self, step: &NavigationStep) -> String {
        let direction = if step.action == Action::TurnRight {
            "right"
        } else {
            "left"
        };
        match (step.landmarks.first(), step.side) {
            (Some(l), Some(Side::Front)) => format!("Turn {direction} in front of {}.", l.name),
            (Some(l), Some(Side::Crossing)) => format!("Turn {direction} inside {}.", l.name),
            (Some(l), _) => format!("Turn {direction} at {}.", l.name),
            (None, _) => format!("Turn {direction}."),
        }
    }

    fn arrive(&self, step: &NavigationStep) -> String {
        let Some(target) = step.landmarks.first() else {
            return "You have arrived.".to_string();
        };
        match step.side {
            Some(Side::Left) => format!("Arrive at {}, on your left.", target.name),
            Some(Side::Right) => format!("Arrive at {}, on your right.", target.name),
            Some(Side::Front) => format!("Arrive at {}, straight ahead.", target.name),
            Some(Side::Crossing) | None => format!("Arrive at {}.", target.name),
        }
    }
}

/// `A`, `A and B`, `A, B and C`.
pub fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

pub fn booths_phrase(count: usize) -> String {
    if count == 1 {
        "1 booth".to_string()
    } else {
        format!("{count} booths")
    }
}

fn minutes_phrase(minutes: usize) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkRef;
    use expo_nav_grid::RegionKey;

    fn landmark(name: &str, side: Side) -> LandmarkRef {
        LandmarkRef {
            region: RegionKey::Booth(name.into()),
            name: name.into(),
            side,
            coverage: 0.5,
        }
    }

    fn continue_step(distance: f64, side: Option<Side>, names: &[&str]) -> NavigationStep {
        NavigationStep {
            action: Action::Continue,
            distance,
            heading: None,
            side,
            landmarks: names
                .iter()
                .map(|n| landmark(n, side.unwrap_or(Side::Front)))
                .collect(),
            coverage_fallback_used: false,
            path_range: [0, distance as usize],
        }
    }

    #[test]
    fn joins_sequences() {
        assert_eq!(join_names(&["A"]), "A");
        assert_eq!(join_names(&["A", "B"]), "A and B");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B and C");
    }

    #[test]
    fn distance_grades() {
        let phrasing = Phrasing::default();
        let f = Formatter::new(&phrasing);

        let short = continue_step(3.0, Some(Side::Left), &["Acme", "Zeta"]);
        assert_eq!(f.instruction(&short, ""), "Go straight 2 booths, past Acme and Zeta on your left.");

        let medium = continue_step(9.0, Some(Side::Right), &["Acme"]);
        assert_eq!(f.instruction(&medium, ""), "Continue past Acme on your right, about 1 booth.");

        let long = continue_step(50.0, Some(Side::Left), &["Acme", "Bolt", "Core"]);
        assert_eq!(
            f.instruction(&long, ""),
            "Continue past Acme, Bolt and Core on your left, about 3 minutes."
        );

        let bare = continue_step(16.0, None, &[]);
        assert_eq!(f.instruction(&bare, ""), "Continue straight ahead for about 1 minute.");
    }

    #[test]
    fn estimates_never_reach_zero() {
        let phrasing = Phrasing::default();
        let f = Formatter::new(&phrasing);
        assert_eq!(f.minutes(2.0), 1);
        assert_eq!(f.minutes(70.0), 4);
        assert_eq!(f.estimated_booths(0.5), 1);
        assert_eq!(f.estimated_booths(10.0), 4);
    }
}
