// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directions for routes over small hand-drawn floors.

use approx::assert_relative_eq;
use expo_nav_grid::{Cell, Grid, RegionKey, TypeInfo, TypeMetadata};
use expo_nav_guide::{analyze, Action, Destination, NavConfig, NavigationDocument, Navigator, Side};
use expo_nav_path::{find_route, precompute, CostMatrix, PathOptions, Route, Router};

/// `.` road, `#` wall; any letter is a one-unit booth named `Booth <letter>`.
fn floor(rows: &[&str]) -> Grid {
    let types = TypeMetadata::new()
        .with("road", TypeInfo::walkable(1.0))
        .with("wall", TypeInfo::obstacle())
        .with("booth", TypeInfo::obstacle().landmark());
    let mut cells = Vec::new();
    for (r, line) in rows.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            let id = cells.len() as u32 + 1;
            let cell = match ch {
                '.' => Cell::new(id, c as i32, r as i32, 1, 1, "road"),
                '#' => Cell::new(id, c as i32, r as i32, 1, 1, "wall"),
                other => Cell::new(id, c as i32, r as i32, 1, 1, "booth")
                    .with_booth(&other.to_string())
                    .with_name(&format!("Booth {other}")),
            };
            cells.push(cell);
        }
    }
    Grid::build(cells, types).unwrap()
}

fn booth(id: &str) -> RegionKey {
    RegionKey::Booth(id.into())
}

fn route(grid: &Grid, from: &str, to: &str) -> Route {
    find_route(grid, &booth(from), &booth(to), &PathOptions::default())
        .unwrap()
        .into_route()
        .unwrap()
}

/// Straight corridor from S to T. Booth A lines six of its ten positions on
/// the left, booth B a single one.
fn gallery() -> Grid {
    floor(&[
        "##B##AAAAAA#",
        "S..........T",
        "############",
    ])
}

fn navigate(grid: &Grid, config: NavConfig, from: &str, to: &str) -> NavigationDocument {
    let route = route(grid, from, to);
    let navigator = Navigator::new(grid, None, config).unwrap();
    navigator.navigate(&route, &booth(from), &booth(to)).unwrap()
}

#[test]
fn long_side_booth_is_cited_and_short_one_is_not() {
    let grid = gallery();
    let doc = navigate(&grid, NavConfig::default(), "S", "T");

    let actions: Vec<Action> = doc.steps.iter().map(|s| s.action).collect();
    assert_eq!(actions, vec![Action::Orient, Action::Continue, Action::Arrive]);

    let walk = &doc.steps[1];
    assert_relative_eq!(walk.distance, 9.0);
    assert_eq!(walk.side, Some(Side::Left));
    assert_eq!(walk.landmarks.len(), 1);
    assert_eq!(walk.landmarks[0].name, "Booth A");
    assert_relative_eq!(walk.landmarks[0].coverage, 0.6);
    assert!(!walk.coverage_fallback_used);

    assert_eq!(doc.instructions[0], "Start at Booth S and head east.");
    assert_eq!(doc.instructions[1], "Continue past Booth A on your left, about 1 booth.");
    assert_eq!(doc.instructions[2], "Arrive at Booth T, straight ahead.");
}

#[test]
fn lowering_the_threshold_brings_in_the_short_booth_in_path_order() {
    let grid = gallery();
    let mut config = NavConfig::default();
    config.sequence_selection.min_coverage_threshold = 0.05;
    let doc = navigate(&grid, config, "S", "T");

    let names: Vec<&str> = doc.steps[1].landmarks.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Booth B", "Booth A"]);
    assert_eq!(
        doc.instructions[1],
        "Continue past Booth B and Booth A on your left, about 2 booths."
    );
}

#[test]
fn short_walk_past_a_booth_cites_it_on_its_side() {
    // Four units of walking, too short for the hybrid side rule; booth A is
    // abeam on the left for two of the five positions.
    let grid = floor(&[
        "###AA##",
        "S.....T",
        "#######",
    ]);
    let doc = navigate(&grid, NavConfig::default(), "S", "T");

    let walk = &doc.steps[1];
    assert_eq!(walk.action, Action::Continue);
    assert_relative_eq!(walk.distance, 4.0);
    assert_eq!(walk.side, Some(Side::Left));
    assert_eq!(walk.landmarks.len(), 1);
    assert_relative_eq!(walk.landmarks[0].coverage, 0.4);
    assert!(!walk.coverage_fallback_used);
    assert!(!doc.metadata.coverage_fallback_used);
    assert_eq!(doc.instructions[1], "Continue past Booth A on your left, about 1 booth.");
}

#[test]
fn neighbouring_booths_get_a_zero_length_document() {
    let grid = floor(&["S.T"]);
    let route = route(&grid, "S", "T");
    assert_eq!(route.steps, 0);
    assert!(route.length == 0.0 && route.length.is_sign_positive());
    let json = serde_json::to_string(&route).unwrap();
    assert!(json.contains("\"length\":0.0"));

    let navigator = Navigator::new(&grid, None, NavConfig::default()).unwrap();
    let doc = navigator.navigate(&route, &booth("S"), &booth("T")).unwrap();
    assert!(doc.metadata.total_distance_units.is_sign_positive());
    assert_eq!(doc.instructions, vec!["Start at Booth S.", "Arrive at Booth T."]);
}

#[test]
fn metadata_matches_the_route() {
    let grid = gallery();
    let route = route(&grid, "S", "T");
    let navigator = Navigator::new(&grid, None, NavConfig::default()).unwrap();
    let doc = navigator.navigate(&route, &booth("S"), &booth("T")).unwrap();

    let walked: f64 = doc
        .steps
        .iter()
        .filter(|s| s.action == Action::Continue)
        .map(|s| s.distance)
        .sum();
    assert_relative_eq!(walked, route.length);
    assert_relative_eq!(doc.metadata.total_distance_units, route.length);
    assert_eq!(doc.metadata.estimated_booths, 4);
    assert_eq!(doc.metadata.total_steps, doc.steps.len());
    assert_eq!(doc.metadata.turn_count, 0);
    assert_eq!(doc.instructions.len(), doc.steps.len());

    for step in &doc.steps {
        for landmark in &step.landmarks {
            assert!((0.0..=1.0).contains(&landmark.coverage));
        }
    }
}

#[test]
fn start_and_target_are_never_cited_along_the_way() {
    // S runs along the top; the only way out drops to the lower corridor,
    // which passes S two units to the left.
    let grid = floor(&[
        "#SSSSS#####",
        "#.#########",
        "#.........T",
        "###########",
    ]);
    let config = NavConfig::default();
    let route = route(&grid, "S", "T");
    let navigator = Navigator::new(&grid, None, config.clone()).unwrap();
    let doc = navigator.navigate(&route, &booth("S"), &booth("T")).unwrap();

    assert_eq!(doc.metadata.turn_count, 1);
    assert_eq!(doc.steps[2].action, Action::TurnLeft);
    let along_the_way = &doc.steps[..doc.steps.len() - 1];
    assert!(along_the_way
        .iter()
        .flat_map(|s| &s.landmarks)
        .all(|l| l.region != booth("S") && l.region != booth("T")));

    // Without the exclusion the start booth would be the left-hand landmark.
    let target = grid.region(&booth("T")).unwrap();
    let unfiltered = analyze(
        &route.unit_path,
        navigator.landmarks(),
        &[],
        Destination {
            region: target,
            name: "Booth T",
        },
        &config,
    );
    assert!(unfiltered
        .iter()
        .flat_map(|s| &s.landmarks)
        .any(|l| l.region == booth("S") && l.side == Side::Left));
}

#[test]
fn front_fallback_is_reported() {
    let grid = floor(&[
        "S....F",
        "####.#",
        "####.#",
        "####T#",
    ]);
    let mut config = NavConfig::default();
    config.sequence_selection.min_coverage_threshold = 0.9;
    let doc = navigate(&grid, config, "S", "T");

    assert!(doc.metadata.coverage_fallback_used);
    let walk = &doc.steps[1];
    assert!(walk.coverage_fallback_used);
    assert_eq!(walk.side, Some(Side::Front));
    assert_eq!(doc.instructions[1], "Go straight 1 booth, towards Booth F.");
    assert_eq!(doc.instructions[2], "Turn right in front of Booth F.");
    assert_eq!(doc.instructions.last().unwrap(), "Arrive at Booth T, straight ahead.");
    assert!(doc.render_text().contains("Note:"));

    let strict = navigate(&grid, NavConfig::default(), "S", "T");
    assert!(!strict.metadata.coverage_fallback_used);
}

#[test]
fn text_and_json_come_from_the_same_steps() {
    let grid = gallery();
    let doc = navigate(&grid, NavConfig::default(), "S", "T");

    let json = serde_json::to_string(&doc).unwrap();
    let back: NavigationDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back.instructions, doc.instructions);
    assert_eq!(back.steps.len(), doc.steps.len());
    for (a, b) in back.steps.iter().zip(&doc.steps) {
        assert_eq!(a.action, b.action);
        assert_eq!(a.side, b.side);
        assert_eq!(a.landmarks.len(), b.landmarks.len());
        assert_eq!(a.path_range, b.path_range);
    }

    let text = doc.render_text();
    assert!(text.starts_with("From Booth S to Booth T"));
    for (i, line) in doc.instructions.iter().enumerate() {
        assert!(text.contains(&format!("{}. {line}", i + 1)));
    }
}

#[test]
fn repeated_runs_are_identical() {
    let grid = gallery();
    let a = serde_json::to_string(&navigate(&grid, NavConfig::default(), "S", "T")).unwrap();
    let b = serde_json::to_string(&navigate(&grid, NavConfig::default(), "S", "T")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn batch_navigation_covers_every_routed_target() {
    let grid = gallery();
    let options = PathOptions::default();
    let matrix = CostMatrix::build(&grid, &options);
    let router = Router::new(&grid, &matrix, &options).unwrap();
    let batch = precompute(&router, &booth("S"), None).unwrap();
    assert_eq!(batch.statistics.successful, 3);

    let navigator = Navigator::new(&grid, None, NavConfig::default()).unwrap();
    let navigation = navigator.navigate_batch(&batch);
    assert!(navigation.failures.is_empty());
    assert_eq!(navigation.documents.len(), 3);
    for (idx, doc) in &navigation.documents {
        assert_eq!(doc.target.idx, *idx);
        assert_eq!(doc.start.name, "Booth S");
    }

    let dir = std::env::temp_dir().join(format!("expo-nav-guide-batch-{}", std::process::id()));
    let written = navigation.save_all(&dir).unwrap();
    assert_eq!(written, 3);
    let files = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(files, 6);
    std::fs::remove_dir_all(&dir).unwrap();
}
