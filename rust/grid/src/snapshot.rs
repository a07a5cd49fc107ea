// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading and saving snapshot files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cell::Cell;
use crate::directory::{Exhibitor, ExhibitorDirectory};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::meta::GridMeta;
use crate::types::TypeMetadata;

/// Reads and parses a JSON file, attaching the path to any error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_cells(path: &Path) -> Result<Vec<Cell>> {
    let cells: Vec<Cell> = read_json(path)?;
    tracing::debug!(path = %path.display(), cells = cells.len(), "loaded cells");
    Ok(cells)
}

pub fn load_types(path: &Path) -> Result<TypeMetadata> {
    read_json(path)
}

pub fn load_meta(path: &Path) -> Result<GridMeta> {
    read_json(path)
}

pub fn load_directory(path: &Path) -> Result<ExhibitorDirectory> {
    let entries: Vec<Exhibitor> = read_json(path)?;
    Ok(ExhibitorDirectory::from_entries(entries))
}

/// Loads cells and type metadata and validates them into a [`Grid`].
pub fn load_grid(cells: &Path, types: &Path) -> Result<Grid> {
    Grid::build(load_cells(cells)?, load_types(types)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("expo-nav-grid-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_grid_from_files() {
        let dir = temp_dir("load");
        let cells = dir.join("cells.json");
        let types = dir.join("types.json");
        fs::write(
            &cells,
            r#"[{"idx": 1, "x": 0, "y": 0, "w": 186, "h": 186, "col": 0, "row": 0, "type": "road"}]"#,
        )
        .unwrap();
        fs::write(&types, r#"{"road": {"is_walkable": true}}"#).unwrap();

        let grid = load_grid(&cells, &types).unwrap();
        assert_eq!(grid.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn errors_carry_the_path() {
        let dir = temp_dir("errors");
        let missing = dir.join("missing.json");
        let err = load_cells(&missing).unwrap_err();
        assert!(matches!(&err, Error::Io { path, .. } if path == &missing));

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = load_types(&broken).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        fs::remove_dir_all(&dir).ok();
    }
}
