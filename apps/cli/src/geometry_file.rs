// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON geometry file loading.
//!
//! ```json
//! {
//!   "name": "site",
//!   "points": [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]],
//!   "stations": [[5.0, 5.0, 0.0]],
//!   "polylines": [[0, 1]],
//!   "polygons": [[0, 1, 2, 3]]
//! }
//! ```
//!
//! Polyline and polygon entries index into `points`; rings are
//! implicitly closed.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use meshprep_geometry::{Geometry, Point3};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GeometryFile {
    name: String,
    points: Vec<[f64; 3]>,
    #[serde(default)]
    stations: Vec<[f64; 3]>,
    #[serde(default)]
    polylines: Vec<Vec<usize>>,
    #[serde(default)]
    polygons: Vec<Vec<usize>>,
}

/// Loads one JSON geometry file into a named geometry.
pub fn load(path: &str) -> Result<(String, Geometry)> {
    let file = File::open(path).with_context(|| format!("cannot open '{}'", path))?;
    let parsed: GeometryFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse '{}'", path))?;

    let mut geometry = Geometry::new();
    for [x, y, z] in parsed.points {
        geometry.add_point(Point3::new(x, y, z));
    }
    for [x, y, z] in parsed.stations {
        geometry.add_station(Point3::new(x, y, z));
    }
    for points in parsed.polylines {
        geometry
            .add_polyline(points)
            .with_context(|| format!("invalid polyline in '{}'", path))?;
    }
    for ring in parsed.polygons {
        geometry
            .add_polygon(ring)
            .with_context(|| format!("invalid polygon in '{}'", path))?;
    }
    Ok((parsed.name, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("meshprep-cli-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn loads_a_full_geometry() {
        let path = write_temp(
            "site.json",
            r#"{
                "name": "site",
                "points": [[0, 0, 0], [10, 0, 0], [10, 10, 0], [0, 10, 0]],
                "stations": [[5, 5, 0]],
                "polygons": [[0, 1, 2, 3]]
            }"#,
        );
        let (name, geometry) = load(&path).unwrap();
        assert_eq!(name, "site");
        assert_eq!(geometry.points.len(), 4);
        assert_eq!(geometry.stations.len(), 1);
        assert_eq!(geometry.polygons.len(), 1);
        assert!(geometry.polylines.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn out_of_range_ring_indices_fail() {
        let path = write_temp(
            "bad.json",
            r#"{
                "name": "bad",
                "points": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                "polygons": [[0, 1, 7]]
            }"#,
        );
        let result = load(&path);
        assert!(result.is_err());
        let _ = std::fs::remove_file(path);
    }
}
