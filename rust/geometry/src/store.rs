// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named geometry store with insertion-ordered iteration and merging.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::geometry::{Geometry, Polygon, Polyline};

/// Stores geometries by name.
///
/// Iteration follows insertion order so that downstream output stays
/// deterministic. Inserting under an existing name replaces the geometry
/// but keeps its position.
#[derive(Debug, Default)]
pub struct GeometryStore {
    names: Vec<String>,
    geometries: FxHashMap<String, Geometry>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a geometry, replacing any previous geometry of this name.
    pub fn insert(&mut self, name: impl Into<String>, geometry: Geometry) {
        let name = name.into();
        if !self.geometries.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.geometries.insert(name, geometry);
    }

    /// Removes a geometry by name.
    pub fn remove(&mut self, name: &str) -> Option<Geometry> {
        let removed = self.geometries.remove(name);
        if removed.is_some() {
            self.names.retain(|n| n != name);
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&Geometry> {
        self.geometries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.geometries.contains_key(name)
    }

    /// Geometry names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Builds the composite of the named geometries.
    ///
    /// Point vectors are concatenated with exact coordinate duplicates
    /// collapsed; polyline and polygon indices are remapped accordingly.
    /// The result follows the given name order, so merging is
    /// deterministic.
    pub fn merged(&self, names: &[String]) -> Result<Geometry> {
        if names.is_empty() {
            return Err(Error::EmptyMerge("no geometry names given".into()));
        }

        let mut merged = Geometry::new();
        let mut seen: FxHashMap<(u64, u64, u64), usize> = FxHashMap::default();

        for name in names {
            let geometry = self
                .get(name)
                .ok_or_else(|| Error::UnknownGeometry(name.clone()))?;

            let mut remap = Vec::with_capacity(geometry.points.len());
            for point in &geometry.points {
                let next = merged.points.len();
                let idx = *seen.entry(point_key(point)).or_insert(next);
                if idx == next {
                    merged.points.push(*point);
                }
                remap.push(idx);
            }

            merged.stations.extend_from_slice(&geometry.stations);
            for polyline in &geometry.polylines {
                merged.polylines.push(Polyline {
                    points: polyline.points.iter().map(|&i| remap[i]).collect(),
                });
            }
            for polygon in &geometry.polygons {
                merged.polygons.push(Polygon {
                    ring: polygon.ring.iter().map(|&i| remap[i]).collect(),
                });
            }
        }

        Ok(merged)
    }

    /// Merges the named geometries into a new named geometry in the
    /// store, replacing any geometry already stored under `merged_name`.
    pub fn merge(&mut self, names: &[String], merged_name: impl Into<String>) -> Result<()> {
        let merged = self.merged(names)?;
        self.insert(merged_name, merged);
        Ok(())
    }
}

/// Exact bit-pattern key for coordinate deduplication.
fn point_key(p: &Point3<f64>) -> (u64, u64, u64) {
    (p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_point(x: f64) -> Geometry {
        let mut geometry = Geometry::new();
        geometry.add_point(Point3::new(x, 0.0, 0.0));
        geometry
    }

    #[test]
    fn names_keep_insertion_order() {
        let mut store = GeometryStore::new();
        store.insert("b", named_point(1.0));
        store.insert("a", named_point(2.0));
        store.insert("c", named_point(3.0));
        assert_eq!(store.names(), &["b", "a", "c"]);
    }

    #[test]
    fn replacement_keeps_position() {
        let mut store = GeometryStore::new();
        store.insert("b", named_point(1.0));
        store.insert("a", named_point(2.0));
        store.insert("b", named_point(9.0));
        assert_eq!(store.names(), &["b", "a"]);
        assert_eq!(store.get("b").unwrap().points[0].x, 9.0);
    }

    #[test]
    fn remove_forgets_name() {
        let mut store = GeometryStore::new();
        store.insert("a", named_point(1.0));
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn merged_remaps_indices_and_collapses_duplicates() {
        let mut first = Geometry::new();
        first.add_point(Point3::new(0.0, 0.0, 0.0));
        first.add_point(Point3::new(1.0, 0.0, 0.0));
        first.add_polyline(vec![0, 1]).unwrap();

        let mut second = Geometry::new();
        second.add_point(Point3::new(1.0, 0.0, 0.0)); // duplicate of first[1]
        second.add_point(Point3::new(2.0, 0.0, 0.0));
        second.add_polyline(vec![0, 1]).unwrap();

        let mut store = GeometryStore::new();
        store.insert("first", first);
        store.insert("second", second);

        let merged = store
            .merged(&["first".to_string(), "second".to_string()])
            .unwrap();
        assert_eq!(merged.points.len(), 3);
        assert_eq!(merged.polylines[0].points, vec![0, 1]);
        assert_eq!(merged.polylines[1].points, vec![1, 2]);
    }

    #[test]
    fn merged_rejects_unknown_name() {
        let store = GeometryStore::new();
        let err = store.merged(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::UnknownGeometry(_)));
    }

    #[test]
    fn merged_rejects_empty_selection() {
        let store = GeometryStore::new();
        assert!(matches!(store.merged(&[]), Err(Error::EmptyMerge(_))));
    }

    #[test]
    fn merge_stores_composite_under_new_name() {
        let mut store = GeometryStore::new();
        store.insert("a", named_point(1.0));
        store.insert("b", named_point(2.0));
        store
            .merge(&["a".to_string(), "b".to_string()], "both")
            .unwrap();
        assert_eq!(store.get("both").unwrap().points.len(), 2);
        assert_eq!(store.names(), &["a", "b", "both"]);
    }
}
