// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry containers: points, stations, polylines, and polygons.
//!
//! Points are stored once per geometry; polylines and polygons reference
//! them by index. A polygon ring is implicitly closed (the last vertex
//! connects back to the first) and never repeats its first vertex.

use nalgebra::Point3;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

/// An open chain of point indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polyline {
    /// Vertices as indices into the owning geometry's point vector.
    pub points: Vec<usize>,
}

/// A closed ring of point indices, first vertex not repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    /// Ring vertices as indices into the owning geometry's point vector.
    pub ring: Vec<usize>,
}

/// A collection of points, stations, polylines, and polygons.
///
/// Stations are measurement locations (boreholes, observation wells) kept
/// separate from the geometric points; they can be pinned as mesh
/// constraints during writing.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub points: Vec<Point3<f64>>,
    pub stations: Vec<Point3<f64>>,
    pub polylines: Vec<Polyline>,
    pub polygons: Vec<Polygon>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point and returns its index.
    pub fn add_point(&mut self, point: Point3<f64>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Adds a station and returns its index (stations are indexed
    /// independently of points).
    pub fn add_station(&mut self, station: Point3<f64>) -> usize {
        self.stations.push(station);
        self.stations.len() - 1
    }

    /// Adds a polyline over existing point indices and returns its index.
    ///
    /// A polyline needs at least two vertices, all referencing existing
    /// points.
    pub fn add_polyline(&mut self, points: Vec<usize>) -> Result<usize> {
        if points.len() < 2 {
            return Err(Error::InvalidPolyline(format!(
                "expected at least 2 vertices, got {}",
                points.len()
            )));
        }
        if let Some(&bad) = points.iter().find(|&&i| i >= self.points.len()) {
            return Err(Error::InvalidPolyline(format!(
                "vertex index {} is out of range ({} points)",
                bad,
                self.points.len()
            )));
        }
        self.polylines.push(Polyline { points });
        Ok(self.polylines.len() - 1)
    }

    /// Adds a polygon ring over existing point indices and returns its
    /// index.
    ///
    /// The ring must reference at least three distinct existing points
    /// and must not repeat its first vertex at the end.
    pub fn add_polygon(&mut self, ring: Vec<usize>) -> Result<usize> {
        if ring.len() > 1 && ring.first() == ring.last() {
            return Err(Error::InvalidPolygon(
                "ring is implicitly closed, do not repeat the first vertex".into(),
            ));
        }
        if let Some(&bad) = ring.iter().find(|&&i| i >= self.points.len()) {
            return Err(Error::InvalidPolygon(format!(
                "vertex index {} is out of range ({} points)",
                bad,
                self.points.len()
            )));
        }
        let distinct: FxHashSet<usize> = ring.iter().copied().collect();
        if distinct.len() < 3 {
            return Err(Error::InvalidPolygon(format!(
                "expected at least 3 distinct vertices, got {}",
                distinct.len()
            )));
        }
        self.polygons.push(Polygon { ring });
        Ok(self.polygons.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Geometry {
        let mut geometry = Geometry::new();
        geometry.add_point(Point3::new(0.0, 0.0, 0.0));
        geometry.add_point(Point3::new(1.0, 0.0, 0.0));
        geometry.add_point(Point3::new(1.0, 1.0, 0.0));
        geometry.add_point(Point3::new(0.0, 1.0, 0.0));
        geometry
    }

    #[test]
    fn polygon_over_square() {
        let mut geometry = unit_square();
        let idx = geometry.add_polygon(vec![0, 1, 2, 3]).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(geometry.polygons[0].ring, vec![0, 1, 2, 3]);
    }

    #[test]
    fn polygon_rejects_repeated_closing_vertex() {
        let mut geometry = unit_square();
        let err = geometry.add_polygon(vec![0, 1, 2, 3, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidPolygon(_)));
    }

    #[test]
    fn polygon_rejects_too_few_distinct_vertices() {
        let mut geometry = unit_square();
        let err = geometry.add_polygon(vec![0, 1, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidPolygon(_)));
    }

    #[test]
    fn polygon_rejects_out_of_range_vertex() {
        let mut geometry = unit_square();
        let err = geometry.add_polygon(vec![0, 1, 9]).unwrap_err();
        assert!(matches!(err, Error::InvalidPolygon(_)));
    }

    #[test]
    fn polyline_needs_two_vertices() {
        let mut geometry = unit_square();
        assert!(geometry.add_polyline(vec![0]).is_err());
        assert!(geometry.add_polyline(vec![0, 2]).is_ok());
    }

    #[test]
    fn stations_are_indexed_independently() {
        let mut geometry = unit_square();
        let idx = geometry.add_station(Point3::new(0.5, 0.5, 0.0));
        assert_eq!(idx, 0);
        assert_eq!(geometry.points.len(), 4);
        assert_eq!(geometry.stations.len(), 1);
    }
}
