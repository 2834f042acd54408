// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Containment forest over reduced polygons.
//!
//! Polygons either nest cleanly or are disjoint; partial overlap and
//! mutual containment are rejected. Each polygon becomes a node whose
//! parent is its innermost container. Loose points, stations and whole
//! polylines attach to the innermost polygon containing them, so the
//! writer can constrain them into the right surface.

use meshprep_geometry::ring::{is_ccw, point_in_ring};
use meshprep_geometry::{Geometry, Point2};
use rustc_hash::FxHashSet;

use crate::error::HierarchyError;

/// One polygon in the forest.
#[derive(Debug)]
pub struct HierarchyNode {
    /// Index of the polygon in the source geometry.
    pub polygon: usize,
    /// Ring vertices in counter-clockwise order.
    pub ring: Vec<Point2<f64>>,
    /// Point indices matching `ring`, same order.
    pub ring_indices: Vec<usize>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Loose geometry points inside this polygon and no deeper one.
    pub points: Vec<usize>,
    /// Stations inside this polygon and no deeper one.
    pub stations: Vec<usize>,
    /// Polylines whose vertices all lie inside this polygon.
    pub polylines: Vec<usize>,
}

/// The nested polygons of a geometry, plus everything that did not fall
/// inside any polygon.
#[derive(Debug)]
pub struct PolygonForest {
    nodes: Vec<HierarchyNode>,
    roots: Vec<usize>,
    pub free_points: Vec<usize>,
    pub free_stations: Vec<usize>,
    pub free_polylines: Vec<usize>,
}

impl PolygonForest {
    /// Nests the geometry's polygons by containment.
    ///
    /// `reduced` holds the plane-reduced positions of the geometry's
    /// points, `reduced_stations` those of its stations. Vertices on a
    /// ring edge count as inside, so a polygon touching another from
    /// within still nests.
    pub fn build(
        geometry: &Geometry,
        reduced: &[Point2<f64>],
        reduced_stations: &[Point2<f64>],
    ) -> Result<Self, HierarchyError> {
        let mut nodes: Vec<HierarchyNode> = geometry
            .polygons
            .iter()
            .enumerate()
            .map(|(polygon, p)| {
                let mut ring_indices = p.ring.clone();
                let mut ring: Vec<Point2<f64>> =
                    ring_indices.iter().map(|&i| reduced[i]).collect();
                if !is_ccw(&ring) {
                    ring_indices.reverse();
                    ring.reverse();
                }
                HierarchyNode {
                    polygon,
                    ring,
                    ring_indices,
                    parent: None,
                    children: Vec::new(),
                    points: Vec::new(),
                    stations: Vec::new(),
                    polylines: Vec::new(),
                }
            })
            .collect();
        let n = nodes.len();

        // contains[i][j]: every vertex of ring j lies inside ring i.
        let mut contains = vec![vec![false; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let inside = nodes[j]
                    .ring
                    .iter()
                    .filter(|v| point_in_ring(v, &nodes[i].ring))
                    .count();
                if inside == nodes[j].ring.len() {
                    contains[i][j] = true;
                } else if inside > 0 {
                    return Err(HierarchyError::Overlap(i.min(j), i.max(j)));
                }
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if contains[i][j] && contains[j][i] {
                    return Err(HierarchyError::CyclicContainment(i, j));
                }
            }
        }

        // Parent = the container contained by all other containers.
        for j in 0..n {
            let containers: Vec<usize> = (0..n).filter(|&c| contains[c][j]).collect();
            nodes[j].parent = containers
                .iter()
                .copied()
                .max_by_key(|&c| containers.iter().filter(|&&d| contains[d][c]).count());
        }
        let mut roots = Vec::new();
        for j in 0..n {
            match nodes[j].parent {
                Some(parent) => nodes[parent].children.push(j),
                None => roots.push(j),
            }
        }

        let depths: Vec<usize> = (0..n)
            .map(|j| {
                let mut depth = 0;
                let mut at = j;
                while let Some(parent) = nodes[at].parent {
                    depth += 1;
                    at = parent;
                }
                depth
            })
            .collect();
        let mut used: FxHashSet<usize> = FxHashSet::default();
        for polygon in &geometry.polygons {
            used.extend(polygon.ring.iter().copied());
        }
        for polyline in &geometry.polylines {
            used.extend(polyline.points.iter().copied());
        }

        let mut free_points = Vec::new();
        for (point, p) in reduced.iter().enumerate() {
            if used.contains(&point) {
                continue;
            }
            match innermost(&nodes, &depths, p) {
                Some(node) => nodes[node].points.push(point),
                None => free_points.push(point),
            }
        }
        let mut free_stations = Vec::new();
        for (station, p) in reduced_stations.iter().enumerate() {
            match innermost(&nodes, &depths, p) {
                Some(node) => nodes[node].stations.push(station),
                None => free_stations.push(station),
            }
        }
        let mut free_polylines = Vec::new();
        for (polyline, line) in geometry.polylines.iter().enumerate() {
            let host = (0..n)
                .filter(|&idx| {
                    line.points
                        .iter()
                        .all(|&v| point_in_ring(&reduced[v], &nodes[idx].ring))
                })
                .max_by_key(|&idx| depths[idx]);
            match host {
                Some(node) => nodes[node].polylines.push(polyline),
                None => free_polylines.push(polyline),
            }
        }

        Ok(Self {
            nodes,
            roots,
            free_points,
            free_stations,
            free_polylines,
        })
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    /// Indices of polygons contained by no other polygon.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, idx: usize) -> &HierarchyNode {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first preorder of the subtree under `root`, parents before
    /// children, first child first.
    pub fn preorder(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}

/// Deepest polygon containing `p`, if any.
fn innermost(nodes: &[HierarchyNode], depths: &[usize], p: &Point2<f64>) -> Option<usize> {
    (0..nodes.len())
        .filter(|&idx| point_in_ring(p, &nodes[idx].ring))
        .max_by_key(|&idx| depths[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(geometry: &mut Geometry, min: f64, max: f64) -> Vec<usize> {
        vec![
            geometry.add_point(nalgebra::Point3::new(min, min, 0.0)),
            geometry.add_point(nalgebra::Point3::new(max, min, 0.0)),
            geometry.add_point(nalgebra::Point3::new(max, max, 0.0)),
            geometry.add_point(nalgebra::Point3::new(min, max, 0.0)),
        ]
    }

    fn reduced(geometry: &Geometry) -> Vec<Point2<f64>> {
        geometry
            .points
            .iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect()
    }

    fn reduced_stations(geometry: &Geometry) -> Vec<Point2<f64>> {
        geometry
            .stations
            .iter()
            .map(|p| Point2::new(p.x, p.y))
            .collect()
    }

    #[test]
    fn nested_squares_attach_interior_detail() {
        let mut geometry = Geometry::new();
        let outer = square(&mut geometry, 0.0, 10.0);
        let inner = square(&mut geometry, 4.0, 6.0);
        geometry.add_polygon(outer).unwrap();
        geometry.add_polygon(inner).unwrap();
        let loose = geometry.add_point(nalgebra::Point3::new(5.0, 5.0, 0.0));
        let station = geometry.add_station(nalgebra::Point3::new(5.0, 5.5, 0.0));

        let forest = PolygonForest::build(
            &geometry,
            &reduced(&geometry),
            &reduced_stations(&geometry),
        )
        .unwrap();

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.roots(), &[0]);
        assert_eq!(forest.node(0).children, vec![1]);
        assert_eq!(forest.node(1).parent, Some(0));
        assert_eq!(forest.node(1).points, vec![loose]);
        assert_eq!(forest.node(1).stations, vec![station]);
        assert!(forest.node(0).points.is_empty());
        assert!(forest.free_points.is_empty());
    }

    #[test]
    fn partial_overlap_is_an_error() {
        let mut geometry = Geometry::new();
        let a = square(&mut geometry, 0.0, 4.0);
        let b = vec![
            geometry.add_point(nalgebra::Point3::new(2.0, 0.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(6.0, 0.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(6.0, 4.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(2.0, 4.0, 0.0)),
        ];
        geometry.add_polygon(a).unwrap();
        geometry.add_polygon(b).unwrap();

        let result =
            PolygonForest::build(&geometry, &reduced(&geometry), &reduced_stations(&geometry));
        assert!(matches!(result, Err(HierarchyError::Overlap(0, 1))));
    }

    #[test]
    fn touching_squares_count_as_overlap() {
        let mut geometry = Geometry::new();
        let a = square(&mut geometry, 0.0, 2.0);
        let b = vec![
            geometry.add_point(nalgebra::Point3::new(2.0, 0.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(4.0, 0.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(4.0, 2.0, 0.0)),
            geometry.add_point(nalgebra::Point3::new(2.0, 2.0, 0.0)),
        ];
        geometry.add_polygon(a).unwrap();
        geometry.add_polygon(b).unwrap();

        let result =
            PolygonForest::build(&geometry, &reduced(&geometry), &reduced_stations(&geometry));
        assert!(matches!(result, Err(HierarchyError::Overlap(0, 1))));
    }

    #[test]
    fn identical_rings_are_cyclic() {
        let mut geometry = Geometry::new();
        let ring = square(&mut geometry, 0.0, 3.0);
        geometry.add_polygon(ring.clone()).unwrap();
        geometry.add_polygon(ring).unwrap();

        let result =
            PolygonForest::build(&geometry, &reduced(&geometry), &reduced_stations(&geometry));
        assert!(matches!(result, Err(HierarchyError::CyclicContainment(0, 1))));
    }

    #[test]
    fn clockwise_rings_are_normalized() {
        let mut geometry = Geometry::new();
        let mut ring = square(&mut geometry, 0.0, 5.0);
        ring.reverse();
        geometry.add_polygon(ring).unwrap();

        let forest = PolygonForest::build(
            &geometry,
            &reduced(&geometry),
            &reduced_stations(&geometry),
        )
        .unwrap();
        assert!(is_ccw(&forest.node(0).ring));
        assert_eq!(forest.node(0).ring_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn polylines_attach_to_their_innermost_polygon() {
        let mut geometry = Geometry::new();
        let outer = square(&mut geometry, 0.0, 10.0);
        let inner = square(&mut geometry, 4.0, 6.0);
        geometry.add_polygon(outer).unwrap();
        geometry.add_polygon(inner).unwrap();

        let a = geometry.add_point(nalgebra::Point3::new(4.5, 5.0, 0.0));
        let b = geometry.add_point(nalgebra::Point3::new(5.5, 5.0, 0.0));
        let contained = geometry.add_polyline(vec![a, b]).unwrap();

        let c = geometry.add_point(nalgebra::Point3::new(1.0, 1.0, 0.0));
        let d = geometry.add_point(nalgebra::Point3::new(20.0, 1.0, 0.0));
        let crossing = geometry.add_polyline(vec![c, d]).unwrap();

        let forest = PolygonForest::build(
            &geometry,
            &reduced(&geometry),
            &reduced_stations(&geometry),
        )
        .unwrap();

        assert_eq!(forest.node(1).polylines, vec![contained]);
        assert_eq!(forest.free_polylines, vec![crossing]);
        // Polyline vertices are not loose points
        assert!(forest.node(1).points.is_empty());
    }

    #[test]
    fn three_levels_nest_into_a_chain() {
        let mut geometry = Geometry::new();
        for (min, max) in [(0.0, 12.0), (2.0, 10.0), (4.0, 8.0)] {
            let ring = square(&mut geometry, min, max);
            geometry.add_polygon(ring).unwrap();
        }

        let forest = PolygonForest::build(
            &geometry,
            &reduced(&geometry),
            &reduced_stations(&geometry),
        )
        .unwrap();

        assert_eq!(forest.roots(), &[0]);
        assert_eq!(forest.node(1).parent, Some(0));
        assert_eq!(forest.node(2).parent, Some(1));
        assert_eq!(forest.preorder(0), vec![0, 1, 2]);
    }
}
