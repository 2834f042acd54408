// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D ring predicates: signed area, orientation, and containment.
//!
//! A ring is a slice of 2D vertices forming an implicitly closed polygon.
//! Containment treats points exactly on a ring edge as inside, which
//! keeps nesting decisions stable when polygons share vertices with
//! their surroundings.

use nalgebra::Point2;

/// Tolerance for on-edge classification, as a perpendicular distance.
const EDGE_EPS: f64 = 1e-9;

/// Signed area of a ring via the shoelace formula; positive for
/// counter-clockwise winding.
pub fn signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = &ring[i];
        let q = &ring[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    sum * 0.5
}

/// Returns true if the ring winds counter-clockwise.
pub fn is_ccw(ring: &[Point2<f64>]) -> bool {
    signed_area(ring) > 0.0
}

/// Tests whether `p` lies on the segment from `a` to `b`.
pub fn point_on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len = ab.norm();
    if len < EDGE_EPS {
        return ap.norm() < EDGE_EPS;
    }
    // Perpendicular distance from the segment's carrier line
    let cross = ab.x * ap.y - ab.y * ap.x;
    if (cross / len).abs() > EDGE_EPS {
        return false;
    }
    let t = ap.dot(&ab) / (len * len);
    (-EDGE_EPS..=1.0 + EDGE_EPS).contains(&t)
}

/// Tests whether `p` lies inside the ring. Points exactly on an edge or
/// vertex count as inside.
pub fn point_in_ring(p: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        if point_on_segment(p, &ring[i], &ring[(i + 1) % n]) {
            return true;
        }
    }

    // Even-odd rule with a ray cast toward +x
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &ring[i];
        let pj = &ring[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(side: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(side, 0.0),
            Point2::new(side, side),
            Point2::new(0.0, side),
        ]
    }

    #[test]
    fn signed_area_unit_square() {
        assert_relative_eq!(signed_area(&square(1.0)), 1.0);
    }

    #[test]
    fn signed_area_flips_with_winding() {
        let mut ring = square(2.0);
        ring.reverse();
        assert_relative_eq!(signed_area(&ring), -4.0);
        assert!(!is_ccw(&ring));
        assert!(is_ccw(&square(2.0)));
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(point_in_ring(&Point2::new(0.5, 0.5), &square(1.0)));
    }

    #[test]
    fn exterior_point_is_outside() {
        assert!(!point_in_ring(&Point2::new(1.5, 0.5), &square(1.0)));
        assert!(!point_in_ring(&Point2::new(-0.1, 0.5), &square(1.0)));
    }

    #[test]
    fn on_edge_counts_as_inside() {
        assert!(point_in_ring(&Point2::new(1.0, 0.5), &square(1.0)));
        assert!(point_in_ring(&Point2::new(0.5, 0.0), &square(1.0)));
    }

    #[test]
    fn on_vertex_counts_as_inside() {
        assert!(point_in_ring(&Point2::new(0.0, 0.0), &square(1.0)));
        assert!(point_in_ring(&Point2::new(1.0, 1.0), &square(1.0)));
    }

    #[test]
    fn concave_ring_containment() {
        // L-shape: notch cut out of the upper right
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(point_in_ring(&Point2::new(0.5, 1.5), &ring));
        assert!(!point_in_ring(&Point2::new(1.5, 1.5), &ring));
    }

    #[test]
    fn segment_test_tolerates_tiny_offsets() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert!(point_on_segment(&Point2::new(5.0, 1e-12), &a, &b));
        assert!(!point_on_segment(&Point2::new(5.0, 1e-6), &a, &b));
        assert!(!point_on_segment(&Point2::new(10.1, 0.0), &a, &b));
    }
}
