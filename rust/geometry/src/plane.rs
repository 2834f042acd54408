// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reduction of 3D point sets onto a best-fit plane.
//!
//! [`PlaneRotation`] fits a plane through the centered covariance of the
//! point set and rotates it into the horizontal. The rotation is
//! invertible: [`PlaneRotation::restore`] maps reduced 2D points back to
//! their exact 3D positions.

use nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};

use crate::error::{Error, Result};

/// Ratio between the middle and largest eigenvalue below which the point
/// set is treated as collinear.
const DEGENERACY_EPS: f64 = 1e-12;

/// Rigid rotation that maps a fitted plane onto the xy plane.
#[derive(Debug, Clone)]
pub struct PlaneRotation {
    rotation: Rotation3<f64>,
    inverse: Rotation3<f64>,
    /// z of the rotated centroid. Restored points get this elevation
    /// back, so reduce followed by restore is exact for points on the
    /// plane.
    elevation: f64,
}

impl PlaneRotation {
    /// Fits a plane through the points and derives the rotation onto the
    /// horizontal.
    ///
    /// The plane normal is the eigenvector of the smallest eigenvalue of
    /// the centered covariance matrix. Fails when fewer than 3 points
    /// are given or when the points are coincident or collinear.
    pub fn fit(points: &[Point3<f64>]) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::DegeneratePointSet(format!(
                "Plane fit needs at least 3 points, got {}",
                points.len()
            )));
        }

        let n = points.len() as f64;
        let mut centroid = Vector3::zeros();
        for p in points {
            centroid += p.coords;
        }
        centroid /= n;

        let mut covariance = Matrix3::zeros();
        for p in points {
            let d = p.coords - centroid;
            covariance += d * d.transpose();
        }
        covariance /= n;

        let eigen = covariance.symmetric_eigen();
        let mut smallest = 0;
        for i in 1..3 {
            if eigen.eigenvalues[i] < eigen.eigenvalues[smallest] {
                smallest = i;
            }
        }
        let mut sorted = [
            eigen.eigenvalues[0],
            eigen.eigenvalues[1],
            eigen.eigenvalues[2],
        ];
        sorted.sort_by(|a, b| a.total_cmp(b));
        if sorted[2] <= 0.0 || sorted[1] <= sorted[2] * DEGENERACY_EPS {
            return Err(Error::DegeneratePointSet(
                "Points are coincident or collinear, no unique plane fit".into(),
            ));
        }

        let normal = eigen.eigenvectors.column(smallest).into_owned();
        // Antiparallel normals have no unique rotation axis; pick x.
        let rotation = Rotation3::rotation_between(&normal, &Vector3::z()).unwrap_or_else(|| {
            Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
        });
        let elevation = (rotation * Point3::from(centroid)).z;

        Ok(Self {
            rotation,
            inverse: rotation.inverse(),
            elevation,
        })
    }

    /// Rotates a point into the plane frame and drops its z.
    pub fn reduce(&self, p: &Point3<f64>) -> Point2<f64> {
        let rotated = self.rotation * *p;
        Point2::new(rotated.x, rotated.y)
    }

    /// Lifts a reduced point back to 3D at the plane elevation and
    /// rotates it into the original frame.
    pub fn restore(&self, p: &Point2<f64>) -> Point3<f64> {
        self.inverse * Point3::new(p.x, p.y, self.elevation)
    }

    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }
}

/// Strategy for mapping 3D input onto the meshing plane.
#[derive(Debug, Clone)]
pub enum PlaneReduction {
    /// Rotate onto the best-fit plane; restoring is exact.
    Rotation(PlaneRotation),
    /// Drop z. Restored points lie at z = 0; the original elevation is
    /// deliberately lost.
    Projection,
}

impl PlaneReduction {
    pub fn reduce(&self, p: &Point3<f64>) -> Point2<f64> {
        match self {
            PlaneReduction::Rotation(rotation) => rotation.reduce(p),
            PlaneReduction::Projection => Point2::new(p.x, p.y),
        }
    }

    pub fn restore(&self, p: &Point2<f64>) -> Point3<f64> {
        match self {
            PlaneReduction::Rotation(rotation) => rotation.restore(p),
            PlaneReduction::Projection => Point3::new(p.x, p.y, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tilted_plane_points() -> Vec<Point3<f64>> {
        // z = 0.5x + 0.25y + 2
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                let x = i as f64;
                let y = j as f64;
                points.push(Point3::new(x, y, 0.5 * x + 0.25 * y + 2.0));
            }
        }
        points
    }

    #[test]
    fn restore_inverts_reduce_on_the_plane() {
        let points = tilted_plane_points();
        let rotation = PlaneRotation::fit(&points).unwrap();
        for p in &points {
            let restored = rotation.restore(&rotation.reduce(p));
            assert_relative_eq!(restored.x, p.x, epsilon = 1e-10);
            assert_relative_eq!(restored.y, p.y, epsilon = 1e-10);
            assert_relative_eq!(restored.z, p.z, epsilon = 1e-10);
        }
    }

    #[test]
    fn rotation_matrix_is_orthonormal() {
        let rotation = PlaneRotation::fit(&tilted_plane_points()).unwrap();
        let m = rotation.rotation().matrix();
        let product = m * m.transpose();
        assert_relative_eq!(product, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn horizontal_plane_keeps_xy() {
        let points = vec![
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(4.0, 2.0, 3.0),
            Point3::new(0.0, 2.0, 3.0),
        ];
        let rotation = PlaneRotation::fit(&points).unwrap();
        assert_relative_eq!(rotation.elevation().abs(), 3.0, epsilon = 1e-10);
        for p in &points {
            let reduced = rotation.reduce(p);
            assert_relative_eq!(reduced.x.abs(), p.x, epsilon = 1e-10);
            assert_relative_eq!(reduced.y.abs(), p.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn too_few_points_fail() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            PlaneRotation::fit(&points),
            Err(Error::DegeneratePointSet(_))
        ));
    }

    #[test]
    fn collinear_points_fail() {
        let points: Vec<_> = (0..5)
            .map(|i| Point3::new(i as f64, 2.0 * i as f64, 0.0))
            .collect();
        assert!(matches!(
            PlaneRotation::fit(&points),
            Err(Error::DegeneratePointSet(_))
        ));
    }

    #[test]
    fn coincident_points_fail() {
        let points = vec![Point3::new(1.0, 2.0, 3.0); 4];
        assert!(matches!(
            PlaneRotation::fit(&points),
            Err(Error::DegeneratePointSet(_))
        ));
    }

    #[test]
    fn projection_flattens_to_zero_elevation() {
        let reduction = PlaneReduction::Projection;
        let p = Point3::new(1.5, -2.0, 7.0);
        let reduced = reduction.reduce(&p);
        assert_eq!(reduced, Point2::new(1.5, -2.0));
        assert_eq!(reduction.restore(&reduced), Point3::new(1.5, -2.0, 0.0));
    }
}
