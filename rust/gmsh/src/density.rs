// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh density strategies.
//!
//! Either a uniform target edge length everywhere, or adaptive
//! refinement that builds a quad-tree over the reduced points and
//! derives a per-cell edge length from local point spacing.

use meshprep_geometry::{Point2, QuadTree};

use crate::error::WriteError;

/// Density strategy as configured by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityAlgorithm {
    /// One target edge length for the whole domain.
    Fixed { edge_length: f64 },
    /// Quad-tree refinement between two edge length bounds. Cells are
    /// subdivided until they hold at most `leaf_capacity` points.
    Adaptive {
        min_edge_length: f64,
        max_edge_length: f64,
        leaf_capacity: usize,
    },
}

impl DensityAlgorithm {
    /// Rejects parameter combinations that cannot produce a density.
    pub fn validate(&self) -> Result<(), WriteError> {
        match *self {
            DensityAlgorithm::Fixed { edge_length } => {
                if !edge_length.is_finite() || edge_length <= 0.0 {
                    return Err(WriteError::InvalidDensity(format!(
                        "edge length must be positive and finite, got {}",
                        edge_length
                    )));
                }
            }
            DensityAlgorithm::Adaptive {
                min_edge_length,
                max_edge_length,
                leaf_capacity,
            } => {
                if !min_edge_length.is_finite() || min_edge_length <= 0.0 {
                    return Err(WriteError::InvalidDensity(format!(
                        "minimum edge length must be positive and finite, got {}",
                        min_edge_length
                    )));
                }
                if !max_edge_length.is_finite() || max_edge_length < min_edge_length {
                    return Err(WriteError::InvalidDensity(format!(
                        "maximum edge length {} is below the minimum {}",
                        max_edge_length, min_edge_length
                    )));
                }
                if leaf_capacity == 0 {
                    return Err(WriteError::InvalidDensity(
                        "leaf capacity must be at least 1".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A density ready to be queried per point.
#[derive(Debug)]
pub enum MeshDensity {
    Fixed(f64),
    Adaptive(AdaptiveDensity),
}

impl MeshDensity {
    /// Instantiates the strategy over the reduced point set.
    pub fn build(algorithm: &DensityAlgorithm, points: &[Point2<f64>]) -> Result<Self, WriteError> {
        algorithm.validate()?;
        match *algorithm {
            DensityAlgorithm::Fixed { edge_length } => Ok(MeshDensity::Fixed(edge_length)),
            DensityAlgorithm::Adaptive {
                min_edge_length,
                max_edge_length,
                leaf_capacity,
            } => Ok(MeshDensity::Adaptive(AdaptiveDensity::build(
                points,
                min_edge_length,
                max_edge_length,
                leaf_capacity,
            )?)),
        }
    }

    /// Target edge length at a point.
    pub fn density_at(&self, p: &Point2<f64>) -> f64 {
        match self {
            MeshDensity::Fixed(edge_length) => *edge_length,
            MeshDensity::Adaptive(adaptive) => adaptive.density_at(p),
        }
    }
}

/// Quad-tree backed density field.
#[derive(Debug)]
pub struct AdaptiveDensity {
    tree: QuadTree,
    /// Per-cell edge length, aligned with the tree arena.
    values: Vec<f64>,
}

impl AdaptiveDensity {
    fn build(
        points: &[Point2<f64>],
        min_edge_length: f64,
        max_edge_length: f64,
        leaf_capacity: usize,
    ) -> Result<Self, WriteError> {
        let tree = QuadTree::build(points, leaf_capacity)?;

        // Children sit after their parent in the arena, so a reverse
        // pass sees every child before its parent.
        let mut values = vec![max_edge_length; tree.len()];
        for idx in (0..tree.len()).rev() {
            values[idx] = match tree.children(idx) {
                Some(children) => children
                    .iter()
                    .map(|&child| values[child])
                    .fold(f64::INFINITY, f64::min),
                None => leaf_density(tree.cell_points(idx), min_edge_length, max_edge_length),
            };
        }

        Ok(Self { tree, values })
    }

    fn density_at(&self, p: &Point2<f64>) -> f64 {
        self.values[self.tree.locate(p).index()]
    }
}

/// Edge length for one leaf: the smallest pairwise distance between its
/// points, clamped into the configured bounds. Leaves with fewer than
/// two points stay at the coarse bound.
fn leaf_density(points: &[Point2<f64>], min_edge_length: f64, max_edge_length: f64) -> f64 {
    if points.len() < 2 {
        return max_edge_length;
    }
    let mut shortest = f64::INFINITY;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            shortest = shortest.min((points[j] - points[i]).norm());
        }
    }
    shortest.clamp(min_edge_length, max_edge_length)
}
