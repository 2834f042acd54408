// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MeshPrep Geometry
//!
//! Geometric primitives and spatial utilities for mesh preparation:
//!
//! - Named geometries (points, stations, polylines, polygons) and a store
//!   that merges several geometries into one composite
//! - 2D ring predicates (signed area, orientation, point-in-ring with
//!   on-edge counting as inside)
//! - A square quad-tree over 2D point sets for local point-density queries
//! - Best-fit-plane reduction mapping 3D site data onto the x-y plane,
//!   with the inverse retained for coordinate recovery

pub mod error;
pub mod geometry;
pub mod plane;
pub mod quadtree;
pub mod ring;
pub mod store;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use geometry::{Geometry, Polygon, Polyline};
pub use plane::{PlaneReduction, PlaneRotation};
pub use quadtree::{Located, QuadTree};
pub use store::GeometryStore;
