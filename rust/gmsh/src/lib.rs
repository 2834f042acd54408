// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GMSH interchange for mesh preparation.
//!
//! - Mesh density strategies: fixed edge length or adaptive refinement
//!   over a quad-tree
//! - Containment analysis that nests polygons into surfaces with holes
//! - A `.geo` writer that turns named geometries into GMSH input
//! - A reader for the legacy ASCII `.msh` v2 format

pub mod density;
pub mod error;
pub mod forest;
pub mod reader;
pub mod writer;

pub use density::{DensityAlgorithm, MeshDensity};
pub use error::{HierarchyError, ReadError, WriteError};
pub use forest::{HierarchyNode, PolygonForest};
pub use reader::{is_gmsh_mesh_file, read_msh, read_msh_file};
pub use writer::{GeoWriter, GmshPoint, WriterConfig, COMPOSITE_NAME};
