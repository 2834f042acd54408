// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Finite-element mesh containers.
//!
//! Nodes carry positions, elements carry node indices, a material id and
//! a kind from the supported linear element zoo. The containers are
//! deliberately dumb; readers and writers live in `meshprep-gmsh`.

pub mod element;
pub mod error;
pub mod mesh;

pub use element::{Element, ElementKind, ElementNodes};
pub use error::{Error, Result};
pub use mesh::{Mesh, Node};
