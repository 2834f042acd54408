// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element kinds and their node lists.

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Supported linear element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Line,
    Triangle,
    Quad,
    Tetrahedron,
    Hexahedron,
    Prism,
    Pyramid,
}

impl ElementKind {
    /// Number of nodes the kind requires.
    pub fn node_count(&self) -> usize {
        match self {
            ElementKind::Line => 2,
            ElementKind::Triangle => 3,
            ElementKind::Quad => 4,
            ElementKind::Tetrahedron => 4,
            ElementKind::Hexahedron => 8,
            ElementKind::Prism => 6,
            ElementKind::Pyramid => 5,
        }
    }
}

/// Node indices of one element. Inline capacity 8 covers the hexahedron
/// without touching the heap.
pub type ElementNodes = SmallVec<[u32; 8]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub nodes: ElementNodes,
    pub material: i32,
}

impl Element {
    /// Builds an element, checking the node count against the kind.
    pub fn new(kind: ElementKind, nodes: ElementNodes, material: i32) -> Result<Self> {
        if nodes.len() != kind.node_count() {
            return Err(Error::NodeCountMismatch {
                kind,
                expected: kind.node_count(),
                got: nodes.len(),
            });
        }
        Ok(Self {
            kind,
            nodes,
            material,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn node_counts_match_the_element_zoo() {
        assert_eq!(ElementKind::Line.node_count(), 2);
        assert_eq!(ElementKind::Triangle.node_count(), 3);
        assert_eq!(ElementKind::Tetrahedron.node_count(), 4);
        assert_eq!(ElementKind::Hexahedron.node_count(), 8);
    }

    #[test]
    fn wrong_node_count_is_rejected() {
        let result = Element::new(ElementKind::Triangle, smallvec![0, 1], 0);
        assert!(matches!(
            result,
            Err(Error::NodeCountMismatch {
                kind: ElementKind::Triangle,
                expected: 3,
                got: 2,
            })
        ));
    }

    #[test]
    fn valid_element_keeps_its_material() {
        let element = Element::new(ElementKind::Triangle, smallvec![0, 1, 2], 7).unwrap();
        assert_eq!(element.material, 7);
        assert_eq!(element.nodes.as_slice(), &[0, 1, 2]);
    }
}
