// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh container: nodes plus elements.

use nalgebra::Point3;

use crate::element::Element;
use crate::error::{Error, Result};

/// A mesh node. `id` equals the node's index in the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: u32,
    pub point: Point3<f64>,
}

impl Node {
    pub fn new(id: u32, point: Point3<f64>) -> Self {
        Self { id, point }
    }
}

/// An unstructured mesh. Every element node index is validated against
/// the node list on construction, so lookups never go out of bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    nodes: Vec<Node>,
    elements: Vec<Element>,
}

impl Mesh {
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>) -> Result<Self> {
        for (index, element) in elements.iter().enumerate() {
            for &node in &element.nodes {
                if node as usize >= nodes.len() {
                    return Err(Error::NodeOutOfRange {
                        element: index,
                        node,
                        nodes: nodes.len(),
                    });
                }
            }
        }
        Ok(Self { nodes, elements })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use smallvec::smallvec;

    fn triangle_nodes() -> Vec<Node> {
        vec![
            Node::new(0, Point3::new(0.0, 0.0, 0.0)),
            Node::new(1, Point3::new(1.0, 0.0, 0.0)),
            Node::new(2, Point3::new(0.0, 1.0, 0.0)),
        ]
    }

    #[test]
    fn valid_mesh_reports_counts() {
        let element = Element::new(ElementKind::Triangle, smallvec![0, 1, 2], 0).unwrap();
        let mesh = Mesh::new(triangle_nodes(), vec![element]).unwrap();
        assert_eq!(mesh.node_count(), 3);
        assert_eq!(mesh.element_count(), 1);
        assert_eq!(mesh.nodes()[2].point, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn dangling_node_reference_is_rejected() {
        let element = Element::new(ElementKind::Triangle, smallvec![0, 1, 3], 0).unwrap();
        let result = Mesh::new(triangle_nodes(), vec![element]);
        assert!(matches!(
            result,
            Err(Error::NodeOutOfRange {
                element: 0,
                node: 3,
                nodes: 3,
            })
        ));
    }

    #[test]
    fn empty_mesh_is_fine() {
        let mesh = Mesh::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(mesh.node_count(), 0);
        assert_eq!(mesh.element_count(), 0);
    }
}
