use thiserror::Error;

use crate::element::ElementKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind:?} element expects {expected} nodes, got {got}")]
    NodeCountMismatch {
        kind: ElementKind,
        expected: usize,
        got: usize,
    },

    #[error("element {element} references node {node}, but the mesh has {nodes} nodes")]
    NodeOutOfRange {
        element: usize,
        node: u32,
        nodes: usize,
    },
}
