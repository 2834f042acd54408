use thiserror::Error;

/// Errors from building GMSH geometry input.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("no geometries selected for meshing")]
    NoGeometries,

    #[error("geometry name '{0}' is reserved for the merged composite")]
    ReservedName(String),

    #[error("invalid mesh density: {0}")]
    InvalidDensity(String),

    #[error("selected geometries contain no points")]
    NoPoints,

    #[error("geometry error: {0}")]
    Geometry(#[from] meshprep_geometry::Error),

    #[error("hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from nesting polygons into a containment forest.
#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("cyclic containment between polygons {0} and {1}")]
    CyclicContainment(usize, usize),

    #[error("polygons {0} and {1} overlap without nesting")]
    Overlap(usize, usize),
}

/// Errors from reading a legacy ASCII `.msh` file.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected $MeshFormat header")]
    MissingHeader { line: usize },

    #[error("line {line}: unsupported mesh format version {version}, only 2.x is readable")]
    UnsupportedVersion { version: String, line: usize },

    #[error("line {line}: binary .msh files are not supported")]
    BinaryFormat { line: usize },

    #[error("line {line}: malformed {what} record")]
    Malformed { what: &'static str, line: usize },

    #[error("line {line}: duplicate node id {id}")]
    DuplicateNodeId { id: u64, line: usize },

    #[error("line {line}: element references undeclared node id {id}")]
    UndeclaredNodeId { id: u64, line: usize },

    #[error("line {line}: unsupported element type {element_type}")]
    UnsupportedElementType { element_type: u32, line: usize },

    #[error("line {line}: unexpected content outside any section")]
    UnexpectedContent { line: usize },

    #[error("unexpected end of file in {what}")]
    UnexpectedEof { what: &'static str },

    #[error("mesh assembly failed: {0}")]
    Mesh(#[from] meshprep_mesh::Error),
}
