use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or transforming geometries
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown geometry: {0}")]
    UnknownGeometry(String),

    #[error("Nothing to merge: {0}")]
    EmptyMerge(String),

    #[error("Invalid polyline: {0}")]
    InvalidPolyline(String),

    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("Empty point set: {0}")]
    EmptyPointSet(String),

    #[error("Degenerate point set: {0}")]
    DegeneratePointSet(String),
}
