//! Error types for shapefile decoding.

use thiserror::Error;

/// Result type for shapefile parser operations.
pub type ShapefileResult<T> = Result<T, ShapefileError>;

#[derive(Error, Debug)]
pub enum ShapefileError {
    /// Bad magic number, version or header length
    #[error("Invalid {file} header: {reason}")]
    InvalidHeader { file: &'static str, reason: String },

    /// A read ran past the end of the buffer
    #[error("Truncated {file} data at byte {offset}")]
    Truncated { file: &'static str, offset: usize },

    #[error("Unsupported shape type: {0}")]
    UnsupportedShapeType(i32),

    /// Geometry and attribute files disagree on the number of rows
    #[error("Shape count {shapes} does not match dbf record count {records}")]
    RecordCountMismatch { shapes: usize, records: usize },

    #[error("Invalid dbf field descriptor: {0}")]
    InvalidField(String),
}
