//! Error types for archive retrieval.

use shapefile_parser::ShapefileError;
use storm_common::StormError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to decode shapefile: {0}")]
    Shapefile(#[from] ShapefileError),

    #[error("Archive {archive} has no {suffix} component")]
    MissingComponent {
        archive: String,
        suffix: &'static str,
    },

    /// More than one entry matched a component suffix, so the set cannot be
    /// paired reliably.
    #[error("Archive {archive} has {count} candidates for {suffix}: {candidates:?}", count = .candidates.len())]
    AmbiguousComponents {
        archive: String,
        suffix: &'static str,
        candidates: Vec<String>,
    },

    #[error("Cannot derive issuance time from archive name: {0}")]
    InvalidArchiveName(String),

    #[error(transparent)]
    Storm(#[from] StormError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
