//! Error types for the spec generator

use std::path::PathBuf;

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, SpecgenError>;

/// Fatal generator errors.
///
/// Anything that is not representable here is a diagnostic, not an error.
#[derive(Error, Debug)]
pub enum SpecgenError {
    #[error("Failed to read definitions file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definitions document: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("Attribute {attribute} has {dimensions} dimension(s) but no Dims_definitions")]
    MissingDimensionDefinitions { attribute: String, dimensions: u32 },

    #[error("Failed to write {path}: {source}")]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{warnings} warning(s) reported in strict mode")]
    StrictWarnings { warnings: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
