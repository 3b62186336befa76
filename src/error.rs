use std::path::PathBuf;
use thiserror::Error;

/// Errors raised around the scanner: loading the source document and
/// persisting carved images. The scanner itself never fails.
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file is empty: {0}")]
    EmptyInput(PathBuf),

    #[error("Output file already exists: {0}")]
    FileExists(PathBuf),

    #[error("Unknown image format: {0}")]
    UnknownFormat(String),

    #[error("Manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CarveError>;
