//! The `error` module defines the [`HexerError`] enum that describes the errors that
//! can occur when encoding values, editing the marker repository, or reading and
//! writing files via [`crate::Workbench`].
//!
//! Decoding never fails: codecs degrade to a placeholder instead of raising.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HexerError {
    /// A required input (buffer, path, marker size) was absent or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Text could not be parsed as the requested type
    #[error("Cannot parse '{input}' as {target}")]
    Parse { input: String, target: String },
    /// Data type name is not part of the registry
    #[error("Unknown data type: '{0}'")]
    UnknownType(String),
    /// Marker already exists at the bit address
    #[error("Marker already exists at address 0x{0:08X}")]
    DuplicateKey(usize),
    /// No marker exists at the bit address
    #[error("No marker found at address 0x{0:08X}")]
    NotFound(usize),
    /// Operation requires an opened document
    #[error("No document is open")]
    NoDocument,
    /// Marker file or config file content is malformed
    #[error("Malformed marker file: {0}")]
    MarkerFormat(#[from] serde_json::Error),
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HexerError {
    pub(crate) fn parse(input: &str, target: &str) -> Self {
        Self::Parse {
            input: input.to_string(),
            target: target.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HexerError>;
