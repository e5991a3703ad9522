//! Error types for interchange operations.

use thiserror::Error;

use crate::hir::ExtractError;

/// Errors that can occur while loading a corpus or writing XMI.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Archive(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model reconstruction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Missing required entry in a corpus.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },
}

impl InterchangeError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create an archive error.
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    /// Create a missing corpus entry error.
    pub fn missing_entry(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "corpus entry",
            name: name.into(),
        }
    }
}
