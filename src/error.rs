//! Error types for loading and rendering posts

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving, loading or rendering posts
#[derive(Error, Debug)]
pub enum Error {
    /// No source file matches the requested slug
    #[error("post not found: {0}")]
    NotFound(String),

    /// Frontmatter is missing, incomplete or has unparsable values
    #[error("malformed metadata in {}: {reason}", .path.display())]
    MalformedMetadata { path: PathBuf, reason: String },

    /// Two source files resolve to the same slug
    #[error("duplicate slug {slug:?}: {} and {}", .first.display(), .second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Site configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed metadata error for a source file
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias using folio's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
