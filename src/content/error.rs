//! Content repository errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the content repository.
///
/// Malformed front matter is deliberately absent: it degrades to empty
/// metadata instead of failing a read.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A required input field is missing or unusable
    #[error("{0}")]
    Validation(String),

    /// No file decodes to the requested address
    #[error("post not found: {category}/{slug}")]
    NotFound { category: String, slug: String },

    /// A create would overwrite an existing file
    #[error("file already exists: {0:?}")]
    Conflict(PathBuf),

    /// Unexpected filesystem failure
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(category: &str, slug: &str) -> Self {
        Self::NotFound {
            category: category.to_string(),
            slug: slug.to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;
