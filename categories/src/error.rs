//! Error types for the category store and service.

use thiserror::Error;

/// Result type alias for category operations.
pub type Result<T> = std::result::Result<T, CategoryError>;

/// Errors that can occur while registering, removing, listing or searching
/// categories.
#[derive(Error, Debug)]
pub enum CategoryError {
    /// Blank or otherwise unusable user input.
    #[error("{0}")]
    Validation(String),

    /// A category with the same normalized name already exists.
    #[error("category already exists: {0}")]
    DuplicateName(String),

    /// The embedding provider failed or returned something unusable.
    #[error("embedding error: {0}")]
    Embedding(#[from] semcat_embeddings::EmbeddingError),

    /// The persisted document could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored embedding does not match the query's length.
    ///
    /// This points at corrupted persisted data, not at the caller.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object store answered with an unexpected status.
    #[error("object store returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The object store could not be reached.
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The document is not a valid store.
    #[error("malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document carries a version tag this build does not understand.
    #[error("unsupported store version: {0}")]
    UnsupportedVersion(u32),

    /// Failed to read the store file.
    #[error("failed to read file: {0}")]
    ReadFile(String),

    /// Failed to write the store file.
    #[error("failed to write file: {0}")]
    WriteFile(String),
}
