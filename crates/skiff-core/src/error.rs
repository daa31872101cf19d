//! Error taxonomy for skiff-core.
//!
//! Everything here surfaces immediately — a CLI invocation is re-run by the
//! user or a calling script, so there are no retries anywhere in the core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed path token. Recoverable at the caller, which presents a
    /// usage message and exits non-zero.
    #[error("invalid path format: {0}")]
    InvalidPathFormat(String),

    /// The index at `path` failed to deserialize. Fatal for the invocation;
    /// a corrupt staging file is never silently discarded in favor of the
    /// committed file.
    #[error("corrupt index at {path}")]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Entry lookup found nothing at the given location.
    #[error("path not found ({0})")]
    PathNotFound(String),

    /// Entry lookup found a file where a directory was required.
    #[error("not a directory ({0})")]
    NotADirectory(String),

    /// Entry lookup found a directory where a file was required.
    #[error("is a directory ({0})")]
    IsADirectory(String),

    /// Move/copy across two different store ids, rejected before any file io.
    #[error("unsupported cross-store operation ({from} -> {to})")]
    CrossStoreOperation { from: String, to: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
