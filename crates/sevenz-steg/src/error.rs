//! Carrier-level error types

use std::fmt;
use std::path::PathBuf;

use sevenz_format::FormatError;
use thiserror::Error;

/// Which phase of a carrier operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading and parsing a container
    Parse,
    /// Rebuilding a container image with staged payload content
    Stage,
    /// Writing the rebuilt image back to storage
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse",
            Self::Stage => "staging",
            Self::Commit => "commit",
        })
    }
}

/// Errors raised by the carrier layer.
///
/// Every variant names the file and phase involved, so a caller learns
/// exactly which member of a batch failed. A single failure fails the whole
/// batch before anything is committed.
#[derive(Debug, Error)]
pub enum StegError {
    /// A container failed to parse or rebuild
    #[error("{}: {stage} failed: {source}", path.display())]
    Format {
        /// The offending file
        path: PathBuf,
        /// The phase that failed
        stage: Stage,
        /// The underlying parse error
        source: FormatError,
    },

    /// A filesystem operation failed
    #[error("{}: {source}", path.display())]
    Io {
        /// The offending file
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A file pattern matched nothing
    #[error("no files match pattern `{0}`")]
    NoMatch(String),

    /// A file pattern could not be compiled
    #[error("invalid file pattern `{pattern}`: {reason}")]
    BadPattern {
        /// The pattern as given
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// A carrier needs at least one file
    #[error("carrier contains no files")]
    EmptyBatch,
}

/// Result alias for carrier operations
pub type StegResult<T> = Result<T, StegError>;
