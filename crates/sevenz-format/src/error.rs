//! Parse error taxonomy for the 7z container metadata

use thiserror::Error;

/// Errors raised while parsing a container's metadata.
///
/// Every variant is fatal to the parse of that file: no partially populated
/// result is ever returned alongside one of these.
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// Magic bytes or required-zero padding wrong: not a container of this
    /// format, or structurally corrupt
    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    /// An opcode appeared outside its legal successor set, or the trailer
    /// ended with an expectation still pending
    #[error("opcode sequence error: found {found}, expected one of [{expected}]")]
    SequenceError {
        /// What was actually read (an opcode name or raw byte)
        found: String,
        /// The legal successor set at that point
        expected: String,
    },

    /// A structurally valid but unsupported feature
    #[error("unimplemented feature: {0}")]
    Unimplemented(String),

    /// A cursor read ran past the end of the buffer
    #[error("read of {requested} bytes at position {position} exceeds buffer length {length}")]
    OutOfBounds {
        /// Cursor position when the read was attempted
        position: usize,
        /// Number of bytes requested
        requested: usize,
        /// Total buffer length
        length: usize,
    },

    /// An integer read with a width outside 1..=8
    #[error("invalid integer width: {0} (must be 1-8)")]
    InvalidWidth(usize),

    /// Region arithmetic produced a negative length
    #[error("inconsistent layout: {0}")]
    InconsistentLayout(String),
}

/// Result alias for container parsing
pub type FormatResult<T> = Result<T, FormatError>;
