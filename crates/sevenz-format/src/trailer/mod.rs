//! The variable-length, opcode-encoded trailing metadata block
//!
//! The trailer is a self-describing binary grammar: a stream of opcodes,
//! each followed by its operands, with a legal-successor constraint between
//! steps. The walk accumulates everything into a [`TrailerState`] and
//! terminates when the trailer bytes are exhausted with no expectation
//! pending.

mod encoder;
mod grammar;
mod opcode;
mod walker;

pub use encoder::{Encoding, EncoderDescriptor, FLAG_ATTRIBUTES, FLAG_COMPLEX, FLAG_ID_SIZE_MASK};
pub use grammar::{ExpectedSet, successors};
pub use opcode::Opcode;

use crate::error::FormatResult;

/// Whether the trailer body is stored plain or re-encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerKind {
    /// Plain trailer body
    Unpacked,
    /// The trailer itself is compressed
    Packed,
}

/// Accumulated results of one trailer walk.
///
/// Constructed fresh per file parse and finalized once the walk reaches the
/// end of the trailer; the transient expected-opcode set never leaves the
/// walker.
#[derive(Debug, Clone, Default)]
pub struct TrailerState {
    /// Plain or re-encoded, once a header opcode has been seen
    pub kind: Option<TrailerKind>,
    /// Offset of the packed streams relative to the end of the descriptor
    pub data_offset: u64,
    /// Number of packed streams
    pub stream_count: u8,
    /// Pack sizes in stream order
    pub pack_sizes: Vec<u64>,
    /// Number of folders
    pub folder_count: u8,
    /// Encoder descriptors in declaration order
    pub encoders: Vec<EncoderDescriptor>,
    /// Unpacked size following the folder block
    pub encoder_unpack_size: Option<u64>,
    /// Stream checksums in declaration order
    pub digests: Vec<u32>,
    /// Declared file count
    pub file_count: Option<u64>,
    /// Decoded file names
    pub file_names: Vec<String>,
    /// Externally stored creation-time blob
    pub ctime: Option<Vec<u8>>,
    /// Externally stored access-time blob
    pub atime: Option<Vec<u8>>,
    /// Externally stored modification-time blob
    pub mtime: Option<Vec<u8>>,
    /// Externally stored attribute blob
    pub attributes: Option<Vec<u8>>,
    /// Stray bytes tolerated between a folder's unpack size and its digest
    pub anomaly_skipped: usize,
}

impl TrailerState {
    /// Parse a complete trailer byte span
    pub fn parse(bytes: &[u8]) -> FormatResult<Self> {
        walker::walk(bytes)
    }

    /// Length of the compressed body: data offset plus all pack sizes
    pub fn body_length(&self) -> u64 {
        self.pack_sizes
            .iter()
            .fold(self.data_offset, |total, &size| total.saturating_add(size))
    }
}
