//! Property IDs of the trailer's opcode stream

use std::fmt;

/// One opcode byte of the trailer grammar.
///
/// Only a subset carries handler semantics; the rest are structurally valid
/// opcodes the walker rejects as unimplemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Terminate the current nesting level
    End = 0x00,
    /// Uncompressed trailer body follows
    Header = 0x01,
    ArchiveProperties = 0x02,
    AdditionalStreamsInfo = 0x03,
    /// Stream section marker
    MainStreamsInfo = 0x04,
    /// File count section
    FilesInfo = 0x05,
    /// Pack section marker: data offset plus stream count
    PackInfo = 0x06,
    /// Unpack section marker
    UnpackInfo = 0x07,
    SubStreamsInfo = 0x08,
    /// Pack sizes, one per stream
    Size = 0x09,
    /// Checksum block
    Digest = 0x0A,
    /// Folder/encoder block
    Folder = 0x0B,
    /// Post-folder unpacked size
    EncoderUnpackSize = 0x0C,
    NumUnpackStream = 0x0D,
    EmptyStream = 0x0E,
    EmptyFile = 0x0F,
    Anti = 0x10,
    /// Per-file names, UTF-16 encoded
    FileName = 0x11,
    CTime = 0x12,
    ATime = 0x13,
    MTime = 0x14,
    Attributes = 0x15,
    Comment = 0x16,
    /// The trailer itself is compressed
    EncodedHeader = 0x17,
    StartPos = 0x18,
    /// Zero-filled padding
    Dummy = 0x19,
}

impl Opcode {
    /// Decode an opcode byte; `None` for bytes outside the defined range
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Self::End,
            0x01 => Self::Header,
            0x02 => Self::ArchiveProperties,
            0x03 => Self::AdditionalStreamsInfo,
            0x04 => Self::MainStreamsInfo,
            0x05 => Self::FilesInfo,
            0x06 => Self::PackInfo,
            0x07 => Self::UnpackInfo,
            0x08 => Self::SubStreamsInfo,
            0x09 => Self::Size,
            0x0A => Self::Digest,
            0x0B => Self::Folder,
            0x0C => Self::EncoderUnpackSize,
            0x0D => Self::NumUnpackStream,
            0x0E => Self::EmptyStream,
            0x0F => Self::EmptyFile,
            0x10 => Self::Anti,
            0x11 => Self::FileName,
            0x12 => Self::CTime,
            0x13 => Self::ATime,
            0x14 => Self::MTime,
            0x15 => Self::Attributes,
            0x16 => Self::Comment,
            0x17 => Self::EncodedHeader,
            0x18 => Self::StartPos,
            0x19 => Self::Dummy,
            _ => return None,
        })
    }

    /// Human-readable opcode name for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::End => "End",
            Self::Header => "Header",
            Self::ArchiveProperties => "ArchiveProperties",
            Self::AdditionalStreamsInfo => "AdditionalStreamsInfo",
            Self::MainStreamsInfo => "MainStreamsInfo",
            Self::FilesInfo => "FilesInfo",
            Self::PackInfo => "PackInfo",
            Self::UnpackInfo => "UnpackInfo",
            Self::SubStreamsInfo => "SubStreamsInfo",
            Self::Size => "Size",
            Self::Digest => "Digest",
            Self::Folder => "Folder",
            Self::EncoderUnpackSize => "EncoderUnpackSize",
            Self::NumUnpackStream => "NumUnpackStream",
            Self::EmptyStream => "EmptyStream",
            Self::EmptyFile => "EmptyFile",
            Self::Anti => "Anti",
            Self::FileName => "FileName",
            Self::CTime => "CTime",
            Self::ATime => "ATime",
            Self::MTime => "MTime",
            Self::Attributes => "Attributes",
            Self::Comment => "Comment",
            Self::EncodedHeader => "EncodedHeader",
            Self::StartPos => "StartPos",
            Self::Dummy => "Dummy",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
