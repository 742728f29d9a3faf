//! Encoder descriptors within a folder block

use std::fmt;

use binrw::Endian;

use crate::cursor::ByteCursor;
use crate::error::{FormatError, FormatResult};

/// Flags byte: low 4 bits are the encoding-id byte length
pub const FLAG_ID_SIZE_MASK: u8 = 0x0F;
/// Flags byte: complex encoder (multiple in/out streams)
pub const FLAG_COMPLEX: u8 = 0x10;
/// Flags byte: a property blob follows the encoding id
pub const FLAG_ATTRIBUTES: u8 = 0x20;

/// Encodings this parser recognizes.
///
/// The id is the big-endian integer formed by left-padding the stored bytes
/// to 4 before interpretation. Anything outside this table is rejected as
/// unimplemented rather than carried opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Copy,
    Delta,
    BcjX86,
    Lzma2,
    Lzma,
    Ppmd,
    Deflate,
    Bzip2,
    Bcj2,
    Aes256Sha256,
}

impl Encoding {
    /// Look up a decoded encoding id
    pub const fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0x00 => Self::Copy,
            0x03 => Self::Delta,
            0x04 => Self::BcjX86,
            0x21 => Self::Lzma2,
            0x0003_0101 => Self::Lzma,
            0x0003_0401 => Self::Ppmd,
            0x0004_0108 => Self::Deflate,
            0x0004_0202 => Self::Bzip2,
            0x0303_011B => Self::Bcj2,
            0x06F1_0701 => Self::Aes256Sha256,
            _ => return None,
        })
    }

    /// Conventional name of the encoding
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Delta => "Delta",
            Self::BcjX86 => "BCJ x86",
            Self::Lzma2 => "LZMA2",
            Self::Lzma => "LZMA",
            Self::Ppmd => "PPMd",
            Self::Deflate => "Deflate",
            Self::Bzip2 => "BZip2",
            Self::Bcj2 => "BCJ2",
            Self::Aes256Sha256 => "AES-256 + SHA-256",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compression/filter stage within a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderDescriptor {
    /// Raw flags byte
    pub flags: u8,
    /// Byte length of the stored encoding id
    pub id_size: usize,
    /// Reserved high bits of the flags byte
    pub reserved: u8,
    /// Decoded encoding id
    pub encoding_id: u32,
    /// The recognized encoding
    pub encoding: Encoding,
    /// Property blob, empty when the attributes flag is clear
    pub properties: Vec<u8>,
}

impl EncoderDescriptor {
    /// Decode one encoder descriptor at the cursor.
    ///
    /// Complex encoders and unrecognized encoding ids are unimplemented.
    pub(crate) fn parse(cursor: &mut ByteCursor<'_>) -> FormatResult<Self> {
        let flags = cursor.read_u8()?;
        let id_size = usize::from(flags & FLAG_ID_SIZE_MASK);
        let reserved = flags >> 6;
        if flags & FLAG_COMPLEX != 0 {
            return Err(FormatError::Unimplemented("complex encoder".into()));
        }
        if id_size > 4 {
            return Err(FormatError::Unimplemented(format!(
                "encoding id of {id_size} bytes (wider than 4)"
            )));
        }

        let encoding_id = if id_size == 0 {
            0
        } else {
            cursor.read_int(id_size, Endian::Big)? as u32
        };
        let encoding = Encoding::from_id(encoding_id).ok_or_else(|| {
            FormatError::Unimplemented(format!("encoding id 0x{encoding_id:08X}"))
        })?;

        let properties = if flags & FLAG_ATTRIBUTES != 0 {
            let count = cursor.read_number()? as usize;
            cursor.read(count)?.to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            flags,
            id_size,
            reserved,
            encoding_id,
            encoding,
            properties,
        })
    }

    /// Whether a property blob was stored
    pub const fn has_attributes(&self) -> bool {
        self.flags & FLAG_ATTRIBUTES != 0
    }
}

impl fmt::Display for EncoderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id 0x{:08X})", self.encoding, self.encoding_id)?;
        if self.has_attributes() {
            write!(f, " properties {}", hex::encode(&self.properties))?;
        }
        Ok(())
    }
}
