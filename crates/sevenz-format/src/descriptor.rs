//! The fixed-size leading descriptor of a container file

use binrw::io::{Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::error::{FormatError, FormatResult};

/// Magic constant at the start of every container file
pub const MAGIC: [u8; 6] = *b"7z\xBC\xAF\x27\x1C";

/// Length of the fixed leading descriptor
pub const DESCRIPTOR_LEN: usize = 0x20;

/// The 32-byte leading descriptor.
///
/// Byte layout: `[0, 6)` magic, `[6, 8)` version (big-endian), `[8, 12)`
/// header CRC (big-endian), `[12, 20)` trailer start relative to the end of
/// the descriptor (little-endian), `[20, 28)` trailer length (little-endian),
/// `[28, 32)` trailer CRC (big-endian).
///
/// Immutable once parsed; the carrier layer constructs updated copies when
/// it needs to shift the trailer or refresh checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Format version
    pub version: u16,
    /// CRC-32 over bytes 12..32 of the file
    pub header_crc: u32,
    /// Trailer start offset, relative to the end of the descriptor
    pub trailer_start_relative: u64,
    /// Trailer length in bytes
    pub trailer_length: u64,
    /// CRC-32 over the trailer bytes
    pub trailer_crc: u32,
}

impl Descriptor {
    /// Absolute trailer start offset within the file
    pub const fn trailer_start(&self) -> u64 {
        DESCRIPTOR_LEN as u64 + self.trailer_start_relative
    }

    /// Absolute offset one past the last trailer byte
    pub const fn trailer_end(&self) -> u64 {
        self.trailer_start() + self.trailer_length
    }

    /// Parse the descriptor from the start of `buf` and validate that the
    /// declared trailer span fits inside the buffer.
    ///
    /// `ignore_magic` bypasses the magic-byte check for files with a
    /// deliberately damaged descriptor.
    pub fn parse(buf: &[u8], ignore_magic: bool) -> FormatResult<Self> {
        if buf.len() < DESCRIPTOR_LEN {
            return Err(FormatError::OutOfBounds {
                position: 0,
                requested: DESCRIPTOR_LEN,
                length: buf.len(),
            });
        }
        let mut reader = binrw::io::Cursor::new(buf);
        let descriptor = Self::read_options(&mut reader, Endian::Little, (ignore_magic,))
            .map_err(|e| {
                e.custom_err::<FormatError>()
                    .cloned()
                    .unwrap_or_else(|| FormatError::FormatMismatch(e.to_string()))
            })?;

        let trailer_end = (DESCRIPTOR_LEN as u64)
            .checked_add(descriptor.trailer_start_relative)
            .and_then(|start| start.checked_add(descriptor.trailer_length));
        if trailer_end.is_none_or(|end| end > buf.len() as u64) {
            return Err(FormatError::FormatMismatch(format!(
                "declared trailer span (start {}, length {}) exceeds buffer length {}",
                descriptor.trailer_start(),
                descriptor.trailer_length,
                buf.len()
            )));
        }
        Ok(descriptor)
    }

    /// Serialize back to the 32-byte wire form
    pub fn to_bytes(&self) -> FormatResult<[u8; DESCRIPTOR_LEN]> {
        let mut out = [0u8; DESCRIPTOR_LEN];
        let mut writer = binrw::io::Cursor::new(&mut out[..]);
        self.write_options(&mut writer, Endian::Little, ())
            .map_err(|e| FormatError::FormatMismatch(e.to_string()))?;
        Ok(out)
    }
}

impl BinRead for Descriptor {
    type Args<'a> = (bool,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        (ignore_magic,): Self::Args<'_>,
    ) -> BinResult<Self> {
        let mut magic = [0u8; 6];
        reader.read_exact(&mut magic)?;
        if !ignore_magic && magic != MAGIC {
            return Err(binrw::Error::Custom {
                pos: 0,
                err: Box::new(FormatError::FormatMismatch(format!(
                    "bad magic {magic:02X?}, expected {MAGIC:02X?}"
                ))),
            });
        }

        let version = u16::read_options(reader, Endian::Big, ())?;
        let header_crc = u32::read_options(reader, Endian::Big, ())?;
        let trailer_start_relative = u64::read_options(reader, Endian::Little, ())?;
        let trailer_length = u64::read_options(reader, Endian::Little, ())?;
        let trailer_crc = u32::read_options(reader, Endian::Big, ())?;

        Ok(Self {
            version,
            header_crc,
            trailer_start_relative,
            trailer_length,
            trailer_crc,
        })
    }
}

impl BinWrite for Descriptor {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&MAGIC)?;
        self.version.write_options(writer, Endian::Big, ())?;
        self.header_crc.write_options(writer, Endian::Big, ())?;
        self.trailer_start_relative
            .write_options(writer, Endian::Little, ())?;
        self.trailer_length.write_options(writer, Endian::Little, ())?;
        self.trailer_crc.write_options(writer, Endian::Big, ())?;
        Ok(())
    }
}
