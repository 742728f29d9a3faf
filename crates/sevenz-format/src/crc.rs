//! CRC-32 helpers for descriptor and trailer validation
//!
//! The format uses the standard CRC-32 polynomial for both checksums: the
//! descriptor checksum covers the trailer-location fields it precedes
//! (bytes 12..32 of the file), and the trailer checksum covers the trailer
//! bytes themselves.

use crate::descriptor::DESCRIPTOR_LEN;

/// CRC-32 over an arbitrary span
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// The descriptor checksum: CRC-32 over bytes 12..32 of the file image
pub fn header_crc(image: &[u8]) -> u32 {
    image.get(12..DESCRIPTOR_LEN).map_or(0, crc32fast::hash)
}
