//! Shared container fixtures for carrier tests

use sevenz_format::{MAGIC, crc};

/// Assemble a valid container image around `body`, with the given slot
/// contents. The trailer declares one pack stream covering the whole body.
pub(crate) fn build_container(body: &[u8], center: &[u8], bottom: &[u8]) -> Vec<u8> {
    assert!(body.len() < 0x80, "fixture bodies stay under one varint byte");
    let trailer = [
        0x01, // Header
        0x04, // MainStreamsInfo
        0x06, 0x00, 0x01, // PackInfo: data offset 0, 1 stream
        0x09, body.len() as u8, // Size
        0x00, // End
    ];

    let mut image = Vec::new();
    image.extend_from_slice(&MAGIC);
    image.extend_from_slice(&[0x00, 0x04]); // version
    image.extend_from_slice(&[0; 4]); // header CRC, patched below
    image.extend_from_slice(&((body.len() + center.len()) as u64).to_le_bytes());
    image.extend_from_slice(&(trailer.len() as u64).to_le_bytes());
    image.extend_from_slice(&crc::crc32(&trailer).to_be_bytes());
    image.extend_from_slice(body);
    image.extend_from_slice(center);
    image.extend_from_slice(&trailer);
    image.extend_from_slice(bottom);
    let header_crc = crc::header_crc(&image);
    image[8..12].copy_from_slice(&header_crc.to_be_bytes());
    image
}
