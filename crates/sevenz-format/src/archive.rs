//! One complete parse pass over a container file

use tracing::debug;

use crate::crc;
use crate::descriptor::Descriptor;
use crate::error::FormatResult;
use crate::regions::{Layout, Span, locate};
use crate::trailer::{EncoderDescriptor, TrailerState};

/// Knobs for a parse pass
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Skip the magic-byte check
    pub ignore_magic: bool,
}

/// A fully parsed container: descriptor, trailer state, and derived layout.
///
/// Exposes read-only accessors for every parsed field so a presentation
/// layer can format reports; performs no output itself.
#[derive(Debug, Clone)]
pub struct Archive {
    descriptor: Descriptor,
    trailer: TrailerState,
    layout: Layout,
    header_crc_valid: bool,
    trailer_crc_valid: bool,
}

impl Archive {
    /// Parse a complete container image.
    ///
    /// Runs descriptor parse, trailer walk, and region arithmetic; any
    /// failure is fatal and nothing partially parsed is returned. Checksum
    /// mismatches are recorded as validity flags rather than failing the
    /// parse, so damaged files can still be inspected and repaired.
    pub fn parse(buf: &[u8], options: &ParseOptions) -> FormatResult<Self> {
        let descriptor = Descriptor::parse(buf, options.ignore_magic)?;
        let trailer_span = Span {
            start: descriptor.trailer_start() as usize,
            len: descriptor.trailer_length as usize,
        };
        let trailer_bytes = trailer_span.slice(buf);
        let trailer = TrailerState::parse(trailer_bytes)?;
        let layout = locate(&descriptor, &trailer, buf.len())?;

        let header_crc_valid = descriptor.header_crc == crc::header_crc(buf);
        let trailer_crc_valid = descriptor.trailer_crc == crc::crc32(trailer_bytes);
        debug!(
            version = descriptor.version,
            trailer_start = descriptor.trailer_start(),
            trailer_length = descriptor.trailer_length,
            body_length = layout.body.len,
            center_length = layout.steg.center.len,
            bottom_length = layout.steg.bottom.len,
            "parsed container"
        );

        Ok(Self {
            descriptor,
            trailer,
            layout,
            header_crc_valid,
            trailer_crc_valid,
        })
    }

    /// The fixed leading descriptor
    pub const fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Accumulated trailer metadata
    pub const fn trailer(&self) -> &TrailerState {
        &self.trailer
    }

    /// Every derived region
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The trailer's own byte span
    pub const fn trailer_span(&self) -> Span {
        Span {
            start: self.descriptor.trailer_start() as usize,
            len: self.descriptor.trailer_length as usize,
        }
    }

    /// The compressed-body span
    pub const fn body(&self) -> Span {
        self.layout.body
    }

    /// The center steganographic span, between body end and trailer start
    pub const fn center(&self) -> Span {
        self.layout.steg.center
    }

    /// The bottom steganographic span, after the trailer
    pub const fn bottom(&self) -> Span {
        self.layout.steg.bottom
    }

    /// Pack sizes in stream order
    pub fn pack_sizes(&self) -> &[u64] {
        &self.trailer.pack_sizes
    }

    /// Encoder descriptors in declaration order
    pub fn encoders(&self) -> &[EncoderDescriptor] {
        &self.trailer.encoders
    }

    /// Whether the stored descriptor checksum matches the file bytes
    pub const fn header_crc_valid(&self) -> bool {
        self.header_crc_valid
    }

    /// Whether the stored trailer checksum matches the trailer bytes
    pub const fn trailer_crc_valid(&self) -> bool {
        self.trailer_crc_valid
    }
}
