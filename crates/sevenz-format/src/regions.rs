//! Derived region arithmetic over the parsed descriptor and trailer
//!
//! Locates the compressed-body span and the two steganographic spans: the
//! center region between the body and the trailer, and the bottom region
//! after the trailer to the end of the buffer.

use crate::descriptor::{DESCRIPTOR_LEN, Descriptor};
use crate::error::{FormatError, FormatResult};
use crate::trailer::TrailerState;

/// A contiguous byte region within a container file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Absolute start offset
    pub start: usize,
    /// Length in bytes
    pub len: usize,
}

impl Span {
    /// Offset one past the last byte
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Whether the region covers no bytes
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// The region's bytes within `buf`
    pub fn slice(self, buf: &[u8]) -> &[u8] {
        &buf[self.start..self.end()]
    }
}

/// The two unused regions usable as payload slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StegSpans {
    /// Between the end of the compressed body and the trailer start
    pub center: Span,
    /// After the trailer to the end of the buffer
    pub bottom: Span,
}

/// Every derived region of a parsed container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// The compressed-body span, starting at the end of the descriptor
    pub body: Span,
    /// The steganographic spans
    pub steg: StegSpans,
}

/// Compute the layout from parsed values. Pure arithmetic: no mutation, no
/// I/O. A negative computed length means the declared spans contradict each
/// other.
pub fn locate(
    descriptor: &Descriptor,
    trailer: &TrailerState,
    buffer_len: usize,
) -> FormatResult<Layout> {
    let body_len = trailer.body_length();
    let body_end = (DESCRIPTOR_LEN as u64).saturating_add(body_len);
    let trailer_start = descriptor.trailer_start();
    let trailer_end = descriptor.trailer_end();

    if body_end > trailer_start {
        return Err(FormatError::InconsistentLayout(format!(
            "compressed body ends at {body_end}, past the trailer start {trailer_start}"
        )));
    }
    if trailer_end > buffer_len as u64 {
        return Err(FormatError::InconsistentLayout(format!(
            "trailer ends at {trailer_end}, past the buffer length {buffer_len}"
        )));
    }

    let body = Span {
        start: DESCRIPTOR_LEN,
        len: body_len as usize,
    };
    let center = Span {
        start: body_end as usize,
        len: (trailer_start - body_end) as usize,
    };
    let bottom = Span {
        start: trailer_end as usize,
        len: buffer_len - trailer_end as usize,
    };
    Ok(Layout {
        body,
        steg: StegSpans { center, bottom },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(relative: u64, length: u64) -> Descriptor {
        Descriptor {
            version: 4,
            header_crc: 0,
            trailer_start_relative: relative,
            trailer_length: length,
            trailer_crc: 0,
        }
    }

    fn trailer(data_offset: u64, pack_sizes: &[u64]) -> TrailerState {
        TrailerState {
            data_offset,
            pack_sizes: pack_sizes.to_vec(),
            ..TrailerState::default()
        }
    }

    #[test]
    fn regions_are_ordered_and_adjacent() {
        // body 10 bytes, 4-byte center gap, 6-byte trailer, 3 bottom bytes
        let layout = locate(&descriptor(14, 6), &trailer(0, &[10]), 55).unwrap();
        assert_eq!(layout.body, Span { start: 32, len: 10 });
        assert_eq!(layout.steg.center, Span { start: 42, len: 4 });
        assert_eq!(layout.steg.bottom, Span { start: 52, len: 3 });
        assert!(layout.body.end() <= layout.steg.center.start);
        assert!(layout.steg.center.end() == 46);
    }

    #[test]
    fn both_steg_spans_may_be_empty() {
        let layout = locate(&descriptor(10, 6), &trailer(0, &[10]), 48).unwrap();
        assert!(layout.steg.center.is_empty());
        assert!(layout.steg.bottom.is_empty());
    }

    #[test]
    fn body_past_trailer_start_is_inconsistent() {
        let err = locate(&descriptor(4, 6), &trailer(0, &[10]), 64).unwrap_err();
        assert!(matches!(err, FormatError::InconsistentLayout(_)));
    }

    #[test]
    fn trailer_past_buffer_end_is_inconsistent() {
        let err = locate(&descriptor(0, 40), &trailer(0, &[]), 64).unwrap_err();
        assert!(matches!(err, FormatError::InconsistentLayout(_)));
    }

    #[test]
    fn span_slicing() {
        let buf: Vec<u8> = (0..10).collect();
        let span = Span { start: 3, len: 4 };
        assert_eq!(span.slice(&buf), &[3, 4, 5, 6]);
    }
}
