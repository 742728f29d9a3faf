//! Parser for the 7z container's metadata.
//!
//! This crate decodes the parts of a container file that describe where
//! everything else lives: the fixed 32-byte leading descriptor, the
//! variable-length opcode-encoded trailer, and the region arithmetic derived
//! from both. It never decodes or re-encodes the compressed body.
//!
//! Two byte regions of a valid container are covered by neither the body nor
//! the trailer: the *center* span between them and the *bottom* span after
//! the trailer. Locating those spans byte-exactly is what makes the carrier
//! layer in `sevenz-steg` possible.
//!
//! # Example
//!
//! ```
//! use sevenz_format::{Archive, MAGIC, ParseOptions};
//!
//! // A minimal container: descriptor, a two-byte trailer, four spare bytes
//! let trailer = [0x01, 0x00]; // Header, End
//! let mut image = Vec::new();
//! image.extend_from_slice(&MAGIC);
//! image.extend_from_slice(&[0x00, 0x04]); // version
//! image.extend_from_slice(&[0; 4]); // header CRC (validity is flagged, not fatal)
//! image.extend_from_slice(&0u64.to_le_bytes()); // trailer start, relative
//! image.extend_from_slice(&(trailer.len() as u64).to_le_bytes());
//! image.extend_from_slice(&crc32fast::hash(&trailer).to_be_bytes());
//! image.extend_from_slice(&trailer);
//! image.extend_from_slice(&[0; 4]);
//!
//! let archive = Archive::parse(&image, &ParseOptions::default())?;
//! assert_eq!(archive.body().len, 0);
//! assert_eq!(archive.center().len, 0);
//! assert_eq!(archive.bottom().len, 4);
//! assert!(archive.trailer_crc_valid());
//! # Ok::<(), sevenz_format::FormatError>(())
//! ```

#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From

mod archive;
pub mod crc;
mod cursor;
mod descriptor;
mod error;
mod regions;
mod trailer;

pub use archive::{Archive, ParseOptions};
pub use cursor::ByteCursor;
pub use descriptor::{DESCRIPTOR_LEN, Descriptor, MAGIC};
pub use error::{FormatError, FormatResult};
pub use regions::{Layout, Span, StegSpans, locate};
pub use trailer::{
    EncoderDescriptor, Encoding, ExpectedSet, Opcode, TrailerKind, TrailerState, successors,
};
