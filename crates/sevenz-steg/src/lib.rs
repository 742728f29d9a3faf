//! Steganographic payload transport over 7z container files.
//!
//! A valid container has two byte regions no conforming reader looks at:
//! the *center* span between the compressed body and the trailer, and the
//! *bottom* span after the trailer. This crate deposits an opaque payload
//! into one of those regions across one or more files treated as a single
//! logical carrier, and recovers it again, while keeping every file a
//! well-formed container (trailer offsets shifted, checksums recomputed).
//!
//! Parsing is done by the `sevenz-format` crate; this crate adds the
//! carrier orchestration: chunking, staging, batched all-or-nothing
//! commits, and file-pattern selection with natural ordering.

mod carrier;
mod chunk;
mod coordinator;
mod error;
mod select;
#[cfg(test)]
mod test_utils;

pub use carrier::{CarrierFile, Slot};
pub use chunk::split_payload;
pub use coordinator::Carrier;
pub use error::{Stage, StegError, StegResult};
pub use select::{natural_order, resolve_pattern};
