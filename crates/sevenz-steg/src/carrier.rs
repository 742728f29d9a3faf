//! One container file holding a share of the payload

use std::fs;
use std::path::{Path, PathBuf};

use sevenz_format::{Archive, ParseOptions, crc};
use tracing::debug;

use crate::error::{Stage, StegError, StegResult};

/// Which steganographic region carries the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Between the compressed body and the trailer
    Center,
    /// After the trailer, at the end of the file
    Bottom,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Center => "center",
            Self::Bottom => "bottom",
        })
    }
}

#[derive(Debug, Clone)]
struct Staged {
    slot: Slot,
    content: Vec<u8>,
}

/// One parsed container plus its raw buffer.
///
/// Owned exclusively while open. Payload content is staged in memory; the
/// file on disk changes only when the whole batch commits.
#[derive(Debug)]
pub struct CarrierFile {
    path: Option<PathBuf>,
    data: Vec<u8>,
    archive: Archive,
    staged: Option<Staged>,
}

impl CarrierFile {
    /// Read and parse a container from disk
    pub fn open(path: impl Into<PathBuf>, options: &ParseOptions) -> StegResult<Self> {
        let path = path.into();
        let data = fs::read(&path).map_err(|source| StegError::Io {
            path: path.clone(),
            source,
        })?;
        let archive = Archive::parse(&data, options).map_err(|source| StegError::Format {
            path: path.clone(),
            stage: Stage::Parse,
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "opened carrier file");
        Ok(Self {
            path: Some(path),
            data,
            archive,
            staged: None,
        })
    }

    /// Parse a container from an in-memory buffer
    pub fn from_bytes(data: Vec<u8>, options: &ParseOptions) -> StegResult<Self> {
        let archive = Archive::parse(&data, options).map_err(|source| StegError::Format {
            path: PathBuf::from("<buffer>"),
            stage: Stage::Parse,
            source,
        })?;
        Ok(Self {
            path: None,
            data,
            archive,
            staged: None,
        })
    }

    /// The parsed view of this container
    pub const fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Backing path, if the file came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw container image
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The current bytes of the given payload slot
    pub fn slot_bytes(&self, slot: Slot) -> &[u8] {
        let span = match slot {
            Slot::Center => self.archive.center(),
            Slot::Bottom => self.archive.bottom(),
        };
        span.slice(&self.data)
    }

    /// Stage replacement content for a slot; nothing touches disk until the
    /// batch commits
    pub fn stage(&mut self, slot: Slot, content: Vec<u8>) {
        self.staged = Some(Staged { slot, content });
    }

    /// Whether content is staged and uncommitted
    pub const fn has_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Rebuild the container image with any staged content applied.
    ///
    /// The image is reassembled as descriptor, body, center, trailer,
    /// bottom. Staged center content sits before the trailer, so the stored
    /// trailer start shifts by its length; bottom content needs no shift.
    /// Both checksums are recomputed, so the result is a well-formed
    /// container even when the input's checksums were stale.
    pub fn rebuild(&self) -> StegResult<Vec<u8>> {
        let layout = self.archive.layout();
        let trailer_span = self.archive.trailer_span();
        let (center, bottom): (&[u8], &[u8]) = match &self.staged {
            Some(staged) => match staged.slot {
                Slot::Center => (&staged.content, layout.steg.bottom.slice(&self.data)),
                Slot::Bottom => (layout.steg.center.slice(&self.data), &staged.content),
            },
            None => (
                layout.steg.center.slice(&self.data),
                layout.steg.bottom.slice(&self.data),
            ),
        };
        let body = layout.body.slice(&self.data);
        let trailer = trailer_span.slice(&self.data);

        let mut descriptor = *self.archive.descriptor();
        descriptor.trailer_start_relative = (body.len() + center.len()) as u64;
        descriptor.trailer_crc = crc::crc32(trailer);
        let provisional = descriptor
            .to_bytes()
            .map_err(|source| self.format_error(Stage::Stage, source))?;
        descriptor.header_crc = crc::crc32(&provisional[12..]);
        let descriptor_bytes = descriptor
            .to_bytes()
            .map_err(|source| self.format_error(Stage::Stage, source))?;

        let mut image = Vec::with_capacity(
            descriptor_bytes.len() + body.len() + center.len() + trailer.len() + bottom.len(),
        );
        image.extend_from_slice(&descriptor_bytes);
        image.extend_from_slice(body);
        image.extend_from_slice(center);
        image.extend_from_slice(trailer);
        image.extend_from_slice(bottom);
        Ok(image)
    }

    /// Replace the in-memory state with a committed image
    pub(crate) fn adopt(&mut self, image: Vec<u8>, options: &ParseOptions) -> StegResult<()> {
        let archive = Archive::parse(&image, options)
            .map_err(|source| self.format_error(Stage::Commit, source))?;
        self.data = image;
        self.archive = archive;
        self.staged = None;
        Ok(())
    }

    pub(crate) fn display_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from("<buffer>"))
    }

    fn format_error(&self, stage: Stage, source: sevenz_format::FormatError) -> StegError {
        StegError::Format {
            path: self.display_path(),
            stage,
            source,
        }
    }
}
