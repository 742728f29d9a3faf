//! Distributing a payload across an ordered batch of carrier files

use std::io::Write;
use std::path::{Path, PathBuf};

use sevenz_format::ParseOptions;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::carrier::{CarrierFile, Slot};
use crate::chunk::split_payload;
use crate::error::{StegError, StegResult};

/// An ordered sequence of carrier files treated as one logical payload slot
/// set.
///
/// Files are parsed independently at open; a parse failure on any file
/// fails the whole batch before anything is read or written. Injection
/// stages every file in memory first, and [`Carrier::commit`] writes every
/// file to a temporary location before renaming any of them, so a mid-batch
/// failure never leaves some files modified and others not.
#[derive(Debug)]
pub struct Carrier {
    files: Vec<CarrierFile>,
    options: ParseOptions,
}

impl Carrier {
    /// Open and parse every path, in the caller-supplied order
    pub fn open<I, P>(paths: I, options: ParseOptions) -> StegResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files = paths
            .into_iter()
            .map(|path| CarrierFile::open(path, &options))
            .collect::<StegResult<Vec<_>>>()?;
        Self::from_files(files, options)
    }

    /// Build a carrier over in-memory container images
    pub fn from_buffers(buffers: Vec<Vec<u8>>, options: ParseOptions) -> StegResult<Self> {
        let files = buffers
            .into_iter()
            .map(|data| CarrierFile::from_bytes(data, &options))
            .collect::<StegResult<Vec<_>>>()?;
        Self::from_files(files, options)
    }

    fn from_files(files: Vec<CarrierFile>, options: ParseOptions) -> StegResult<Self> {
        if files.is_empty() {
            return Err(StegError::EmptyBatch);
        }
        debug!(files = files.len(), "carrier assembled");
        Ok(Self { files, options })
    }

    /// The carrier's files, in payload order
    pub fn files(&self) -> &[CarrierFile] {
        &self.files
    }

    /// Number of files in the carrier
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the carrier holds no files (never true after construction)
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Concatenate the chosen slot's bytes across all files, in order
    pub fn extract(&self, slot: Slot) -> Vec<u8> {
        let mut payload = Vec::new();
        for file in &self.files {
            payload.extend_from_slice(file.slot_bytes(slot));
        }
        payload
    }

    /// Stage `payload` across the files, split into near-equal contiguous
    /// chunks. Nothing touches disk until [`Carrier::commit`].
    pub fn inject(&mut self, payload: &[u8], slot: Slot) {
        let chunks = split_payload(payload, self.files.len());
        for (file, chunk) in self.files.iter_mut().zip(chunks) {
            file.stage(slot, chunk.to_vec());
        }
        info!(
            bytes = payload.len(),
            files = self.files.len(),
            slot = %slot,
            "payload staged"
        );
    }

    /// Commit every staged file as one batch.
    ///
    /// Three phases: rebuild every image in memory, write every image to a
    /// temporary file beside its destination, then rename them all. An
    /// error in the first two phases leaves every original untouched.
    pub fn commit(&mut self) -> StegResult<()> {
        let mut images = Vec::with_capacity(self.files.len());
        for file in &self.files {
            images.push(file.rebuild()?);
        }

        let mut pending: Vec<(NamedTempFile, PathBuf)> = Vec::new();
        for (file, image) in self.files.iter().zip(&images) {
            if let Some(path) = file.path() {
                pending.push((write_temp(path, image)?, path.to_path_buf()));
            }
        }
        for (temp, destination) in pending {
            temp.persist(&destination).map_err(|e| StegError::Io {
                path: destination.clone(),
                source: e.error,
            })?;
        }

        for (file, image) in self.files.iter_mut().zip(images) {
            file.adopt(image, &self.options)?;
        }
        info!(files = self.files.len(), "carrier committed");
        Ok(())
    }
}

/// Write a rebuilt image to a temporary file in the destination's directory
fn write_temp(path: &Path, image: &[u8]) -> StegResult<NamedTempFile> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source| StegError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut temp = NamedTempFile::new_in(directory).map_err(io_error)?;
    temp.write_all(image).map_err(io_error)?;
    temp.flush().map_err(io_error)?;
    Ok(temp)
}
