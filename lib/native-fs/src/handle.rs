//! Owned file handles and the operations that run against them.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::error::{FsError, FsErrorKind, FsResult};
use crate::os_result;
use crate::platform;

bitflags! {
    /// Access granted when the handle was opened.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AccessMode: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
    }
}

/// An open file, holding the native descriptor for its whole lifetime.
///
/// The descriptor is released exactly once: by [`FileHandle::close`], which
/// consumes the handle and reports any release failure, or by drop as the
/// fallback. Sequential operations share the handle's cursor and take
/// `&mut self`; positioned operations carry their own offset, take `&self`,
/// and may run from several threads at once.
#[derive(Debug)]
pub struct FileHandle {
    raw: Option<platform::RawFile>,
    path: PathBuf,
    access: AccessMode,
}

impl FileHandle {
    pub(crate) fn new(raw: platform::RawFile, path: PathBuf, access: AccessMode) -> Self {
        Self {
            raw: Some(raw),
            path,
            access,
        }
    }

    /// The path this handle was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access
    }

    /// Read at the cursor, advancing it. A zero-length result on a
    /// non-empty buffer means end of file.
    pub fn read(&mut self, buf: &mut [u8]) -> FsResult<usize> {
        self.require_access(AccessMode::READ, "handle.read.access")?;
        os_result("handle.read", platform::read(self.raw(), buf))
    }

    /// Write at the cursor, advancing it. May transfer fewer bytes than
    /// requested.
    pub fn write(&mut self, buf: &[u8]) -> FsResult<usize> {
        self.require_access(AccessMode::WRITE, "handle.write.access")?;
        os_result("handle.write", platform::write(self.raw(), buf))
    }

    /// Read at an explicit offset without consulting the cursor. Reads
    /// past the end of the file return zero bytes. On Windows the OS may
    /// still move the cursor as a side effect, so callers interleaving
    /// positioned and sequential reads should reseek in between.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> FsResult<usize> {
        self.require_access(AccessMode::READ, "handle.read_at.access")?;
        os_result("handle.read_at", platform::read_at(self.raw(), buf, offset))
    }

    /// Write at an explicit offset without consulting the cursor. Writes
    /// past the end of the file extend it.
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> FsResult<usize> {
        self.require_access(AccessMode::WRITE, "handle.write_at.access")?;
        os_result("handle.write_at", platform::write_at(self.raw(), buf, offset))
    }

    /// Move the cursor and return its new absolute position. Seeking past
    /// the end of the file is allowed; seeking to a negative resolved
    /// position is rejected by the OS.
    pub fn seek(&mut self, pos: SeekFrom) -> FsResult<u64> {
        os_result("handle.seek", platform::seek(self.raw(), pos))
    }

    /// Current cursor position.
    pub fn tell(&self) -> FsResult<u64> {
        os_result("handle.tell", platform::seek(self.raw(), SeekFrom::Current(0)))
    }

    /// Cut the file off at the current cursor position.
    pub fn truncate(&self) -> FsResult<()> {
        self.require_access(AccessMode::WRITE, "handle.truncate.access")?;
        os_result("handle.truncate", platform::truncate_at_cursor(self.raw()))
    }

    /// Current size of the file in bytes.
    pub fn len(&self) -> FsResult<u64> {
        os_result("handle.len", platform::file_len(self.raw()))
    }

    /// Flush buffered data for this handle down to the device.
    pub fn sync_all(&self) -> FsResult<()> {
        os_result("handle.sync", platform::sync_all(self.raw()))
    }

    /// Release the descriptor, reporting any failure from the OS. Dropping
    /// the handle releases it too, but swallows the outcome.
    pub fn close(mut self) -> FsResult<()> {
        match self.raw.take() {
            Some(raw) => {
                tracing::trace!(?self.path, "closing file handle");
                os_result("handle.close", platform::close_file(raw))
            }
            None => Ok(()),
        }
    }

    fn require_access(&self, needed: AccessMode, context: &'static str) -> FsResult<()> {
        if self.access.contains(needed) {
            Ok(())
        } else {
            Err(FsError::new(FsErrorKind::InvalidInput, context))
        }
    }

    fn raw(&self) -> &platform::RawFile {
        // Only close() clears the slot, and close() consumes the handle.
        self.raw.as_ref().expect("file handle already released")
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            tracing::trace!(?self.path, "closing file handle");
            drop(raw);
        }
    }
}
