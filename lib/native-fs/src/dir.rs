//! Directory scanning.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::FsResult;
use crate::flags::FileAttributes;
use crate::platform::{self, RawDirEntry};
use crate::{map_os_error, os_result};

/// One entry yielded by a directory scan. The `.` and `..` links are
/// never reported.
#[derive(Clone, Debug)]
pub struct DirEntry {
    /// Name within the scanned directory, not a full path.
    pub name: OsString,
    pub attributes: FileAttributes,
    pub len: u64,
    /// Timestamps in nanoseconds since the Unix epoch, zero if the
    /// platform does not supply them.
    pub accessed: u64,
    pub created: u64,
    pub modified: u64,
}

impl DirEntry {
    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }

    pub fn is_regular_file(&self) -> bool {
        self.attributes.is_regular_file()
    }

    fn from_raw(raw: RawDirEntry) -> Self {
        Self {
            name: raw.name,
            attributes: FileAttributes::from_bits(raw.attributes),
            len: raw.len,
            accessed: raw.accessed,
            created: raw.created,
            modified: raw.modified,
        }
    }
}

/// Forward-only scan over one directory, holding the native search handle.
///
/// The handle is released exactly once: when the scan reports its last
/// entry, when an entry fails to load, or when the iterator is dropped
/// early, whichever comes first. After exhaustion or an error the iterator
/// keeps returning `None`.
pub struct ReadDir {
    path: PathBuf,
    inner: Option<platform::DirStream>,
    yielded: u64,
}

impl ReadDir {
    /// The directory being scanned.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// The native search handle has no `Debug` form, so report the scan state
// around it.
impl fmt::Debug for ReadDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadDir")
            .field("path", &self.path)
            .field("yielded", &self.yielded)
            .finish_non_exhaustive()
    }
}

impl Iterator for ReadDir {
    type Item = FsResult<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.inner.as_mut()?;
        match stream.advance() {
            Ok(Some(raw)) => {
                self.yielded += 1;
                Some(Ok(DirEntry::from_raw(raw)))
            }
            Ok(None) => {
                self.inner = None;
                tracing::debug!(
                    path = %self.path.display(),
                    entries = self.yielded,
                    "directory scan complete"
                );
                None
            }
            Err(err) => {
                self.inner = None;
                Some(Err(map_os_error("dir.advance", err)))
            }
        }
    }
}

/// Start a scan of `path`. Opening a directory that does not exist is a
/// failure; a directory with no entries yields an empty scan.
pub fn read_dir<P: AsRef<Path>>(path: P) -> FsResult<ReadDir> {
    let path = path.as_ref();
    let inner = os_result("dir.open", platform::open_dir_stream(path))?;
    tracing::debug!(path = %path.display(), "starting directory scan");
    Ok(ReadDir {
        path: path.to_path_buf(),
        inner: Some(inner),
        yielded: 0,
    })
}
