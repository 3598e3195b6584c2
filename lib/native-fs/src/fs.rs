//! Opening files, creating directories, resolving full paths.

use std::path::{Path, PathBuf};

use crate::error::{check_os_code, FsError, FsErrorKind, FsResult, RawOsCode};
use crate::flags::{Disposition, FileAttributes, ShareMode};
use crate::handle::{AccessMode, FileHandle};
use crate::platform;
use crate::{map_os_error, os_result};

/// Builder for opening a [`FileHandle`].
///
/// Defaults to no access, exclusive sharing, and [`Disposition::OpenExisting`];
/// at least one of `read` and `write` must be requested before `open`.
#[derive(Clone, Debug, Default)]
pub struct OpenOptions {
    read: bool,
    write: bool,
    share: ShareMode,
    disposition: Disposition,
    attributes: FileAttributes,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, read: bool) -> &mut Self {
        self.read = read;
        self
    }

    pub fn write(&mut self, write: bool) -> &mut Self {
        self.write = write;
        self
    }

    /// Sharing granted to other openers while the handle is held. Ignored
    /// on Unix, which has no mandatory share modes.
    pub fn share(&mut self, share: ShareMode) -> &mut Self {
        self.share = share;
        self
    }

    pub fn disposition(&mut self, disposition: Disposition) -> &mut Self {
        self.disposition = disposition;
        self
    }

    /// Native attribute bits applied when the open creates the file.
    /// Ignored on Unix.
    pub fn attributes(&mut self, attributes: FileAttributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    pub fn open<P: AsRef<Path>>(&self, path: P) -> FsResult<FileHandle> {
        let path = path.as_ref();
        if !self.read && !self.write {
            return Err(FsError::new(FsErrorKind::InvalidInput, "fs.open.access"));
        }
        if self.disposition.requires_write() && !self.write {
            return Err(FsError::new(
                FsErrorKind::InvalidInput,
                "fs.open.disposition",
            ));
        }
        let raw = os_result(
            "fs.open",
            platform::open_file(
                path,
                self.read,
                self.write,
                self.share.bits(),
                self.disposition,
                self.attributes.bits(),
            ),
        )?;
        tracing::trace!(path = %path.display(), disposition = ?self.disposition, "opened file");
        let mut access = AccessMode::empty();
        if self.read {
            access |= AccessMode::READ;
        }
        if self.write {
            access |= AccessMode::WRITE;
        }
        Ok(FileHandle::new(raw, path.to_path_buf(), access))
    }
}

/// Create a single directory.
///
/// `accepted` lists native codes the caller tolerates, checked against the
/// failure code the same way [`check_os_code`] does; passing
/// `&[codes::ALREADY_EXISTS]` makes the call idempotent. An empty slice
/// accepts nothing but success.
///
/// [`check_os_code`]: crate::check_os_code
pub fn create_dir<P: AsRef<Path>>(path: P, accepted: &[RawOsCode]) -> FsResult<()> {
    let path = path.as_ref();
    match platform::create_dir(path) {
        Ok(()) => Ok(()),
        Err(err) => match err.raw_os_error() {
            Some(code) => {
                check_os_code(code, accepted, "fs.create_dir")?;
                tracing::debug!(path = %path.display(), code, "create_dir code accepted by caller");
                Ok(())
            }
            None => Err(map_os_error("fs.create_dir", err)),
        },
    }
}

/// Resolve `path` to an absolute path with `.` and `..` collapsed, without
/// requiring it to exist.
pub fn full_path<P: AsRef<Path>>(path: P) -> FsResult<PathBuf> {
    os_result("fs.full_path", platform::full_path(path.as_ref()))
}
