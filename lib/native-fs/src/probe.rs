//! Path probes that answer questions without opening a handle.

use std::path::Path;

use crate::error::FsResult;
use crate::flags::FileAttributes;
use crate::os_result;
use crate::platform;

/// Whether anything exists at `path`.
///
/// This is a yes/no probe: paths that are malformed or cannot be reached
/// report `false` rather than failing.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    platform::path_exists(path.as_ref())
}

/// Native attribute word for the entry at `path`, without following a
/// trailing symbolic link. A missing path reports
/// [`FsErrorKind::NotFound`](crate::FsErrorKind::NotFound).
pub fn attributes<P: AsRef<Path>>(path: P) -> FsResult<FileAttributes> {
    os_result("probe.attributes", platform::path_attributes(path.as_ref()))
        .map(FileAttributes::from_bits)
}
