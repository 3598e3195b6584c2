//! Thin access layer over the platform's native file-system calls.
//!
//! Files are opened into owned [`FileHandle`]s supporting sequential and
//! positioned I/O with 64-bit sizes and offsets, directories are scanned
//! through the streaming [`ReadDir`] iterator, and native failure codes are
//! translated into [`FsError`]s that keep the raw code. The `check_*`
//! helpers expose the same translation to callers making their own native
//! calls.

mod dir;
mod error;
mod flags;
mod fs;
mod handle;
mod platform;
mod probe;

pub use dir::{read_dir, DirEntry, ReadDir};
pub use error::{
    check_last_os, check_last_os_accepting, check_os_code, FsError, FsErrorKind, FsResult,
    RawOsCode,
};
pub use flags::{Disposition, FileAttributes, ShareMode};
pub use fs::{create_dir, full_path, OpenOptions};
pub use handle::{AccessMode, FileHandle};
pub use platform::codes;
pub use probe::{attributes, exists};

pub(crate) fn map_os_error(context: &'static str, err: std::io::Error) -> FsError {
    FsError::from_os(context, &err)
}

pub(crate) fn os_result<T>(context: &'static str, result: std::io::Result<T>) -> FsResult<T> {
    result.map_err(|err| map_os_error(context, err))
}
