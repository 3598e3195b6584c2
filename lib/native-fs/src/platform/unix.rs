use std::ffi::{CStr, CString, OsStr, OsString};
use std::io;
use std::io::SeekFrom;
use std::mem;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::path::{Component, Path, PathBuf};

use super::{unix_nanos, RawDirEntry};
use crate::error::{FsErrorKind, RawOsCode};
use crate::flags::Disposition;

pub(crate) type RawFile = OwnedFd;

/// Native error codes this backend reports. Names shared with the Windows
/// backend map to the nearest `errno` value.
pub mod codes {
    use crate::error::RawOsCode;

    pub const SUCCESS: RawOsCode = 0;
    pub const NOT_FOUND: RawOsCode = libc::ENOENT;
    pub const PATH_NOT_FOUND: RawOsCode = libc::ENOTDIR;
    pub const ALREADY_EXISTS: RawOsCode = libc::EEXIST;
    pub const ACCESS_DENIED: RawOsCode = libc::EACCES;
    pub const INVALID_ARGUMENT: RawOsCode = libc::EINVAL;
}

pub(crate) fn error_kind(code: RawOsCode) -> FsErrorKind {
    match code {
        libc::ENOENT | libc::ENOTDIR => FsErrorKind::NotFound,
        libc::EEXIST => FsErrorKind::AlreadyExists,
        libc::EACCES | libc::EPERM => FsErrorKind::PermissionDenied,
        libc::EINVAL => FsErrorKind::InvalidInput,
        _ => FsErrorKind::Os,
    }
}

fn cstr(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))
}

pub(crate) fn open_file(
    path: &Path,
    read: bool,
    write: bool,
    _share: u32,
    disposition: Disposition,
    _attributes: u32,
) -> io::Result<RawFile> {
    let cstr = cstr(path)?;
    let mut oflags = libc::O_CLOEXEC;
    oflags |= match disposition {
        Disposition::OpenExisting => 0,
        Disposition::OpenAlways => libc::O_CREAT,
        Disposition::CreateNew => libc::O_CREAT | libc::O_EXCL,
        Disposition::CreateAlways => libc::O_CREAT | libc::O_TRUNC,
        Disposition::TruncateExisting => libc::O_TRUNC,
    };
    oflags |= if read && write {
        libc::O_RDWR
    } else if write {
        libc::O_WRONLY
    } else {
        libc::O_RDONLY
    };
    let mode = 0o666 as libc::mode_t;
    let fd = unsafe { libc::open(cstr.as_ptr(), oflags, mode) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub(crate) fn close_file(file: RawFile) -> io::Result<()> {
    let fd = file.into_raw_fd();
    let res = unsafe { libc::close(fd) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn read(file: &RawFile, buf: &mut [u8]) -> io::Result<usize> {
    let res = unsafe { libc::read(file.as_raw_fd(), buf.as_mut_ptr() as *mut _, buf.len()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as usize)
}

pub(crate) fn write(file: &RawFile, buf: &[u8]) -> io::Result<usize> {
    let res = unsafe { libc::write(file.as_raw_fd(), buf.as_ptr() as *const _, buf.len()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as usize)
}

pub(crate) fn read_at(file: &RawFile, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let offset = checked_offset(offset)?;
    let res = unsafe {
        libc::pread(
            file.as_raw_fd(),
            buf.as_mut_ptr() as *mut _,
            buf.len(),
            offset,
        )
    };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as usize)
}

pub(crate) fn write_at(file: &RawFile, buf: &[u8], offset: u64) -> io::Result<usize> {
    let offset = checked_offset(offset)?;
    let res = unsafe {
        libc::pwrite(
            file.as_raw_fd(),
            buf.as_ptr() as *const _,
            buf.len(),
            offset,
        )
    };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as usize)
}

pub(crate) fn seek(file: &RawFile, pos: SeekFrom) -> io::Result<u64> {
    let (offset, whence) = match pos {
        SeekFrom::Start(n) => (checked_offset(n)?, libc::SEEK_SET),
        SeekFrom::Current(n) => (n as libc::off_t, libc::SEEK_CUR),
        SeekFrom::End(n) => (n as libc::off_t, libc::SEEK_END),
    };
    let res = unsafe { libc::lseek(file.as_raw_fd(), offset, whence) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as u64)
}

pub(crate) fn truncate_at_cursor(file: &RawFile) -> io::Result<()> {
    let pos = unsafe { libc::lseek(file.as_raw_fd(), 0, libc::SEEK_CUR) };
    if pos < 0 {
        return Err(io::Error::last_os_error());
    }
    let res = unsafe { libc::ftruncate(file.as_raw_fd(), pos) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn file_len(file: &RawFile) -> io::Result<u64> {
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let res = unsafe { libc::fstat(file.as_raw_fd(), &mut st) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(st.st_size as u64)
}

pub(crate) fn sync_all(file: &RawFile) -> io::Result<()> {
    let res = unsafe { libc::fsync(file.as_raw_fd()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn create_dir(path: &Path) -> io::Result<()> {
    let cstr = cstr(path)?;
    let mode = 0o777 as libc::mode_t;
    let res = unsafe { libc::mkdir(cstr.as_ptr(), mode) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn path_exists(path: &Path) -> bool {
    let Ok(cstr) = cstr(path) else {
        return false;
    };
    unsafe { libc::access(cstr.as_ptr(), libc::F_OK) == 0 }
}

pub(crate) fn path_attributes(path: &Path) -> io::Result<u32> {
    let cstr = cstr(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let res = unsafe { libc::lstat(cstr.as_ptr(), &mut st) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(st.st_mode as u32)
}

pub(crate) fn full_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_path(&absolute))
}

/// Lexical normalization: collapses `.` and resolves `..` against the
/// preceding component without touching the file system. `..` at the root
/// stays at the root, matching what the native full-path call does.
fn normalize_path(path: &Path) -> PathBuf {
    let mut ret = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                ret.push(prefix.as_os_str());
            }
            Component::RootDir => {
                ret.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => {
                ret.push(c);
            }
        }
    }
    ret
}

pub(crate) struct DirStream {
    dirp: *mut libc::DIR,
}

pub(crate) fn open_dir_stream(path: &Path) -> io::Result<DirStream> {
    let cstr = cstr(path)?;
    let dirp = unsafe { libc::opendir(cstr.as_ptr()) };
    if dirp.is_null() {
        return Err(io::Error::last_os_error());
    }
    Ok(DirStream { dirp })
}

impl DirStream {
    /// Load the next entry, skipping the `.` and `..` links. `Ok(None)`
    /// means the stream is exhausted; a null result with a non-zero errno
    /// is a real failure. The errno slot is cleared first because a
    /// successful end-of-stream does not write to it.
    pub(crate) fn advance(&mut self) -> io::Result<Option<RawDirEntry>> {
        loop {
            set_errno(0);
            let ent = unsafe { libc::readdir(self.dirp) };
            if ent.is_null() {
                let err = errno();
                if err == 0 {
                    return Ok(None);
                }
                return Err(io::Error::from_raw_os_error(err));
            }
            let bytes = unsafe { CStr::from_ptr((*ent).d_name.as_ptr()) }.to_bytes();
            if bytes == b"." || bytes == b".." {
                continue;
            }
            let name = OsString::from_vec(bytes.to_vec());
            let st = self.stat_entry(&name)?;
            return Ok(Some(RawDirEntry {
                name,
                attributes: st.st_mode as u32,
                len: st.st_size as u64,
                accessed: unix_nanos(st.st_atime as i64, st.st_atime_nsec as i64),
                // Status-change time stands in for a creation stamp here.
                created: unix_nanos(st.st_ctime as i64, st.st_ctime_nsec as i64),
                modified: unix_nanos(st.st_mtime as i64, st.st_mtime_nsec as i64),
            }));
        }
    }

    fn stat_entry(&self, name: &OsStr) -> io::Result<libc::stat> {
        let cstr = CString::new(name.as_bytes())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "name contains NUL"))?;
        let fd = unsafe { libc::dirfd(self.dirp) };
        let mut st = unsafe { mem::zeroed::<libc::stat>() };
        let res = unsafe { libc::fstatat(fd, cstr.as_ptr(), &mut st, libc::AT_SYMLINK_NOFOLLOW) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(st)
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        unsafe {
            libc::closedir(self.dirp);
        }
    }
}

fn checked_offset(offset: u64) -> io::Result<libc::off_t> {
    libc::off_t::try_from(offset).map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))
}

#[cfg(target_os = "linux")]
fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}

#[cfg(target_os = "macos")]
fn errno() -> i32 {
    unsafe { *libc::__error() }
}

#[cfg(target_os = "linux")]
fn set_errno(val: i32) {
    unsafe {
        *libc::__errno_location() = val;
    }
}

#[cfg(target_os = "macos")]
fn set_errno(val: i32) {
    unsafe {
        *libc::__error() = val;
    }
}
