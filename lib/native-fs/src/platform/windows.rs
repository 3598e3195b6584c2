use std::ffi::OsString;
use std::io;
use std::io::SeekFrom;
use std::mem;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::os::windows::io::{AsRawHandle, FromRawHandle, IntoRawHandle, OwnedHandle};
use std::path::{Path, PathBuf};
use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, SetLastError, ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_FILE_EXISTS,
    ERROR_FILE_NOT_FOUND, ERROR_HANDLE_EOF, ERROR_INVALID_PARAMETER, ERROR_NEGATIVE_SEEK,
    ERROR_NO_MORE_FILES, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS, FILETIME, GENERIC_READ,
    GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateDirectoryW, CreateFileW, FindClose, FindFirstFileW, FindNextFileW, FlushFileBuffers,
    GetFileAttributesW, GetFileSizeEx, GetFullPathNameW, ReadFile, SetEndOfFile, SetFilePointer,
    WriteFile, CREATE_ALWAYS, CREATE_NEW, FILE_ATTRIBUTE_NORMAL, FILE_BEGIN, FILE_CURRENT,
    FILE_END, INVALID_FILE_ATTRIBUTES, INVALID_SET_FILE_POINTER, OPEN_ALWAYS, OPEN_EXISTING,
    TRUNCATE_EXISTING, WIN32_FIND_DATAW,
};
use windows_sys::Win32::System::IO::OVERLAPPED;

use super::{join_offset, split_offset, RawDirEntry};
use crate::error::{FsErrorKind, RawOsCode};
use crate::flags::Disposition;

pub(crate) type RawFile = OwnedHandle;

/// Native error codes this backend reports.
pub mod codes {
    use crate::error::RawOsCode;
    use windows_sys::Win32::Foundation as f;

    pub const SUCCESS: RawOsCode = f::ERROR_SUCCESS as RawOsCode;
    pub const NOT_FOUND: RawOsCode = f::ERROR_FILE_NOT_FOUND as RawOsCode;
    pub const PATH_NOT_FOUND: RawOsCode = f::ERROR_PATH_NOT_FOUND as RawOsCode;
    pub const ACCESS_DENIED: RawOsCode = f::ERROR_ACCESS_DENIED as RawOsCode;
    pub const NO_MORE_FILES: RawOsCode = f::ERROR_NO_MORE_FILES as RawOsCode;
    pub const HANDLE_EOF: RawOsCode = f::ERROR_HANDLE_EOF as RawOsCode;
    pub const FILE_EXISTS: RawOsCode = f::ERROR_FILE_EXISTS as RawOsCode;
    pub const INVALID_ARGUMENT: RawOsCode = f::ERROR_INVALID_PARAMETER as RawOsCode;
    pub const NEGATIVE_SEEK: RawOsCode = f::ERROR_NEGATIVE_SEEK as RawOsCode;
    pub const ALREADY_EXISTS: RawOsCode = f::ERROR_ALREADY_EXISTS as RawOsCode;
}

pub(crate) fn error_kind(code: RawOsCode) -> FsErrorKind {
    match code as u32 {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => FsErrorKind::NotFound,
        ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => FsErrorKind::AlreadyExists,
        ERROR_ACCESS_DENIED => FsErrorKind::PermissionDenied,
        ERROR_HANDLE_EOF => FsErrorKind::EndOfFile,
        ERROR_NO_MORE_FILES => FsErrorKind::NoMoreEntries,
        ERROR_INVALID_PARAMETER | ERROR_NEGATIVE_SEEK => FsErrorKind::InvalidInput,
        _ => FsErrorKind::Os,
    }
}

fn wide(path: &Path) -> io::Result<Vec<u16>> {
    let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    if wide.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains NUL",
        ));
    }
    wide.push(0);
    Ok(wide)
}

pub(crate) fn open_file(
    path: &Path,
    read: bool,
    write: bool,
    share: u32,
    disposition: Disposition,
    attributes: u32,
) -> io::Result<RawFile> {
    let wide = wide(path)?;
    let mut access = 0u32;
    if read {
        access |= GENERIC_READ;
    }
    if write {
        access |= GENERIC_WRITE;
    }
    let disposition = match disposition {
        Disposition::OpenExisting => OPEN_EXISTING,
        Disposition::OpenAlways => OPEN_ALWAYS,
        Disposition::CreateNew => CREATE_NEW,
        Disposition::CreateAlways => CREATE_ALWAYS,
        Disposition::TruncateExisting => TRUNCATE_EXISTING,
    };
    let attributes = if attributes == 0 {
        FILE_ATTRIBUTE_NORMAL
    } else {
        attributes
    };
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            access,
            share,
            ptr::null(),
            disposition,
            attributes,
            ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { OwnedHandle::from_raw_handle(handle) })
}

pub(crate) fn close_file(file: RawFile) -> io::Result<()> {
    let handle = file.into_raw_handle();
    let res = unsafe { CloseHandle(handle) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn read(file: &RawFile, buf: &mut [u8]) -> io::Result<usize> {
    let mut transferred = 0u32;
    let res = unsafe {
        ReadFile(
            file.as_raw_handle(),
            buf.as_mut_ptr(),
            clamp_len(buf.len()),
            &mut transferred,
            ptr::null_mut(),
        )
    };
    if res == 0 {
        return read_failure(io::Error::last_os_error());
    }
    Ok(transferred as usize)
}

pub(crate) fn write(file: &RawFile, buf: &[u8]) -> io::Result<usize> {
    let mut transferred = 0u32;
    let res = unsafe {
        WriteFile(
            file.as_raw_handle(),
            buf.as_ptr(),
            clamp_len(buf.len()),
            &mut transferred,
            ptr::null_mut(),
        )
    };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(transferred as usize)
}

pub(crate) fn read_at(file: &RawFile, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut overlapped = overlapped_at(offset);
    let mut transferred = 0u32;
    let res = unsafe {
        ReadFile(
            file.as_raw_handle(),
            buf.as_mut_ptr(),
            clamp_len(buf.len()),
            &mut transferred,
            &mut overlapped,
        )
    };
    if res == 0 {
        return read_failure(io::Error::last_os_error());
    }
    Ok(transferred as usize)
}

pub(crate) fn write_at(file: &RawFile, buf: &[u8], offset: u64) -> io::Result<usize> {
    let mut overlapped = overlapped_at(offset);
    let mut transferred = 0u32;
    let res = unsafe {
        WriteFile(
            file.as_raw_handle(),
            buf.as_ptr(),
            clamp_len(buf.len()),
            &mut transferred,
            &mut overlapped,
        )
    };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(transferred as usize)
}

/// Reads that run off the end of the file report end-of-file through the
/// last-error slot; that is exhaustion, not a failure.
fn read_failure(err: io::Error) -> io::Result<usize> {
    if err.raw_os_error() == Some(ERROR_HANDLE_EOF as i32) {
        return Ok(0);
    }
    Err(err)
}

fn overlapped_at(offset: u64) -> OVERLAPPED {
    let mut overlapped: OVERLAPPED = unsafe { mem::zeroed() };
    overlapped.Anonymous.Anonymous.Offset = offset as u32;
    overlapped.Anonymous.Anonymous.OffsetHigh = (offset >> 32) as u32;
    overlapped
}

fn clamp_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// The native seek takes the offset as two 32-bit halves and returns the
/// low half of the new position as an unsigned word. That word collides
/// with the failure sentinel for valid positions ending in `0xffffffff`,
/// so failure is confirmed through the last-error slot, cleared up front.
pub(crate) fn seek(file: &RawFile, pos: SeekFrom) -> io::Result<u64> {
    let (offset, method) = match pos {
        SeekFrom::Start(n) => {
            let n = i64::try_from(n)
                .map_err(|_| io::Error::from_raw_os_error(ERROR_INVALID_PARAMETER as i32))?;
            (n, FILE_BEGIN)
        }
        SeekFrom::Current(n) => (n, FILE_CURRENT),
        SeekFrom::End(n) => (n, FILE_END),
    };
    let (low, high) = split_offset(offset);
    let mut high_out = high;
    let low_out = unsafe {
        SetLastError(ERROR_SUCCESS);
        SetFilePointer(file.as_raw_handle(), low, &mut high_out, method)
    };
    if low_out == INVALID_SET_FILE_POINTER {
        let err = io::Error::last_os_error();
        if err.raw_os_error().unwrap_or(0) != ERROR_SUCCESS as i32 {
            return Err(err);
        }
    }
    Ok(join_offset(high_out, low_out) as u64)
}

pub(crate) fn truncate_at_cursor(file: &RawFile) -> io::Result<()> {
    let res = unsafe { SetEndOfFile(file.as_raw_handle()) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn file_len(file: &RawFile) -> io::Result<u64> {
    let mut size = 0i64;
    let res = unsafe { GetFileSizeEx(file.as_raw_handle(), &mut size) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size as u64)
}

pub(crate) fn sync_all(file: &RawFile) -> io::Result<()> {
    let res = unsafe { FlushFileBuffers(file.as_raw_handle()) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn create_dir(path: &Path) -> io::Result<()> {
    let wide = wide(path)?;
    let res = unsafe { CreateDirectoryW(wide.as_ptr(), ptr::null()) };
    if res == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn path_exists(path: &Path) -> bool {
    let Ok(wide) = wide(path) else {
        return false;
    };
    unsafe { GetFileAttributesW(wide.as_ptr()) != INVALID_FILE_ATTRIBUTES }
}

pub(crate) fn path_attributes(path: &Path) -> io::Result<u32> {
    let wide = wide(path)?;
    let attributes = unsafe { GetFileAttributesW(wide.as_ptr()) };
    if attributes == INVALID_FILE_ATTRIBUTES {
        return Err(io::Error::last_os_error());
    }
    Ok(attributes)
}

pub(crate) fn full_path(path: &Path) -> io::Result<PathBuf> {
    let wide = wide(path)?;
    let len = unsafe { GetFullPathNameW(wide.as_ptr(), 0, ptr::null_mut(), ptr::null_mut()) };
    if len == 0 {
        return Err(io::Error::last_os_error());
    }
    let mut buf = vec![0u16; len as usize];
    let written = unsafe {
        GetFullPathNameW(wide.as_ptr(), len, buf.as_mut_ptr(), ptr::null_mut())
    };
    if written == 0 {
        return Err(io::Error::last_os_error());
    }
    buf.truncate(written as usize);
    Ok(PathBuf::from(OsString::from_wide(&buf)))
}

pub(crate) struct DirStream {
    find: Option<FindHandle>,
    pending: Option<WIN32_FIND_DATAW>,
}

struct FindHandle(HANDLE);

impl Drop for FindHandle {
    fn drop(&mut self) {
        unsafe {
            FindClose(self.0);
        }
    }
}

/// The native scan is primed at open: the first entry arrives with the
/// search handle. A no-match result at this point is an empty scan.
pub(crate) fn open_dir_stream(path: &Path) -> io::Result<DirStream> {
    let pattern = wide(&path.join("*"))?;
    let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
    let handle = unsafe { FindFirstFileW(pattern.as_ptr(), &mut data) };
    if handle == INVALID_HANDLE_VALUE {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ERROR_FILE_NOT_FOUND as i32) {
            return Ok(DirStream {
                find: None,
                pending: None,
            });
        }
        return Err(err);
    }
    Ok(DirStream {
        find: Some(FindHandle(handle)),
        pending: Some(data),
    })
}

impl DirStream {
    pub(crate) fn advance(&mut self) -> io::Result<Option<RawDirEntry>> {
        loop {
            let data = match self.pending.take() {
                Some(data) => data,
                None => {
                    let Some(find) = &self.find else {
                        return Ok(None);
                    };
                    let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
                    let res = unsafe { FindNextFileW(find.0, &mut data) };
                    if res == 0 {
                        let err = io::Error::last_os_error();
                        self.find = None;
                        if err.raw_os_error() == Some(ERROR_NO_MORE_FILES as i32) {
                            return Ok(None);
                        }
                        return Err(err);
                    }
                    data
                }
            };
            let name = find_data_name(&data);
            if name == "." || name == ".." {
                continue;
            }
            return Ok(Some(RawDirEntry {
                name,
                attributes: data.dwFileAttributes,
                len: ((data.nFileSizeHigh as u64) << 32) | data.nFileSizeLow as u64,
                accessed: filetime_nanos(data.ftLastAccessTime),
                created: filetime_nanos(data.ftCreationTime),
                modified: filetime_nanos(data.ftLastWriteTime),
            }));
        }
    }
}

fn find_data_name(data: &WIN32_FIND_DATAW) -> OsString {
    let len = data
        .cFileName
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(data.cFileName.len());
    OsString::from_wide(&data.cFileName[..len])
}

/// Ticks are 100 ns units since 1601-01-01; stamps before the Unix epoch
/// clamp to zero.
fn filetime_nanos(ft: FILETIME) -> u64 {
    const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;
    let ticks = ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64;
    ticks.saturating_sub(UNIX_EPOCH_TICKS).saturating_mul(100)
}
