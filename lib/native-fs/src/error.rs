//! Error taxonomy and native error-code translation.
//!
//! Every fallible operation returns [`FsError`], which pairs a portable
//! [`FsErrorKind`] with the operation context tag and, when the failure came
//! from the OS, the raw native code. The `check_*` helpers translate a
//! just-captured native code into a result, optionally treating a
//! caller-supplied set of codes as success.

use std::fmt;
use std::io;

use crate::platform;

/// Raw error code in the platform's native space: `errno` values on Unix,
/// `GetLastError` values on Windows.
pub type RawOsCode = i32;

pub type FsResult<T> = Result<T, FsError>;

/// Portable classification of a native failure.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsErrorKind {
    /// The path, or a directory component of it, does not exist.
    #[error("entity not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("permission denied")]
    PermissionDenied,
    /// A read reached the end of the file. Reads at the public surface
    /// report this as a zero-length result, not an error.
    #[error("end of file")]
    EndOfFile,
    /// A directory scan ran out of entries. The iterator surfaces this as
    /// exhaustion, not an error.
    #[error("no more directory entries")]
    NoMoreEntries,
    #[error("invalid input")]
    InvalidInput,
    /// Any native failure outside the mapped set; the raw code is preserved.
    #[error("unclassified os error")]
    Os,
}

/// A failed file-system operation.
#[derive(Debug)]
pub struct FsError {
    kind: FsErrorKind,
    context: &'static str,
    code: Option<RawOsCode>,
}

impl FsError {
    pub(crate) fn new(kind: FsErrorKind, context: &'static str) -> Self {
        Self {
            kind,
            context,
            code: None,
        }
    }

    /// Classify a captured `io::Error`, keeping its raw code when present.
    pub(crate) fn from_os(context: &'static str, err: &io::Error) -> Self {
        Self {
            kind: kind_for(err),
            context,
            code: err.raw_os_error(),
        }
    }

    pub(crate) fn from_raw_code(context: &'static str, code: RawOsCode) -> Self {
        Self {
            kind: platform::error_kind(code),
            context,
            code: Some(code),
        }
    }

    #[inline]
    pub fn kind(&self) -> FsErrorKind {
        self.kind
    }

    /// Tag naming the operation that failed, e.g. `fs.open` or `dir.advance`.
    #[inline]
    pub fn context(&self) -> &'static str {
        self.context
    }

    /// The native error code, when the failure came from the OS.
    #[inline]
    pub fn raw_os_code(&self) -> Option<RawOsCode> {
        self.code
    }

    /// OS-provided description of the raw code, when one is attached.
    pub fn os_description(&self) -> Option<String> {
        self.code.map(|code| io::Error::from_raw_os_error(code).to_string())
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.kind)?;
        if let Some(code) = self.code {
            write!(f, " ({})", io::Error::from_raw_os_error(code))?;
        }
        Ok(())
    }
}

impl std::error::Error for FsError {}

fn kind_for(err: &io::Error) -> FsErrorKind {
    match err.raw_os_error() {
        Some(code) => platform::error_kind(code),
        None => match err.kind() {
            io::ErrorKind::NotFound => FsErrorKind::NotFound,
            io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
            io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            io::ErrorKind::InvalidInput => FsErrorKind::InvalidInput,
            io::ErrorKind::UnexpectedEof => FsErrorKind::EndOfFile,
            _ => FsErrorKind::Os,
        },
    }
}

/// Translate a native code captured by the caller into a result.
///
/// The code is an error only if it is neither the platform's success code
/// nor a member of `accepted`. An empty `accepted` slice means only success
/// passes.
pub fn check_os_code(
    code: RawOsCode,
    accepted: &[RawOsCode],
    context: &'static str,
) -> FsResult<()> {
    if code == platform::codes::SUCCESS || accepted.contains(&code) {
        Ok(())
    } else {
        Err(FsError::from_raw_code(context, code))
    }
}

/// Check the calling thread's last native error slot, accepting only success.
///
/// Meaningful only immediately after a native call that reports failure
/// through the last-error slot; the slot is not cleared by successful calls.
pub fn check_last_os(context: &'static str) -> FsResult<()> {
    check_last_os_accepting(context, &[])
}

/// Like [`check_last_os`] but treating the codes in `accepted` as success.
pub fn check_last_os_accepting(context: &'static str, accepted: &[RawOsCode]) -> FsResult<()> {
    let code = io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(platform::codes::SUCCESS);
    check_os_code(code, accepted, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::codes;

    #[test]
    fn success_code_passes_with_empty_accept_set() {
        assert!(check_os_code(codes::SUCCESS, &[], "test.op").is_ok());
    }

    #[test]
    fn accepted_code_passes() {
        assert!(check_os_code(codes::ALREADY_EXISTS, &[codes::ALREADY_EXISTS], "test.op").is_ok());
    }

    #[test]
    fn unaccepted_code_fails_with_that_code() {
        let err = check_os_code(codes::NOT_FOUND, &[codes::ALREADY_EXISTS], "test.op")
            .expect_err("code outside the accept set must fail");
        assert_eq!(err.kind(), FsErrorKind::NotFound);
        assert_eq!(err.raw_os_code(), Some(codes::NOT_FOUND));
        assert_eq!(err.context(), "test.op");
    }

    #[test]
    fn empty_accept_set_rejects_every_failure_code() {
        for code in [codes::NOT_FOUND, codes::ALREADY_EXISTS, codes::ACCESS_DENIED] {
            assert!(check_os_code(code, &[], "test.op").is_err());
        }
    }

    #[cfg(unix)]
    #[test]
    fn native_codes_classify() {
        let cases = [
            (libc::ENOENT, FsErrorKind::NotFound),
            (libc::ENOTDIR, FsErrorKind::NotFound),
            (libc::EEXIST, FsErrorKind::AlreadyExists),
            (libc::EACCES, FsErrorKind::PermissionDenied),
            (libc::EINVAL, FsErrorKind::InvalidInput),
            (libc::EDQUOT, FsErrorKind::Os),
        ];
        for (code, kind) in cases {
            let err = FsError::from_raw_code("test.op", code);
            assert_eq!(err.kind(), kind, "code {code}");
        }
    }

    #[test]
    fn codeless_errors_classify_by_io_kind() {
        let err = FsError::from_os(
            "test.op",
            &std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains NUL"),
        );
        assert_eq!(err.kind(), FsErrorKind::InvalidInput);
        assert_eq!(err.raw_os_code(), None);
        assert!(err.os_description().is_none());
    }

    #[test]
    fn display_carries_context_and_code() {
        let err = FsError::from_raw_code("fs.open", codes::NOT_FOUND);
        let text = err.to_string();
        assert!(text.starts_with("fs.open: entity not found"), "{text}");
        assert!(err.os_description().is_some());
    }
}
