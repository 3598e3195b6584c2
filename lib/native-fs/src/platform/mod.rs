//! Per-OS syscall backends.
//!
//! Each backend exposes the same function surface over raw owned
//! descriptors and reports failures as `io::Error` with the native code
//! attached; classification into [`crate::FsErrorKind`] happens once, at the
//! crate boundary.

use std::ffi::OsString;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::*;
#[cfg(unix)]
pub use unix::codes;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::*;
#[cfg(windows)]
pub use windows::codes;

/// Snapshot of one directory entry as reported by the native scan.
#[derive(Debug)]
pub(crate) struct RawDirEntry {
    pub name: OsString,
    pub attributes: u32,
    pub len: u64,
    /// Timestamps in nanoseconds since the Unix epoch, zero if unavailable.
    pub accessed: u64,
    pub created: u64,
    pub modified: u64,
}

/// Clamp a seconds/nanoseconds pair to nanoseconds since the Unix epoch.
#[cfg(unix)]
pub(crate) fn unix_nanos(secs: i64, nanos: i64) -> u64 {
    if secs < 0 {
        return 0;
    }
    (secs as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(nanos as u64)
}

/// Split a 64-bit seek offset into the low/high 32-bit halves the native
/// seek call takes. The low half is reinterpreted, not clamped, so negative
/// offsets survive the round trip.
#[cfg(any(windows, test))]
pub(crate) fn split_offset(offset: i64) -> (i32, i32) {
    (offset as i32, (offset >> 32) as i32)
}

/// Reassemble the halves the native seek call returns. The low half comes
/// back as an unsigned word and must be zero-extended.
#[cfg(any(windows, test))]
pub(crate) fn join_offset(high: i32, low: u32) -> i64 {
    ((high as i64) << 32) | low as i64
}
