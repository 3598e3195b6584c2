//! Open-call vocabulary: sharing, creation disposition, attribute bits.

use bitflags::bitflags;

bitflags! {
    /// Sharing mode requested when opening a file.
    ///
    /// Carries the platform's native share bits. The Windows backend passes
    /// them straight to the open call; POSIX has no mandatory share modes,
    /// so the Unix backend accepts and ignores them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ShareMode: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const DELETE = 0x4;
    }
}

/// What the open call does when the target path does or does not exist.
///
/// This is the standard creation-disposition vocabulary: `CreateNew` fails
/// on an existing file, `CreateAlways` truncates or creates,
/// `TruncateExisting` requires the file to exist already.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposition {
    /// Open only if the path exists.
    #[default]
    OpenExisting,
    /// Open if the path exists, create it otherwise.
    OpenAlways,
    /// Create; fail with already-exists if the path is taken.
    CreateNew,
    /// Create, replacing (truncating) any existing file.
    CreateAlways,
    /// Open an existing file and truncate it to zero length.
    TruncateExisting,
}

impl Disposition {
    /// Dispositions that truncate or replace require write access.
    pub(crate) fn requires_write(self) -> bool {
        matches!(self, Disposition::CreateAlways | Disposition::TruncateExisting)
    }
}

/// The platform's native attribute word for a file-system entry.
///
/// On Windows this is `dwFileAttributes`; on Unix it is `st_mode`. The bits
/// are passed through untouched so callers that persist or replay them keep
/// the native semantics; the accessors answer the portable questions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct FileAttributes(u32);

impl FileAttributes {
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw native attribute bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn is_directory(self) -> bool {
        #[cfg(unix)]
        {
            self.0 & libc::S_IFMT as u32 == libc::S_IFDIR as u32
        }
        #[cfg(windows)]
        {
            self.0 & windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_DIRECTORY != 0
        }
    }

    pub fn is_regular_file(self) -> bool {
        #[cfg(unix)]
        {
            self.0 & libc::S_IFMT as u32 == libc::S_IFREG as u32
        }
        #[cfg(windows)]
        {
            use windows_sys::Win32::Storage::FileSystem::{
                FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT,
            };
            self.0 & (FILE_ATTRIBUTE_DIRECTORY | FILE_ATTRIBUTE_REPARSE_POINT) == 0
        }
    }

    /// Symbolic link on Unix, reparse point on Windows.
    pub fn is_symlink(self) -> bool {
        #[cfg(unix)]
        {
            self.0 & libc::S_IFMT as u32 == libc::S_IFLNK as u32
        }
        #[cfg(windows)]
        {
            self.0 & windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_REPARSE_POINT != 0
        }
    }

    pub fn is_read_only(self) -> bool {
        #[cfg(unix)]
        {
            self.0 & 0o222 == 0
        }
        #[cfg(windows)]
        {
            self.0 & windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_READONLY != 0
        }
    }

    /// Hidden attribute bit. Always `false` on Unix, where hiding is a
    /// naming convention rather than an attribute.
    pub fn is_hidden(self) -> bool {
        #[cfg(unix)]
        {
            false
        }
        #[cfg(windows)]
        {
            self.0 & windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_HIDDEN != 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_mode_bits_are_native() {
        assert_eq!(ShareMode::READ.bits(), 0x1);
        assert_eq!(ShareMode::WRITE.bits(), 0x2);
        assert_eq!(ShareMode::DELETE.bits(), 0x4);
        assert!(ShareMode::default().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn attributes_classify_mode_bits() {
        let dir = FileAttributes::from_bits(libc::S_IFDIR as u32 | 0o755);
        assert!(dir.is_directory());
        assert!(!dir.is_regular_file());
        assert!(!dir.is_symlink());

        let file = FileAttributes::from_bits(libc::S_IFREG as u32 | 0o644);
        assert!(file.is_regular_file());
        assert!(!file.is_directory());
        assert!(!file.is_read_only());

        let locked = FileAttributes::from_bits(libc::S_IFREG as u32 | 0o444);
        assert!(locked.is_read_only());

        let link = FileAttributes::from_bits(libc::S_IFLNK as u32 | 0o777);
        assert!(link.is_symlink());
        assert!(!link.is_hidden());
    }

    #[cfg(windows)]
    #[test]
    fn attributes_classify_native_bits() {
        use windows_sys::Win32::Storage::FileSystem::{
            FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL,
            FILE_ATTRIBUTE_READONLY,
        };

        let dir = FileAttributes::from_bits(FILE_ATTRIBUTE_DIRECTORY);
        assert!(dir.is_directory());
        assert!(!dir.is_regular_file());

        let file = FileAttributes::from_bits(FILE_ATTRIBUTE_NORMAL);
        assert!(file.is_regular_file());

        let hidden = FileAttributes::from_bits(FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_READONLY);
        assert!(hidden.is_hidden());
        assert!(hidden.is_read_only());
    }

    #[test]
    fn disposition_write_requirements() {
        assert!(Disposition::CreateAlways.requires_write());
        assert!(Disposition::TruncateExisting.requires_write());
        assert!(!Disposition::OpenExisting.requires_write());
        assert!(!Disposition::OpenAlways.requires_write());
        assert!(!Disposition::CreateNew.requires_write());
    }
}
