//! Storage client protocol for kosh.
//!
//! The shell never owns a filesystem. It talks to one through the
//! operations in [`vfs::Vfs`] and exchanges a small set of fixed-layout
//! records with it:
//! - [`dirent::DirEntry`] - 72-byte directory entry record
//! - [`stat::StatRecord`] - 8-byte stat record
//! - [`Fd`] - opaque descriptor handle
//!
//! [`mem::MemFs`] is an in-memory implementation of the protocol used by
//! the test suites and the host runner.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod dirent;
pub mod mem;
pub mod stat;
pub mod vfs;

use core::fmt;

pub use dirent::DirEntry;
pub use mem::MemFs;
pub use stat::StatRecord;
pub use vfs::{Dir, DirRead, File, MountInfo, Vfs};

/// VFS error types.
///
/// End of stream is not an error: `read` yields `Ok(0)` and `readdir`
/// yields [`DirRead::End`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsError {
    /// Path does not exist.
    NotFound,
    /// A directory operation was attempted on something else.
    NotADirectory,
    /// A file operation was attempted on a directory.
    IsADirectory,
    /// Target already exists.
    AlreadyExists,
    /// Descriptor is not open.
    InvalidFd,
    /// Descriptor table is full.
    TooManyOpenFiles,
    /// Path is empty or malformed.
    InvalidPath,
    /// Any other failure reported by the filesystem.
    Io,
}

impl VfsError {
    /// Short human-readable description.
    pub fn as_str(&self) -> &'static str {
        match self {
            VfsError::NotFound => "No such file or directory",
            VfsError::NotADirectory => "Not a directory",
            VfsError::IsADirectory => "Is a directory",
            VfsError::AlreadyExists => "File exists",
            VfsError::InvalidFd => "Bad file descriptor",
            VfsError::TooManyOpenFiles => "Too many open files",
            VfsError::InvalidPath => "Invalid path",
            VfsError::Io => "Input/output error",
        }
    }
}

impl fmt::Display for VfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File type as carried in directory and stat records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Device node.
    Device,
}

impl FileType {
    /// Wire encoding of the type byte.
    pub const fn as_byte(self) -> u8 {
        match self {
            FileType::Regular => 0,
            FileType::Directory => 1,
            FileType::Device => 2,
        }
    }

    /// Decode a type byte.
    ///
    /// Unknown values are treated as regular files so a listing never
    /// drops an entry it cannot classify.
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => FileType::Directory,
            2 => FileType::Device,
            _ => FileType::Regular,
        }
    }
}

/// Opaque file descriptor returned by [`Vfs::open`].
///
/// Always non-negative; failures travel through `Result` instead of
/// negative sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fd(pub u32);

impl Fd {
    /// Raw descriptor number.
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags::bitflags! {
    /// Flags for opening files.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open for reading.
        const READ = 0x0001;
        /// Open for writing.
        const WRITE = 0x0002;
        /// Create an empty file if missing; no-op if it exists.
        const CREATE = 0x0004;
        /// Truncate to zero length.
        const TRUNCATE = 0x0008;
        /// Directory open (fail if not a directory).
        const DIRECTORY = 0x0080;
    }
}

impl OpenFlags {
    /// Flags used by `touch`: write-only, create if missing.
    pub const TOUCH: OpenFlags = OpenFlags::WRITE.union(OpenFlags::CREATE);
}
