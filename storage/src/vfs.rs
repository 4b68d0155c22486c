//! Virtual Filesystem (VFS) client layer.
//!
//! [`Vfs`] is the operation set the shell consumes from the external
//! filesystem service. [`File`] and [`Dir`] wrap a descriptor and close
//! it when dropped, so every exit path of a command releases its handle.

use alloc::string::String;
use alloc::vec::Vec;

use crate::dirent::{DirEntry, DIRENT_SIZE};
use crate::stat::{StatRecord, STAT_SIZE};
use crate::{Fd, OpenFlags, VfsError};

/// Outcome of one `readdir` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirRead {
    /// A record was written into the caller's buffer.
    Entry,
    /// The directory cursor is exhausted.
    End,
}

/// Mount table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Filesystem name.
    pub name: String,
    /// Mount point path.
    pub mount_point: String,
}

/// Filesystem client operations.
///
/// Every call is synchronous. Implementations keep the readdir cursor per
/// descriptor; callers never see it.
pub trait Vfs {
    /// Open a path. `CREATE` makes an empty file if missing and is a no-op
    /// if it exists.
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd, VfsError>;

    /// Read up to `buf.len()` bytes. `Ok(0)` is end of stream. Short reads
    /// are legal.
    fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, VfsError>;

    /// Write bytes at the descriptor's cursor.
    fn write(&self, fd: Fd, data: &[u8]) -> Result<usize, VfsError>;

    /// Release a descriptor.
    fn close(&self, fd: Fd) -> Result<(), VfsError>;

    /// Fill `out` with the encoded stat record of `path`.
    fn stat(&self, path: &str, out: &mut [u8; STAT_SIZE]) -> Result<(), VfsError>;

    /// Fill `out` with the next encoded directory record and advance.
    fn readdir(&self, fd: Fd, out: &mut [u8; DIRENT_SIZE]) -> Result<DirRead, VfsError>;

    /// Copy a whole file. The client never copies byte-by-byte itself.
    fn copy_file(&self, src: &str, dst: &str) -> Result<(), VfsError>;

    /// Current mount table.
    fn mounts(&self) -> Result<Vec<MountInfo>, VfsError>;
}

impl<T: Vfs + ?Sized> Vfs for &T {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd, VfsError> {
        (**self).open(path, flags)
    }
    fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, VfsError> {
        (**self).read(fd, buf)
    }
    fn write(&self, fd: Fd, data: &[u8]) -> Result<usize, VfsError> {
        (**self).write(fd, data)
    }
    fn close(&self, fd: Fd) -> Result<(), VfsError> {
        (**self).close(fd)
    }
    fn stat(&self, path: &str, out: &mut [u8; STAT_SIZE]) -> Result<(), VfsError> {
        (**self).stat(path, out)
    }
    fn readdir(&self, fd: Fd, out: &mut [u8; DIRENT_SIZE]) -> Result<DirRead, VfsError> {
        (**self).readdir(fd, out)
    }
    fn copy_file(&self, src: &str, dst: &str) -> Result<(), VfsError> {
        (**self).copy_file(src, dst)
    }
    fn mounts(&self) -> Result<Vec<MountInfo>, VfsError> {
        (**self).mounts()
    }
}

/// Stat a path and decode the record.
pub fn stat<V: Vfs + ?Sized>(vfs: &V, path: &str) -> Result<StatRecord, VfsError> {
    let mut raw = [0u8; STAT_SIZE];
    vfs.stat(path, &mut raw)?;
    Ok(StatRecord::decode(&raw))
}

/// Open file handle. Closed on drop.
pub struct File<'a, V: Vfs + ?Sized> {
    vfs: &'a V,
    fd: Fd,
    closed: bool,
}

impl<'a, V: Vfs + ?Sized> File<'a, V> {
    pub fn open(vfs: &'a V, path: &str, flags: OpenFlags) -> Result<Self, VfsError> {
        let fd = vfs.open(path, flags)?;
        log::trace!("[VFS] open {} -> fd {}", path, fd);
        Ok(File {
            vfs,
            fd,
            closed: false,
        })
    }

    pub fn fd(&self) -> Fd {
        self.fd
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, VfsError> {
        self.vfs.read(self.fd, buf)
    }

    pub fn write(&mut self, data: &[u8]) -> Result<usize, VfsError> {
        self.vfs.write(self.fd, data)
    }

    /// Close now and observe the result. Dropping closes silently.
    pub fn close(mut self) -> Result<(), VfsError> {
        self.closed = true;
        self.vfs.close(self.fd)
    }
}

impl<V: Vfs + ?Sized> Drop for File<'_, V> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.vfs.close(self.fd) {
            log::warn!("[VFS] close fd {} failed: {}", self.fd, e);
        }
    }
}

/// Open directory stream.
///
/// Yields decoded entries lazily, one `readdir` call per item. The stream
/// is finite and fused: after the end or an error it yields nothing more.
pub struct Dir<'a, V: Vfs + ?Sized> {
    file: File<'a, V>,
    done: bool,
}

impl<'a, V: Vfs + ?Sized> Dir<'a, V> {
    pub fn open(vfs: &'a V, path: &str) -> Result<Self, VfsError> {
        let file = File::open(vfs, path, OpenFlags::READ | OpenFlags::DIRECTORY)?;
        Ok(Dir { file, done: false })
    }

    /// Fetch the next entry, `Ok(None)` at the end.
    pub fn next_entry(&mut self) -> Result<Option<DirEntry>, VfsError> {
        if self.done {
            return Ok(None);
        }
        let mut raw = [0u8; DIRENT_SIZE];
        match self.file.vfs.readdir(self.file.fd, &mut raw) {
            Ok(DirRead::Entry) => Ok(Some(DirEntry::decode(&raw))),
            Ok(DirRead::End) => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }

    pub fn close(self) -> Result<(), VfsError> {
        self.file.close()
    }
}

impl<V: Vfs + ?Sized> Iterator for Dir<'_, V> {
    type Item = Result<DirEntry, VfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
