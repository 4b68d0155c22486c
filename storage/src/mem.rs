//! In-Memory Filesystem
//!
//! Path-keyed tree of directories, regular files and device nodes with a
//! bounded descriptor table. Serves the [`Vfs`] protocol for the test
//! suites and the host runner; a real kernel service sits behind the same
//! trait on target.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use spin::Mutex;

use crate::dirent::{DirEntry, DIRENT_SIZE};
use crate::stat::{StatRecord, STAT_SIZE};
use crate::vfs::{DirRead, MountInfo, Vfs};
use crate::{Fd, FileType, OpenFlags, VfsError};

/// Default size of the descriptor table.
pub const DEFAULT_MAX_FDS: usize = 16;

/// Fd 0/1/2 are reserved for stdin/stdout/stderr.
const FIRST_USER_FD: u32 = 3;

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
    Device,
}

impl Node {
    fn file_type(&self) -> FileType {
        match self {
            Node::Directory => FileType::Directory,
            Node::File(_) => FileType::Regular,
            Node::Device => FileType::Device,
        }
    }

    fn size(&self) -> u32 {
        match self {
            Node::File(data) => u32::try_from(data.len()).unwrap_or(u32::MAX),
            _ => 0,
        }
    }
}

/// An open descriptor: path + cursors.
#[derive(Debug, Clone)]
struct OpenFile {
    path: String,
    flags: OpenFlags,
    offset: usize,
    dir_cursor: usize,
}

struct Inner {
    nodes: BTreeMap<String, Node>,
    fds: HashMap<u32, OpenFile>,
    max_fds: usize,
    mounts: Vec<MountInfo>,
    read_limit: Option<usize>,
    reads_left: Option<usize>,
    readdirs_left: Option<usize>,
}

impl Inner {
    fn children(&self, dir: &str) -> Vec<(&str, &Node)> {
        self.nodes
            .iter()
            .filter(|(path, _)| path.as_str() != "/" && parent_of(path) == dir)
            .map(|(path, node)| (name_of(path), node))
            .collect()
    }

    fn require_parent_dir(&self, path: &str) -> Result<(), VfsError> {
        match self.nodes.get(parent_of(path)) {
            Some(Node::Directory) => Ok(()),
            Some(_) => Err(VfsError::NotADirectory),
            None => Err(VfsError::NotFound),
        }
    }

    /// Lowest descriptor number at or above `FIRST_USER_FD` not in use.
    fn lowest_free_fd(&self) -> Option<u32> {
        (FIRST_USER_FD..=u32::MAX).find(|fd| !self.fds.contains_key(fd))
    }

    fn open_file(&self, fd: Fd) -> Result<&OpenFile, VfsError> {
        self.fds.get(&fd.0).ok_or(VfsError::InvalidFd)
    }
}

/// In-memory [`Vfs`] implementation.
pub struct MemFs {
    inner: Mutex<Inner>,
}

impl fmt::Debug for MemFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemFs")
            .field("nodes", &inner.nodes.len())
            .field("open_fds", &inner.fds.len())
            .field("max_fds", &inner.max_fds)
            .field("mounts", &inner.mounts)
            .finish()
    }
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    /// Empty filesystem containing only `/`.
    pub fn new() -> Self {
        Self::with_max_fds(DEFAULT_MAX_FDS)
    }

    /// Empty filesystem with a descriptor table of `max_fds` slots.
    pub fn with_max_fds(max_fds: usize) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(String::from("/"), Node::Directory);
        MemFs {
            inner: Mutex::new(Inner {
                nodes,
                fds: HashMap::new(),
                max_fds,
                mounts: Vec::new(),
                read_limit: None,
                reads_left: None,
                readdirs_left: None,
            }),
        }
    }

    /// Create a directory and any missing ancestors.
    pub fn add_dir(&self, path: &str) -> Result<(), VfsError> {
        let path = canonical(path)?;
        let mut inner = self.inner.lock();
        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current.push('/');
            current.push_str(component);
            match inner.nodes.get(&current) {
                Some(Node::Directory) => {}
                Some(_) => return Err(VfsError::NotADirectory),
                None => {
                    inner.nodes.insert(current.clone(), Node::Directory);
                }
            }
        }
        Ok(())
    }

    /// Create or replace a regular file, creating missing ancestors.
    pub fn add_file(&self, path: &str, data: &[u8]) -> Result<(), VfsError> {
        self.add_node(path, Node::File(data.to_vec()))
    }

    /// Create a device node, creating missing ancestors.
    pub fn add_device(&self, path: &str) -> Result<(), VfsError> {
        self.add_node(path, Node::Device)
    }

    fn add_node(&self, path: &str, node: Node) -> Result<(), VfsError> {
        let path = canonical(path)?;
        if path == "/" {
            return Err(VfsError::AlreadyExists);
        }
        self.add_dir(parent_of(&path))?;
        let mut inner = self.inner.lock();
        if let Some(Node::Directory) = inner.nodes.get(&path) {
            return Err(VfsError::IsADirectory);
        }
        inner.nodes.insert(path, node);
        Ok(())
    }

    /// Append a row to the mount table.
    pub fn add_mount(&self, name: &str, mount_point: &str) {
        self.inner.lock().mounts.push(MountInfo {
            name: String::from(name),
            mount_point: String::from(mount_point),
        });
    }

    /// Number of descriptors currently open.
    pub fn open_fds(&self) -> usize {
        self.inner.lock().fds.len()
    }

    /// Cap every `read` at `limit` bytes to exercise short reads.
    pub fn set_read_limit(&self, limit: Option<usize>) {
        self.inner.lock().read_limit = limit.map(|l| l.max(1));
    }

    /// Let `count` reads succeed, then fail every later read with `Io`.
    pub fn fail_reads_after(&self, count: Option<usize>) {
        self.inner.lock().reads_left = count;
    }

    /// Let `count` readdir calls succeed, then fail every later one with `Io`.
    pub fn fail_readdir_after(&self, count: Option<usize>) {
        self.inner.lock().readdirs_left = count;
    }

    /// Whether a path exists.
    pub fn exists(&self, path: &str) -> bool {
        match canonical(path) {
            Ok(path) => self.inner.lock().nodes.contains_key(&path),
            Err(_) => false,
        }
    }

    /// Contents of a regular file.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let path = canonical(path).ok()?;
        match self.inner.lock().nodes.get(&path) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }
}

impl Vfs for MemFs {
    fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd, VfsError> {
        let path = canonical(path)?;
        let mut inner = self.inner.lock();

        if inner.fds.len() >= inner.max_fds {
            log::warn!("[VFS] descriptor table full ({} slots)", inner.max_fds);
            return Err(VfsError::TooManyOpenFiles);
        }

        let writing = flags.contains(OpenFlags::WRITE);
        match inner.nodes.get_mut(&path) {
            Some(Node::Directory) if writing => return Err(VfsError::IsADirectory),
            Some(Node::Directory) => {}
            Some(_) if flags.contains(OpenFlags::DIRECTORY) => {
                return Err(VfsError::NotADirectory)
            }
            Some(Node::File(data)) => {
                if writing && flags.contains(OpenFlags::TRUNCATE) {
                    data.clear();
                }
            }
            Some(Node::Device) => {}
            None => {
                if !flags.contains(OpenFlags::CREATE) {
                    return Err(VfsError::NotFound);
                }
                inner.require_parent_dir(&path)?;
                log::debug!("[VFS] create {}", path);
                inner.nodes.insert(path.clone(), Node::File(Vec::new()));
            }
        }

        let fd = inner.lowest_free_fd().ok_or(VfsError::TooManyOpenFiles)?;
        inner.fds.insert(
            fd,
            OpenFile {
                path,
                flags,
                offset: 0,
                dir_cursor: 0,
            },
        );
        Ok(Fd(fd))
    }

    fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, VfsError> {
        let mut inner = self.inner.lock();
        let open = inner.open_file(fd)?.clone();

        if let Some(left) = inner.reads_left {
            if left == 0 {
                return Err(VfsError::Io);
            }
            inner.reads_left = Some(left - 1);
        }

        let limit = inner.read_limit.unwrap_or(usize::MAX);
        let n = match inner.nodes.get(&open.path) {
            Some(Node::File(data)) => {
                let start = open.offset.min(data.len());
                let n = (data.len() - start).min(buf.len()).min(limit);
                buf[..n].copy_from_slice(&data[start..start + n]);
                n
            }
            Some(Node::Device) => 0,
            Some(Node::Directory) => return Err(VfsError::IsADirectory),
            None => return Err(VfsError::NotFound),
        };

        if let Some(entry) = inner.fds.get_mut(&fd.0) {
            entry.offset += n;
        }
        Ok(n)
    }

    fn write(&self, fd: Fd, data: &[u8]) -> Result<usize, VfsError> {
        let mut inner = self.inner.lock();
        let open = inner.open_file(fd)?.clone();
        if !open.flags.contains(OpenFlags::WRITE) {
            return Err(VfsError::InvalidFd);
        }

        match inner.nodes.get_mut(&open.path) {
            Some(Node::File(content)) => {
                let end = open.offset + data.len();
                if content.len() < end {
                    content.resize(end, 0);
                }
                content[open.offset..end].copy_from_slice(data);
            }
            Some(Node::Device) => {}
            Some(Node::Directory) => return Err(VfsError::IsADirectory),
            None => return Err(VfsError::NotFound),
        }

        if let Some(entry) = inner.fds.get_mut(&fd.0) {
            entry.offset += data.len();
        }
        Ok(data.len())
    }

    fn close(&self, fd: Fd) -> Result<(), VfsError> {
        match self.inner.lock().fds.remove(&fd.0) {
            Some(_) => Ok(()),
            None => Err(VfsError::InvalidFd),
        }
    }

    fn stat(&self, path: &str, out: &mut [u8; STAT_SIZE]) -> Result<(), VfsError> {
        let path = canonical(path)?;
        let inner = self.inner.lock();
        let node = inner.nodes.get(&path).ok_or(VfsError::NotFound)?;
        *out = StatRecord {
            size: node.size(),
            file_type: node.file_type(),
        }
        .encode();
        Ok(())
    }

    fn readdir(&self, fd: Fd, out: &mut [u8; DIRENT_SIZE]) -> Result<DirRead, VfsError> {
        let mut inner = self.inner.lock();
        let open = inner.open_file(fd)?.clone();

        if let Some(left) = inner.readdirs_left {
            if left == 0 {
                return Err(VfsError::Io);
            }
            inner.readdirs_left = Some(left - 1);
        }

        match inner.nodes.get(&open.path) {
            Some(Node::Directory) => {}
            Some(_) => return Err(VfsError::NotADirectory),
            None => return Err(VfsError::NotFound),
        }

        let record = inner
            .children(&open.path)
            .get(open.dir_cursor)
            .map(|(name, node)| DirEntry::new(name, node.size(), node.file_type()).encode());

        match record {
            Some(raw) => {
                *out = raw;
                if let Some(entry) = inner.fds.get_mut(&fd.0) {
                    entry.dir_cursor += 1;
                }
                Ok(DirRead::Entry)
            }
            None => Ok(DirRead::End),
        }
    }

    fn copy_file(&self, src: &str, dst: &str) -> Result<(), VfsError> {
        let src = canonical(src)?;
        let dst = canonical(dst)?;
        let mut inner = self.inner.lock();

        let data = match inner.nodes.get(&src) {
            Some(Node::File(data)) => data.clone(),
            Some(Node::Directory) => return Err(VfsError::IsADirectory),
            Some(Node::Device) => Vec::new(),
            None => return Err(VfsError::NotFound),
        };
        if let Some(Node::Directory) = inner.nodes.get(&dst) {
            return Err(VfsError::IsADirectory);
        }
        inner.require_parent_dir(&dst)?;

        log::debug!("[VFS] copy {} -> {} ({} bytes)", src, dst, data.len());
        inner.nodes.insert(dst, Node::File(data));
        Ok(())
    }

    fn mounts(&self) -> Result<Vec<MountInfo>, VfsError> {
        Ok(self.inner.lock().mounts.clone())
    }
}

/// Absolute path with empty components and trailing separators removed.
fn canonical(path: &str) -> Result<String, VfsError> {
    if !path.starts_with('/') {
        return Err(VfsError::InvalidPath);
    }
    let mut out = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        out.push('/');
        out.push_str(component);
    }
    if out.is_empty() {
        out.push('/');
    }
    Ok(out)
}

/// Split "/a/b/c" into "/a/b".
fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

fn name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::stat;

    #[test]
    fn create_flag_is_noop_on_existing_file() {
        let fs = MemFs::new();
        fs.add_file("/f", b"keep").unwrap();
        let fd = fs.open("/f", OpenFlags::TOUCH).unwrap();
        fs.close(fd).unwrap();
        assert_eq!(fs.contents("/f").unwrap(), b"keep");

        let fd = fs.open("/g", OpenFlags::TOUCH).unwrap();
        fs.close(fd).unwrap();
        assert_eq!(fs.contents("/g").unwrap(), b"");
    }

    #[test]
    fn create_requires_parent_directory() {
        let fs = MemFs::new();
        assert_eq!(fs.open("/missing/f", OpenFlags::TOUCH), Err(VfsError::NotFound));
        fs.add_file("/plain", b"").unwrap();
        assert_eq!(
            fs.open("/plain/f", OpenFlags::TOUCH),
            Err(VfsError::NotADirectory)
        );
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn short_reads_and_injected_failures() {
        let fs = MemFs::new();
        fs.add_file("/f", b"0123456789").unwrap();
        fs.set_read_limit(Some(4));
        let fd = fs.open("/f", OpenFlags::READ).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(fs.read(fd, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"0123");
        fs.fail_reads_after(Some(1));
        assert_eq!(fs.read(fd, &mut buf).unwrap(), 4);
        assert_eq!(fs.read(fd, &mut buf), Err(VfsError::Io));
        fs.close(fd).unwrap();
    }

    #[test]
    fn descriptor_table_is_bounded() {
        let fs = MemFs::with_max_fds(2);
        fs.add_file("/f", b"").unwrap();
        let a = fs.open("/f", OpenFlags::READ).unwrap();
        let b = fs.open("/f", OpenFlags::READ).unwrap();
        assert_eq!(fs.open("/f", OpenFlags::READ), Err(VfsError::TooManyOpenFiles));
        fs.close(a).unwrap();
        fs.close(b).unwrap();
        assert_eq!(fs.close(b), Err(VfsError::InvalidFd));
    }

    #[test]
    fn readdir_walks_children_in_order() {
        let fs = MemFs::new();
        fs.add_file("/d/b", b"xx").unwrap();
        fs.add_dir("/d/a").unwrap();
        fs.add_device("/d/c").unwrap();
        fs.add_file("/d/a/nested", b"").unwrap();

        let fd = fs.open("/d", OpenFlags::READ | OpenFlags::DIRECTORY).unwrap();
        let mut raw = [0u8; DIRENT_SIZE];
        let mut names = Vec::new();
        while fs.readdir(fd, &mut raw).unwrap() == DirRead::Entry {
            names.push(DirEntry::decode(&raw));
        }
        fs.close(fd).unwrap();

        let got: Vec<(&str, FileType)> =
            names.iter().map(|e| (e.name.as_str(), e.file_type)).collect();
        assert_eq!(
            got,
            [
                ("a", FileType::Directory),
                ("b", FileType::Regular),
                ("c", FileType::Device)
            ]
        );
        assert_eq!(names[1].size, 2);
    }

    #[test]
    fn copy_file_semantics() {
        let fs = MemFs::new();
        fs.add_file("/src", b"data").unwrap();
        fs.add_dir("/dir").unwrap();
        fs.copy_file("/src", "/dir/src").unwrap();
        assert_eq!(fs.contents("/dir/src").unwrap(), b"data");
        assert_eq!(fs.copy_file("/src", "/dir"), Err(VfsError::IsADirectory));
        assert_eq!(fs.copy_file("/src", "/nowhere/x"), Err(VfsError::NotFound));
        assert_eq!(fs.copy_file("/ghost", "/x"), Err(VfsError::NotFound));
    }

    #[test]
    fn write_then_read_back() {
        let fs = MemFs::new();
        let fd = fs.open("/log", OpenFlags::TOUCH).unwrap();
        assert_eq!(fs.write(fd, b"hello"), Ok(5));
        assert_eq!(fs.write(fd, b" world"), Ok(6));
        fs.close(fd).unwrap();
        assert_eq!(fs.contents("/log").unwrap(), b"hello world");

        let fd = fs.open("/log", OpenFlags::READ).unwrap();
        assert_eq!(fs.write(fd, b"x"), Err(VfsError::InvalidFd));
        let mut buf = [0u8; 32];
        assert_eq!(fs.read(fd, &mut buf), Ok(11));
        assert_eq!(&buf[..11], b"hello world");
        fs.close(fd).unwrap();

        let fd = fs.open("/log", OpenFlags::WRITE | OpenFlags::TRUNCATE).unwrap();
        assert_eq!(fs.write(fd, b"hi"), Ok(2));
        fs.close(fd).unwrap();
        assert_eq!(fs.contents("/log").unwrap(), b"hi");
    }

    #[test]
    fn descriptors_reuse_lowest_free_slot() {
        let fs = MemFs::new();
        fs.add_file("/f", b"").unwrap();
        let a = fs.open("/f", OpenFlags::READ).unwrap();
        let b = fs.open("/f", OpenFlags::READ).unwrap();
        let c = fs.open("/f", OpenFlags::READ).unwrap();
        assert_eq!((a, b, c), (Fd(3), Fd(4), Fd(5)));
        fs.close(b).unwrap();
        assert_eq!(fs.open("/f", OpenFlags::READ), Ok(Fd(4)));
        fs.close(a).unwrap();
        assert_eq!(fs.open("/f", OpenFlags::READ), Ok(Fd(3)));

        for _ in 0..1000 {
            let fd = fs.open("/f", OpenFlags::READ).unwrap();
            assert_eq!(fd, Fd(6));
            fs.close(fd).unwrap();
        }
    }

    #[test]
    fn injected_readdir_failure() {
        let fs = MemFs::new();
        fs.add_file("/d/a", b"").unwrap();
        fs.add_file("/d/b", b"").unwrap();
        fs.fail_readdir_after(Some(1));
        let fd = fs.open("/d", OpenFlags::READ | OpenFlags::DIRECTORY).unwrap();
        let mut raw = [0u8; DIRENT_SIZE];
        assert_eq!(fs.readdir(fd, &mut raw), Ok(DirRead::Entry));
        assert_eq!(fs.readdir(fd, &mut raw), Err(VfsError::Io));
        fs.close(fd).unwrap();
    }

    #[test]
    fn paths_are_canonicalised() {
        let fs = MemFs::new();
        fs.add_dir("/a//b/").unwrap();
        assert!(stat(&fs, "/a/b").unwrap().is_dir());
        assert!(fs.exists("/a/b/"));
        assert_eq!(stat(&fs, "relative"), Err(VfsError::InvalidPath));
    }

    #[test]
    fn debug_summarises_state() {
        let fs = MemFs::with_max_fds(4);
        fs.add_file("/a", b"x").unwrap();
        let fd = fs.open("/a", OpenFlags::READ).unwrap();
        let shown = format!("{:?}", fs);
        assert!(shown.contains("open_fds: 1"));
        assert!(shown.contains("max_fds: 4"));
        fs.close(fd).unwrap();
    }
}
