//! Directory listing: `ls` and `mount`.

use alloc::format;
use alloc::string::String;

use storage::{Dir, DirEntry, FileType, Vfs};

use crate::console::Console;
use crate::error::ShellError;
use crate::path::PathResolver;

/// Printed instead of rows when a directory has no entries.
pub const EMPTY_DIRECTORY: &str = "(empty directory)";

/// Printed when the mount table is empty.
pub const NO_MOUNTS: &str = "No filesystems mounted.";

/// `ls [path]`. Returns the number of entries listed.
///
/// Rows are produced lazily from `readdir`. The directory handle is
/// released whether enumeration ends, fails, or finds nothing.
pub fn ls<V, C>(
    vfs: &V,
    resolver: &PathResolver,
    arg: &str,
    out: &mut C,
) -> Result<usize, ShellError>
where
    V: Vfs + ?Sized,
    C: Console + ?Sized,
{
    let arg = arg.split_whitespace().next().unwrap_or("");
    let path = resolver.resolve(arg);
    let shown = if arg.is_empty() { path.as_str() } else { arg };

    let dir = Dir::open(vfs, &path).map_err(|e| ShellError::from_vfs(shown, e))?;

    let mut count = 0;
    for entry in dir {
        let entry = entry.map_err(|e| {
            log::warn!("[SHELL] ls {}: readdir failed after {} entries: {}", path, count, e);
            ShellError::from_vfs(shown, e)
        })?;
        out.write_line(&format_entry(&entry));
        count += 1;
    }

    if count == 0 {
        out.write_line(EMPTY_DIRECTORY);
    }
    Ok(count)
}

/// One `ls` row. The type tag column is the same width for every kind so
/// names line up; only regular files show a size.
pub fn format_entry(entry: &DirEntry) -> String {
    match entry.file_type {
        FileType::Directory => format!("[DIR] {}", entry.name),
        FileType::Device => format!("[DEV] {}", entry.name),
        FileType::Regular => format!("      {} ({} bytes)", entry.name, entry.size),
    }
}

/// `mount`: print the mount table as `name on mount_point` rows.
pub fn mount<V, C>(vfs: &V, out: &mut C) -> Result<usize, ShellError>
where
    V: Vfs + ?Sized,
    C: Console + ?Sized,
{
    let mounts = vfs.mounts().map_err(|error| ShellError::Vfs {
        path: String::from("mount table"),
        error,
    })?;

    if mounts.is_empty() {
        out.write_line(NO_MOUNTS);
        return Ok(0);
    }
    for m in &mounts {
        out.write_line(&format!("{} on {}", m.name, m.mount_point));
    }
    Ok(mounts.len())
}
