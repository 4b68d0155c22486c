//! `cp` and `touch`.
//!
//! Neither command moves bytes itself. `cp` delegates the whole copy to
//! the filesystem's `copy_file`; `touch` is an open with `CREATE` followed
//! by a close.

use alloc::string::String;

use storage::vfs::stat;
use storage::{File, OpenFlags, Vfs};

use crate::error::ShellError;
use crate::path::{basename, join, PathResolver};

/// `cp <src> <dst>`. Returns the effective destination path.
///
/// When `dst` names an existing directory the copy lands inside it under
/// the source's basename. Whether the destination's parent exists is left
/// to the filesystem.
pub fn cp<V: Vfs + ?Sized>(
    vfs: &V,
    resolver: &PathResolver,
    arg: &str,
) -> Result<String, ShellError> {
    let mut tokens = arg.split_whitespace();
    let (src, dst) = match (tokens.next(), tokens.next()) {
        (Some(src), Some(dst)) => (src, dst),
        _ => return Err(ShellError::Usage("cp <src> <dst>")),
    };

    let src_path = resolver.resolve(src);
    let dst_path = resolver.resolve(dst);
    let target = effective_destination(vfs, resolver, &src_path, dst_path);

    vfs.copy_file(&src_path, &target).map_err(|e| {
        log::debug!("[SHELL] copy {} -> {} failed: {}", src_path, target, e);
        ShellError::CopyFailed {
            src: String::from(src),
            dst: String::from(dst),
        }
    })?;
    Ok(target)
}

/// Rewrite `dst` to `dst/basename(src)` when `dst` is a directory.
///
/// The joined path is held to the same length cap as resolved paths.
pub fn effective_destination<V: Vfs + ?Sized>(
    vfs: &V,
    resolver: &PathResolver,
    src: &str,
    dst: String,
) -> String {
    match stat(vfs, &dst) {
        Ok(record) if record.is_dir() => resolver.bound(join(&dst, basename(src))),
        _ => dst,
    }
}

/// `touch <file>...`. Returns how many files were touched.
///
/// Every operand is attempted. A lone failing operand reports its own
/// error; with several operands the failures collapse into one
/// [`ShellError::PartialFailure`].
pub fn touch<V: Vfs + ?Sized>(
    vfs: &V,
    resolver: &PathResolver,
    arg: &str,
) -> Result<usize, ShellError> {
    let requested = arg.split_whitespace().count();
    if requested == 0 {
        return Err(ShellError::Usage("touch <file>..."));
    }

    let mut failed = 0;
    let mut last_error = None;
    for name in arg.split_whitespace() {
        let path = resolver.resolve(name);
        let result = File::open(vfs, &path, OpenFlags::TOUCH).and_then(File::close);
        if let Err(e) = result {
            log::warn!("[SHELL] touch {}: {}", path, e);
            failed += 1;
            last_error = Some(ShellError::from_vfs(name, e));
        }
    }

    match (failed, last_error) {
        (0, _) | (_, None) => Ok(requested),
        (_, Some(err)) if requested == 1 => Err(err),
        (failed, Some(_)) => Err(ShellError::PartialFailure { failed, requested }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{MemFs, VfsError};

    fn setup() -> (MemFs, PathResolver) {
        let fs = MemFs::new();
        fs.add_file("/home/a.txt", b"alpha").unwrap();
        fs.add_dir("/backup").unwrap();
        (fs, PathResolver::new("/home", 255))
    }

    #[test]
    fn copy_into_directory_uses_basename() {
        let (fs, r) = setup();
        assert_eq!(cp(&fs, &r, "a.txt /backup").unwrap(), "/backup/a.txt");
        assert_eq!(fs.contents("/backup/a.txt").unwrap(), b"alpha");
    }

    #[test]
    fn copy_to_directory_with_trailing_separator() {
        let (fs, r) = setup();
        assert_eq!(cp(&fs, &r, "/home/a.txt /backup/").unwrap(), "/backup/a.txt");
    }

    #[test]
    fn copy_to_plain_path() {
        let (fs, r) = setup();
        assert_eq!(cp(&fs, &r, "a.txt b.txt").unwrap(), "/home/b.txt");
        assert_eq!(fs.contents("/home/b.txt").unwrap(), b"alpha");
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn joined_destination_respects_path_cap() {
        let fs = MemFs::new();
        let dir = format!("/{}", "d".repeat(250));
        fs.add_dir(&dir).unwrap();
        fs.add_file("/longname_file.txt", b"x").unwrap();
        let r = PathResolver::new("/", 255);

        let target = effective_destination(&fs, &r, "/longname_file.txt", dir.clone());
        assert_eq!(target.len(), 255);
        assert!(target.starts_with(&format!("{}/", dir)));
        assert_eq!(target, effective_destination(&fs, &r, "/longname_file.txt", dir));
    }

    #[test]
    fn copy_failure_names_original_arguments() {
        let (fs, r) = setup();
        assert_eq!(
            cp(&fs, &r, "a.txt /missing/dir/x"),
            Err(ShellError::CopyFailed { src: "a.txt".into(), dst: "/missing/dir/x".into() })
        );
        assert_eq!(
            cp(&fs, &r, "ghost /backup"),
            Err(ShellError::CopyFailed { src: "ghost".into(), dst: "/backup".into() })
        );
    }

    #[test]
    fn copy_usage() {
        let (fs, r) = setup();
        assert_eq!(cp(&fs, &r, ""), Err(ShellError::Usage("cp <src> <dst>")));
        assert_eq!(cp(&fs, &r, "a.txt"), Err(ShellError::Usage("cp <src> <dst>")));
    }

    #[test]
    fn touch_creates_and_keeps_existing() {
        let (fs, r) = setup();
        assert_eq!(touch(&fs, &r, "new.txt a.txt"), Ok(2));
        assert_eq!(fs.contents("/home/new.txt").unwrap(), b"");
        assert_eq!(fs.contents("/home/a.txt").unwrap(), b"alpha");
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn touch_aggregates_failures() {
        let (fs, r) = setup();
        assert_eq!(
            touch(&fs, &r, "one /nowhere/two three"),
            Err(ShellError::PartialFailure { failed: 1, requested: 3 })
        );
        assert!(fs.exists("/home/one"));
        assert!(fs.exists("/home/three"));
        assert_eq!(fs.open_fds(), 0);
    }

    #[test]
    fn touch_single_failure_is_specific() {
        let (fs, r) = setup();
        assert_eq!(
            touch(&fs, &r, "/nowhere/x"),
            Err(ShellError::NotFound { path: "/nowhere/x".into() })
        );
        assert_eq!(
            touch(&fs, &r, "/backup"),
            Err(ShellError::Vfs { path: "/backup".into(), error: VfsError::IsADirectory })
        );
    }

    #[test]
    fn touch_usage() {
        let (fs, r) = setup();
        assert_eq!(touch(&fs, &r, "  "), Err(ShellError::Usage("touch <file>...")));
    }
}
