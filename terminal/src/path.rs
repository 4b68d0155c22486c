//! Path resolution.
//!
//! Turns a user-typed argument into an absolute, normalised path. The
//! working directory is explicit state of the resolver, so resolution is
//! pure and never touches the filesystem.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::{DEFAULT_CWD, MAX_PATH_LEN};

/// Path separator.
pub const SEPARATOR: char = '/';

/// Resolves arguments against a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    cwd: String,
    max_len: usize,
}

impl Default for PathResolver {
    fn default() -> Self {
        PathResolver::new(DEFAULT_CWD, MAX_PATH_LEN)
    }
}

impl PathResolver {
    /// Resolver rooted at `cwd`, producing paths of at most `max_len`
    /// bytes. A relative `cwd` is taken relative to `/`.
    pub fn new(cwd: &str, max_len: usize) -> Self {
        let max_len = max_len.max(1);
        let cwd = truncate(normalise(&absolute(cwd)), max_len);
        PathResolver { cwd, max_len }
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Replace the working directory with an already resolved path.
    pub fn set_cwd(&mut self, path: &str) {
        self.cwd = truncate(normalise(&absolute(path)), self.max_len);
    }

    /// Apply the length cap to a path built outside [`resolve`](Self::resolve).
    pub fn bound(&self, path: String) -> String {
        truncate(path, self.max_len)
    }

    /// Resolve `arg`. Total: never fails.
    ///
    /// - empty: the working directory
    /// - leading `/`: absolute, normalised
    /// - otherwise: joined onto the working directory, normalised
    ///
    /// Results longer than the cap keep their leading bytes.
    pub fn resolve(&self, arg: &str) -> String {
        let full = if arg.is_empty() {
            self.cwd.clone()
        } else if arg.starts_with(SEPARATOR) {
            String::from(arg)
        } else {
            join(&self.cwd, arg)
        };
        truncate(normalise(&full), self.max_len)
    }
}

/// Normalise a path: collapse `/./`, `/../`, `//`.
///
/// `..` at the root stays at the root.
pub fn normalise(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split(SEPARATOR) {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            c => parts.push(c),
        }
    }
    if parts.is_empty() {
        return String::from("/");
    }
    let mut result = String::new();
    for p in &parts {
        result.push(SEPARATOR);
        result.push_str(p);
    }
    result
}

/// Substring after the last separator, or the whole string.
pub fn basename(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join a directory and a name with exactly one separator between them.
pub fn join(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);
    let mut out = String::with_capacity(dir.len() + name.len() + 1);
    out.push_str(dir);
    if !dir.ends_with(SEPARATOR) {
        out.push(SEPARATOR);
    }
    out.push_str(name);
    out
}

fn absolute(path: &str) -> String {
    if path.starts_with(SEPARATOR) {
        String::from(path)
    } else {
        join("/", path)
    }
}

/// Keep the first `max` bytes, backing off to a character boundary.
fn truncate(mut path: String, max: usize) -> String {
    if path.len() > max {
        let mut end = max;
        while !path.is_char_boundary(end) {
            end -= 1;
        }
        log::debug!("[SHELL] path truncated to {} bytes", end);
        path.truncate(end);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(cwd: &str) -> PathResolver {
        PathResolver::new(cwd, MAX_PATH_LEN)
    }

    #[test]
    fn empty_argument_is_cwd() {
        assert_eq!(resolver("/home/user").resolve(""), "/home/user");
    }

    #[test]
    fn absolute_and_relative() {
        let r = resolver("/home/user");
        assert_eq!(r.resolve("/etc/motd"), "/etc/motd");
        assert_eq!(r.resolve("notes.txt"), "/home/user/notes.txt");
        assert_eq!(r.resolve("../other/./x"), "/home/other/x");
        assert_eq!(r.resolve("//etc//"), "/etc");
    }

    #[test]
    fn dotdot_stops_at_root() {
        assert_eq!(resolver("/").resolve("../../.."), "/");
        assert_eq!(normalise("/a/../../b"), "/b");
    }

    #[test]
    fn truncation_is_deterministic() {
        let r = PathResolver::new("/", 8);
        assert_eq!(r.resolve("/abcdefghijkl"), "/abcdefg");
        assert_eq!(r.resolve("/abcdefghijkl"), r.resolve("/abcdefghijkl"));

        let long = "a".repeat(400);
        let out = resolver("/").resolve(&long);
        assert_eq!(out.len(), MAX_PATH_LEN);
        assert!(out.starts_with("/aaa"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let r = PathResolver::new("/", 4);
        // "/é" is 3 bytes, "/éé" is 5
        assert_eq!(r.resolve("/éé"), "/é");
    }

    #[test]
    fn bound_applies_the_same_cap() {
        let r = PathResolver::new("/", 8);
        assert_eq!(r.bound(String::from("/abcdefghijkl")), r.resolve("/abcdefghijkl"));
        assert_eq!(r.bound(String::from("/ab")), "/ab");
    }

    #[test]
    fn basename_cases() {
        assert_eq!(basename("/a/b/file.txt"), "file.txt");
        assert_eq!(basename("file.txt"), "file.txt");
        assert_eq!(basename("/"), "");
    }

    #[test]
    fn join_never_doubles_separator() {
        assert_eq!(join("/dir", "f"), "/dir/f");
        assert_eq!(join("/dir/", "f"), "/dir/f");
        assert_eq!(join("/", "f"), "/f");
        assert_eq!(join("/dir/", "/f"), "/dir/f");
    }

    #[test]
    fn relative_cwd_is_anchored_at_root() {
        let mut r = resolver("home");
        assert_eq!(r.cwd(), "/home");
        r.set_cwd("/tmp/../var");
        assert_eq!(r.cwd(), "/var");
    }
}
