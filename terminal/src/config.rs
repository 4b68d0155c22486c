//! Shell configuration.
//!
//! Compile-time defaults live here as constants; [`ShellConfig`] carries
//! the values a host may override at runtime.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Longest path the resolver produces, terminator excluded.
pub const MAX_PATH_LEN: usize = 255;

/// Chunk size for streaming reads in `cat`.
pub const CAT_CHUNK_SIZE: usize = 255;

/// Byte cap for `cat` output (64 KiB).
pub const CAT_BYTE_LIMIT: usize = 64 * 1024;

/// Byte cap for `hexdump`.
pub const DUMP_BYTE_LIMIT: usize = 512;

/// Bytes per `hexdump` row.
pub const DUMP_ROW_LEN: usize = 16;

/// Working directory of a fresh shell.
pub const DEFAULT_CWD: &str = "/";

/// PID of the idle/init process. Never killable.
pub const IDLE_PID: u32 = 1;

/// Worker count for `spawn` without a usable argument.
pub const DEFAULT_SPAWN_COUNT: u32 = 1;

/// Runtime-tunable shell settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Initial working directory.
    pub cwd: String,
    /// Read chunk size for `cat`.
    pub cat_chunk_size: usize,
    /// Maximum bytes `cat` emits per file.
    pub cat_byte_limit: usize,
    /// Maximum bytes `hexdump` reads.
    pub dump_byte_limit: usize,
    /// Path length cap for the resolver.
    pub max_path_len: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            cwd: String::from(DEFAULT_CWD),
            cat_chunk_size: CAT_CHUNK_SIZE,
            cat_byte_limit: CAT_BYTE_LIMIT,
            dump_byte_limit: DUMP_BYTE_LIMIT,
            max_path_len: MAX_PATH_LEN,
        }
    }
}

impl ShellConfig {
    /// Clamp sizes that must be positive.
    pub fn sanitized(mut self) -> Self {
        self.cat_chunk_size = self.cat_chunk_size.max(1);
        self.max_path_len = self.max_path_len.max(1);
        if !self.cwd.starts_with('/') {
            self.cwd = String::from(DEFAULT_CWD);
        }
        self
    }
}
