//! Shell error types

use alloc::string::String;
use core::fmt;

use storage::VfsError;

use crate::process::ProcessError;

/// Failure of a single command invocation.
///
/// Nothing here is fatal: the dispatcher prints the error and returns
/// control to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// Missing or malformed arguments. Carries the usage synopsis.
    Usage(&'static str),
    /// open/stat failed on a user-supplied path.
    NotFound { path: String },
    /// Path exists but is not a directory.
    NotADirectory { path: String },
    /// PID argument did not parse.
    InvalidPid,
    /// Attempt to terminate the idle process.
    ProtectedProcess,
    /// Some of several requested items failed.
    PartialFailure { failed: usize, requested: usize },
    /// `copy_file` refused the copy. Names the arguments as typed.
    CopyFailed { src: String, dst: String },
    /// No such command.
    UnknownCommand { name: String },
    /// Any other filesystem failure.
    Vfs { path: String, error: VfsError },
    /// Process manager failure.
    Process(ProcessError),
}

impl ShellError {
    /// Map a VFS failure on `path` to the matching variant.
    pub fn from_vfs(path: &str, error: VfsError) -> Self {
        match error {
            VfsError::NotFound => ShellError::NotFound {
                path: String::from(path),
            },
            VfsError::NotADirectory => ShellError::NotADirectory {
                path: String::from(path),
            },
            error => ShellError::Vfs {
                path: String::from(path),
                error,
            },
        }
    }

    /// Whether the message stands alone rather than after `<cmd>: `.
    pub fn is_bare(&self) -> bool {
        matches!(
            self,
            ShellError::Usage(_)
                | ShellError::InvalidPid
                | ShellError::ProtectedProcess
                | ShellError::UnknownCommand { .. }
        )
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Usage(synopsis) => write!(f, "Usage: {}", synopsis),
            ShellError::NotFound { path } => write!(f, "{}: No such file or directory", path),
            ShellError::NotADirectory { path } => write!(f, "{}: Not a directory", path),
            ShellError::InvalidPid => f.write_str("Invalid PID"),
            ShellError::ProtectedProcess => f.write_str("Cannot kill idle process"),
            ShellError::PartialFailure { failed, requested } => {
                write!(f, "{} of {} files could not be created", failed, requested)
            }
            ShellError::CopyFailed { src, dst } => {
                write!(f, "cannot copy '{}' to '{}'", src, dst)
            }
            ShellError::UnknownCommand { name } => write!(f, "{}: command not found", name),
            ShellError::Vfs { path, error } => write!(f, "{}: {}", path, error),
            ShellError::Process(e) => write!(f, "{}", e),
        }
    }
}

impl From<ProcessError> for ShellError {
    fn from(e: ProcessError) -> Self {
        ShellError::Process(e)
    }
}
