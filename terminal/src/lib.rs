//! kosh shell commands.
//!
//! A thin client of two external services: the filesystem, reached through
//! [`storage::Vfs`], and the process manager, reached through
//! [`process::ProcessManager`]. Commands:
//! - `cat`, `hexdump` - bounded streaming reads ([`stream`])
//! - `cp`, `touch` - delegated copy and create ([`copy`])
//! - `ls`, `mount` - directory and mount listings ([`listing`])
//! - `spawn`, `kill` - process control ([`process`])
//! - `cd`, `pwd`, `help` - shell built-ins ([`commands`])

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod commands;
pub mod config;
pub mod console;
pub mod copy;
pub mod error;
pub mod listing;
pub mod path;
pub mod process;
pub mod shell;
pub mod stream;

pub use commands::{CmdResult, COMMAND_LIST};
pub use config::ShellConfig;
pub use console::{BufferConsole, Console};
pub use error::ShellError;
pub use path::PathResolver;
pub use process::{ProcessError, ProcessId, ProcessManager, ProcessTable};
pub use shell::Shell;
pub use stream::StreamSummary;
