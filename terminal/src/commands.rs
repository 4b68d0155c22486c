//! Command registry and dispatch.
//!
//! Every command takes one argument string and writes to the console.
//! Failures come back as [`ShellError`] and are printed here, once, so the
//! command bodies never format their own error lines.

use alloc::format;

use storage::vfs::stat;
use storage::Vfs;

use crate::console::Console;
use crate::copy;
use crate::error::ShellError;
use crate::listing;
use crate::process::{self, ProcessManager};
use crate::shell::Shell;
use crate::stream;

// ────────────────────────── Result type ──────────────────────────

/// Outcome of one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdResult {
    pub success: bool,
}

impl CmdResult {
    pub fn ok() -> Self {
        Self { success: true }
    }

    pub fn err() -> Self {
        Self { success: false }
    }

    /// Conventional process exit status: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

// ────────────────────────── Command registry ──────────────────────────

/// All available command names (sorted).
pub static COMMAND_LIST: &[&str] = &[
    "cat", "cd", "cp", "help", "hexdump", "kill", "ls", "mount", "pwd", "spawn", "touch",
];

/// Split a line into command name and argument string.
///
/// Returns `None` for a blank line. The argument string has its leading
/// whitespace removed and is otherwise passed through untouched.
pub fn split_command(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(pos) => Some((&line[..pos], line[pos..].trim_start())),
        None => Some((line, "")),
    }
}

/// Dispatch a command by name.
pub fn execute_command<V, P, C>(
    shell: &mut Shell<V, P>,
    name: &str,
    arg: &str,
    out: &mut C,
) -> CmdResult
where
    V: Vfs,
    P: ProcessManager,
    C: Console + ?Sized,
{
    let result = match name {
        // ── Filesystem ──
        "cat" => stream::cat(&shell.vfs, &shell.resolver, &shell.config, arg, out).map(drop),
        "hexdump" => {
            stream::hexdump(&shell.vfs, &shell.resolver, &shell.config, arg, out).map(drop)
        }
        "cp" => copy::cp(&shell.vfs, &shell.resolver, arg).map(drop),
        "touch" => copy::touch(&shell.vfs, &shell.resolver, arg).map(drop),
        "ls" => listing::ls(&shell.vfs, &shell.resolver, arg, out).map(drop),
        "mount" => listing::mount(&shell.vfs, out).map(drop),
        "cd" => cmd_cd(shell, arg),
        "pwd" => {
            out.write_line(shell.resolver.cwd());
            Ok(())
        }

        // ── Processes ──
        "spawn" => process::spawn(&shell.procs, arg, out).map(drop),
        "kill" => process::kill(&shell.procs, arg, out).map(drop),

        // ── Misc ──
        "help" => {
            cmd_help(out);
            Ok(())
        }

        _ => Err(ShellError::UnknownCommand {
            name: name.into(),
        }),
    };

    match result {
        Ok(()) => CmdResult::ok(),
        Err(err) => {
            report_error(name, &err, out);
            CmdResult::err()
        }
    }
}

/// Print an error as one console line.
pub fn report_error<C: Console + ?Sized>(name: &str, err: &ShellError, out: &mut C) {
    log::debug!("[SHELL] {} failed: {:?}", name, err);
    if err.is_bare() {
        out.write_line(&format!("{}", err));
    } else {
        out.write_line(&format!("{}: {}", name, err));
    }
}

fn cmd_cd<V: Vfs, P>(shell: &mut Shell<V, P>, arg: &str) -> Result<(), ShellError> {
    let arg = arg.split_whitespace().next().unwrap_or("/");
    let path = shell.resolver.resolve(arg);
    let record = stat(&shell.vfs, &path).map_err(|e| ShellError::from_vfs(arg, e))?;
    if !record.is_dir() {
        return Err(ShellError::NotADirectory { path: arg.into() });
    }
    log::trace!("[SHELL] cwd {} -> {}", shell.resolver.cwd(), path);
    shell.resolver.set_cwd(&path);
    Ok(())
}

fn cmd_help<C: Console + ?Sized>(out: &mut C) {
    out.write_line("kosh built-in commands:");
    out.write_line("  cat <path>         print a file (first 64 KiB)");
    out.write_line("  cd [path]          change directory");
    out.write_line("  cp <src> <dst>     copy a file");
    out.write_line("  help               show this list");
    out.write_line("  hexdump <path>     dump the first 512 bytes");
    out.write_line("  kill <pid>         terminate a process");
    out.write_line("  ls [path]          list a directory");
    out.write_line("  mount              show mounted filesystems");
    out.write_line("  pwd                print working directory");
    out.write_line("  spawn [n]          start n test processes");
    out.write_line("  touch <file>...    create empty files");
}
