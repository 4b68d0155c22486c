//! Process control: `spawn` and `kill`.
//!
//! The process manager is an external collaborator reached through
//! [`ProcessManager`]. The idle process (PID 1) is refused here, before
//! any call crosses that boundary.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

use crate::config::{DEFAULT_SPAWN_COUNT, IDLE_PID};
use crate::console::Console;
use crate::error::ShellError;

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Idle/init process. Immutable.
    pub const IDLE: ProcessId = ProcessId(IDLE_PID);

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process manager error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    NoSuchProcess(ProcessId),
    TableFull,
    PermissionDenied(ProcessId),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::NoSuchProcess(pid) => write!(f, "({}) - No such process", pid),
            ProcessError::TableFull => f.write_str("process table full"),
            ProcessError::PermissionDenied(pid) => {
                write!(f, "({}) - Operation not permitted", pid)
            }
        }
    }
}

/// Process lifecycle operations the shell consumes.
pub trait ProcessManager {
    /// Start `count` test workers; returns their PIDs.
    fn spawn_test_processes(&self, count: u32) -> Result<Vec<ProcessId>, ProcessError>;

    /// Terminate a process.
    fn kill(&self, pid: ProcessId) -> Result<(), ProcessError>;
}

impl<T: ProcessManager + ?Sized> ProcessManager for &T {
    fn spawn_test_processes(&self, count: u32) -> Result<Vec<ProcessId>, ProcessError> {
        (**self).spawn_test_processes(count)
    }
    fn kill(&self, pid: ProcessId) -> Result<(), ProcessError> {
        (**self).kill(pid)
    }
}

// ────────────────────────── Argument parsing ──────────────────────────

/// Parse a PID argument.
///
/// Only the first whitespace-separated token is considered. The whole
/// token must be decimal digits: `12x` is rejected rather than read as
/// 12. Zero and values that overflow are invalid.
pub fn parse_pid(arg: &str) -> Result<ProcessId, ShellError> {
    let token = arg
        .split_whitespace()
        .next()
        .ok_or(ShellError::Usage("kill <pid>"))?;

    let mut pid: u32 = 0;
    for byte in token.bytes() {
        if !byte.is_ascii_digit() {
            return Err(ShellError::InvalidPid);
        }
        pid = pid
            .checked_mul(10)
            .and_then(|p| p.checked_add(u32::from(byte - b'0')))
            .ok_or(ShellError::InvalidPid)?;
    }

    if pid == 0 {
        return Err(ShellError::InvalidPid);
    }
    Ok(ProcessId(pid))
}

/// Parse the worker count for `spawn` from the leading digit run.
///
/// Anything unusable (no digits, zero, overflow) yields the default.
pub fn parse_spawn_count(arg: &str) -> u32 {
    let mut count: u32 = 0;
    let mut seen = false;
    for byte in arg.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        count = match count
            .checked_mul(10)
            .and_then(|c| c.checked_add(u32::from(byte - b'0')))
        {
            Some(c) => c,
            None => return DEFAULT_SPAWN_COUNT,
        };
    }
    if !seen || count == 0 {
        DEFAULT_SPAWN_COUNT
    } else {
        count
    }
}

// ────────────────────────── Commands ──────────────────────────

/// `spawn [n]`
pub fn spawn<P, C>(procs: &P, arg: &str, out: &mut C) -> Result<Vec<ProcessId>, ShellError>
where
    P: ProcessManager + ?Sized,
    C: Console + ?Sized,
{
    let count = parse_spawn_count(arg);
    log::debug!("[PROC] spawning {} test process(es)", count);
    let pids = procs.spawn_test_processes(count)?;

    let list: Vec<String> = pids.iter().map(|p| format!("{}", p)).collect();
    out.write_line(&format!(
        "Spawned {} test process{}: {}",
        pids.len(),
        if pids.len() == 1 { "" } else { "es" },
        list.join(" ")
    ));
    Ok(pids)
}

/// `kill <pid>`
pub fn kill<P, C>(procs: &P, arg: &str, out: &mut C) -> Result<ProcessId, ShellError>
where
    P: ProcessManager + ?Sized,
    C: Console + ?Sized,
{
    let pid = parse_pid(arg)?;
    if pid == ProcessId::IDLE {
        log::warn!("[PROC] refused to kill idle process");
        return Err(ShellError::ProtectedProcess);
    }

    procs.kill(pid)?;
    out.write_line(&format!("Killed process {}", pid));
    Ok(pid)
}

// ────────────────────────── Process table ──────────────────────────

/// Default capacity of [`ProcessTable`].
pub const DEFAULT_TABLE_CAPACITY: usize = 64;

struct TableInner {
    processes: BTreeMap<ProcessId, String>,
    next_pid: u32,
    capacity: usize,
}

/// In-memory [`ProcessManager`] holding the idle process and test workers.
pub struct ProcessTable {
    inner: Mutex<TableInner>,
    kill_calls: AtomicUsize,
    spawn_calls: AtomicUsize,
}

impl fmt::Debug for ProcessTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessTable")
            .field("pids", &self.pids())
            .field("kill_calls", &self.kill_calls.load(Ordering::Relaxed))
            .field("spawn_calls", &self.spawn_calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    /// Table containing only the idle process.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut processes = BTreeMap::new();
        processes.insert(ProcessId::IDLE, String::from("idle"));
        ProcessTable {
            inner: Mutex::new(TableInner {
                processes,
                next_pid: IDLE_PID + 1,
                capacity: capacity.max(1),
            }),
            kill_calls: AtomicUsize::new(0),
            spawn_calls: AtomicUsize::new(0),
        }
    }

    /// Register a process under a fixed PID.
    pub fn insert(&self, pid: ProcessId, name: &str) {
        let mut inner = self.inner.lock();
        inner.processes.insert(pid, String::from(name));
        if pid.0 >= inner.next_pid {
            inner.next_pid = pid.0.saturating_add(1);
        }
    }

    pub fn contains(&self, pid: ProcessId) -> bool {
        self.inner.lock().processes.contains_key(&pid)
    }

    pub fn pids(&self) -> Vec<ProcessId> {
        self.inner.lock().processes.keys().copied().collect()
    }

    /// Number of `kill` requests that reached the table.
    pub fn kill_calls(&self) -> usize {
        self.kill_calls.load(Ordering::SeqCst)
    }

    /// Number of spawn requests that reached the table.
    pub fn spawn_calls(&self) -> usize {
        self.spawn_calls.load(Ordering::SeqCst)
    }
}

impl ProcessManager for ProcessTable {
    fn spawn_test_processes(&self, count: u32) -> Result<Vec<ProcessId>, ProcessError> {
        self.spawn_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock();
        let count = count as usize;
        if inner.processes.len() + count > inner.capacity {
            return Err(ProcessError::TableFull);
        }

        let mut pids = Vec::with_capacity(count);
        for _ in 0..count {
            let pid = ProcessId(inner.next_pid);
            inner.next_pid = inner.next_pid.checked_add(1).ok_or(ProcessError::TableFull)?;
            inner.processes.insert(pid, String::from("test"));
            pids.push(pid);
        }
        Ok(pids)
    }

    fn kill(&self, pid: ProcessId) -> Result<(), ProcessError> {
        self.kill_calls.fetch_add(1, Ordering::SeqCst);
        if pid == ProcessId::IDLE {
            return Err(ProcessError::PermissionDenied(pid));
        }
        match self.inner.lock().processes.remove(&pid) {
            Some(_) => Ok(()),
            None => Err(ProcessError::NoSuchProcess(pid)),
        }
    }
}
