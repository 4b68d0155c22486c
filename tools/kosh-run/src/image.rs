//! Image files.
//!
//! An image is a TOML description of the world a shell runs in: the
//! filesystem tree, the mount table, the process table and the shell
//! settings. A missing image means an empty root and PID 1 only.

use std::path::Path;

use serde::{Deserialize, Serialize};
use storage::MemFs;
use terminal::process::DEFAULT_TABLE_CAPACITY;
use terminal::{ProcessId, ProcessTable, ShellConfig};

use crate::error::RunError;

/// Descriptor slots when the image does not set `limits.max_open_files`.
pub const DEFAULT_MAX_OPEN_FILES: usize = 16;

// ── Data models ──────────────────────────────────────────────────────

/// Top-level image loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Image {
    pub shell: ShellConfig,
    pub dirs: Vec<PathEntry>,
    pub files: Vec<FileEntry>,
    pub devices: Vec<PathEntry>,
    pub mounts: Vec<MountEntry>,
    pub processes: Processes,
    pub limits: Limits,
}

/// `[[dirs]]` / `[[devices]]` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathEntry {
    pub path: String,
}

/// `[[files]]` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

/// `[[mounts]]` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MountEntry {
    pub name: String,
    pub mount_point: String,
}

/// `[processes]` table. PID 1 is always present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Processes {
    pub pids: Vec<u32>,
}

/// `[limits]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Limits {
    pub max_open_files: usize,
    pub max_processes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            max_processes: DEFAULT_TABLE_CAPACITY,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────

/// Load an image file.
pub fn load_image(path: &Path) -> Result<Image, RunError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RunError::ImageNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RunError::Io(e)
        }
    })?;
    parse_image_str(&content)
}

/// Parse an image from a TOML string.
pub fn parse_image_str(content: &str) -> Result<Image, RunError> {
    toml::from_str(content).map_err(|e| RunError::ImageParse(format!("invalid TOML: {e}")))
}

impl Image {
    /// Materialise the filesystem and process table.
    pub fn build(&self) -> Result<(MemFs, ProcessTable), RunError> {
        let fs = MemFs::with_max_fds(self.limits.max_open_files);

        for dir in &self.dirs {
            fs.add_dir(&dir.path).map_err(|e| invalid(&dir.path, e))?;
        }
        for file in &self.files {
            fs.add_file(&file.path, file.content.as_bytes())
                .map_err(|e| invalid(&file.path, e))?;
        }
        for dev in &self.devices {
            fs.add_device(&dev.path).map_err(|e| invalid(&dev.path, e))?;
        }
        for m in &self.mounts {
            fs.add_mount(&m.name, &m.mount_point);
        }

        let procs = ProcessTable::with_capacity(self.limits.max_processes);
        for &pid in &self.processes.pids {
            match pid {
                0 => {
                    return Err(RunError::InvalidImage {
                        entry: String::from("processes.pids"),
                        reason: String::from("PID 0 is reserved"),
                    })
                }
                1 => {}
                pid => procs.insert(ProcessId(pid), "proc"),
            }
        }

        log::info!(
            "image: {} dirs, {} files, {} devices, {} mounts, {} processes",
            self.dirs.len(),
            self.files.len(),
            self.devices.len(),
            self.mounts.len(),
            procs.pids().len()
        );
        Ok((fs, procs))
    }
}

fn invalid(entry: &str, err: storage::VfsError) -> RunError {
    RunError::InvalidImage {
        entry: entry.to_string(),
        reason: err.to_string(),
    }
}
