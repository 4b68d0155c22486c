//! Shell Engine
//!
//! Owns the filesystem and process collaborators, the working directory
//! and the configuration, and runs one command line at a time. There is
//! no global state: two shells over the same filesystem keep separate
//! working directories.

use storage::Vfs;

use crate::commands::{self, CmdResult};
use crate::config::ShellConfig;
use crate::console::Console;
use crate::path::PathResolver;
use crate::process::ProcessManager;

pub struct Shell<V, P> {
    pub(crate) vfs: V,
    pub(crate) procs: P,
    pub(crate) resolver: PathResolver,
    pub(crate) config: ShellConfig,
}

impl<V: Vfs, P: ProcessManager> Shell<V, P> {
    /// Shell with default configuration, started in `/`.
    pub fn new(vfs: V, procs: P) -> Self {
        Self::with_config(vfs, procs, ShellConfig::default())
    }

    pub fn with_config(vfs: V, procs: P, config: ShellConfig) -> Self {
        let config = config.sanitized();
        let resolver = PathResolver::new(&config.cwd, config.max_path_len);
        log::debug!("[SHELL] started in {}", resolver.cwd());
        Shell {
            vfs,
            procs,
            resolver,
            config,
        }
    }

    /// Run one command line. A blank line succeeds without output.
    pub fn execute<C: Console + ?Sized>(&mut self, line: &str, out: &mut C) -> CmdResult {
        match commands::split_command(line) {
            Some((name, arg)) => {
                log::trace!("[SHELL] exec {} [{}]", name, arg);
                commands::execute_command(self, name, arg, out)
            }
            None => CmdResult::ok(),
        }
    }
}

impl<V, P> Shell<V, P> {
    pub fn cwd(&self) -> &str {
        self.resolver.cwd()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn vfs(&self) -> &V {
        &self.vfs
    }

    pub fn procs(&self) -> &P {
        &self.procs
    }
}
