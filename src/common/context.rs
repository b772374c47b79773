use std::path::PathBuf;

use crate::system::{interface::ProcessId, Process};

/// Facts about the running shell that are fixed at start-up.
#[derive(Debug, Clone)]
pub struct ShellContext {
    /// Substituted for `$$`.
    pub shell_pid: ProcessId,
    /// Target of `cd` without an argument.
    pub home: Option<PathBuf>,
}

impl ShellContext {
    pub fn from_env() -> Self {
        Self {
            shell_pid: Process::process_id(),
            home: std::env::var_os("HOME")
                .filter(|home| !home.is_empty())
                .map(PathBuf::from),
        }
    }
}
