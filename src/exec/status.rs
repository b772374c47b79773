use std::fmt;

use crate::system::{signal::SignalNumber, wait::WaitStatus};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    Exited(libc::c_int),
    Signaled(SignalNumber),
}

impl Default for TerminationStatus {
    fn default() -> Self {
        TerminationStatus::Exited(0)
    }
}

impl TerminationStatus {
    /// Returns `None` if the status does not describe a terminated child.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        if let Some(code) = status.exit_status() {
            Some(TerminationStatus::Exited(code))
        } else {
            status.term_signal().map(TerminationStatus::Signaled)
        }
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Exited(code) => write!(f, "the exit value is: {code}"),
            TerminationStatus::Signaled(signal) => {
                write!(f, "the termination signal is: {signal}")
            }
        }
    }
}

/// Remembers how the most recently reaped child ended.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last: TerminationStatus,
}

impl StatusTracker {
    pub fn record(&mut self, status: TerminationStatus) {
        self.last = status;
    }

    #[cfg(test)]
    pub fn last(&self) -> TerminationStatus {
        self.last
    }

    pub fn format(&self) -> String {
        self.last.to_string()
    }
}
