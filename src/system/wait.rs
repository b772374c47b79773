use std::io;

use libc::{c_int, WEXITSTATUS, WIFEXITED, WIFSIGNALED, WNOHANG, WTERMSIG};

use crate::cutils::cerr;
use crate::{system::interface::ProcessId, system::signal::SignalNumber};

mod sealed {
    pub(crate) trait Sealed {}

    impl Sealed for crate::system::interface::ProcessId {}
}

pub(crate) trait Wait: sealed::Sealed {
    /// Wait for a process to change state.
    ///
    /// Calling this function will block until a child specified by the given process ID has
    /// terminated. Use [`ProcessId::ANY_CHILD`] to wait for any child of the current process.
    /// This can be configured further using [`WaitOptions`].
    fn wait(self, options: WaitOptions) -> Result<(ProcessId, WaitStatus), WaitError>;
}

impl Wait for ProcessId {
    fn wait(self, options: WaitOptions) -> Result<(ProcessId, WaitStatus), WaitError> {
        let mut status: c_int = 0;

        // SAFETY: `status` is a valid pointer for the duration of the call.
        let pid = cerr(unsafe { libc::waitpid(self.get(), &mut status, options.flags) })
            .map_err(WaitError::Io)?;

        if pid == 0 && options.flags & WNOHANG != 0 {
            return Err(WaitError::NotReady);
        }

        Ok((ProcessId::new(pid), WaitStatus { status }))
    }
}

/// Error values returned when [`Wait::wait`] fails.
#[derive(Debug)]
pub enum WaitError {
    // No children were in a waitable state.
    //
    // This is only returned if the [`WaitOptions::no_hang`] option is used.
    NotReady,
    // Regular I/O error.
    Io(io::Error),
}

impl WaitError {
    /// Returns `true` if there are no children left to wait for.
    pub fn is_no_child(&self) -> bool {
        matches!(self, Self::Io(err) if err.raw_os_error() == Some(libc::ECHILD))
    }
}

/// Options to configure how [`Wait::wait`] waits for children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    flags: c_int,
}

impl WaitOptions {
    /// Only wait for terminated children.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Return immediately if no child has exited.
    pub const fn no_hang(mut self) -> Self {
        self.flags |= WNOHANG;
        self
    }

    #[cfg(test)]
    pub const fn is_no_hang(&self) -> bool {
        self.flags & WNOHANG != 0
    }
}

/// The status of the waited child.
#[derive(Clone, Copy)]
pub struct WaitStatus {
    status: c_int,
}

impl std::fmt::Debug for WaitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(exit_status) = self.exit_status() {
            write!(f, "ExitStatus({exit_status})")
        } else if let Some(signal) = self.term_signal() {
            match signal_hook::low_level::signal_name(signal) {
                Some(name) => write!(f, "TermSignal({name})"),
                None => write!(f, "TermSignal({signal})"),
            }
        } else {
            write!(f, "Unknown")
        }
    }
}

impl WaitStatus {
    /// Build a status from the raw value `waitpid` would have stored.
    #[cfg(test)]
    pub(crate) const fn from_raw(status: c_int) -> Self {
        Self { status }
    }

    /// Return `true` if the child terminated normally, i.e., by calling `exit`.
    pub const fn did_exit(&self) -> bool {
        WIFEXITED(self.status)
    }

    /// Return the exit status of the child if the child terminated normally.
    pub const fn exit_status(&self) -> Option<c_int> {
        if self.did_exit() {
            Some(WEXITSTATUS(self.status))
        } else {
            None
        }
    }

    /// Return `true` if the child process was terminated by a signal.
    pub const fn was_signaled(&self) -> bool {
        WIFSIGNALED(self.status)
    }

    /// Return the signal number which caused the child to terminate if the child was terminated by
    /// a signal.
    pub const fn term_signal(&self) -> Option<SignalNumber> {
        if self.was_signaled() {
            Some(WTERMSIG(self.status))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{process, thread, time::Duration};

    use libc::SIGINT;

    use crate::system::{
        interface::ProcessId,
        kill,
        wait::{Wait, WaitError, WaitOptions},
    };

    fn spawn_sh(script: &str) -> ProcessId {
        let child = process::Command::new("sh")
            .args(["-c", script])
            .spawn()
            .unwrap();
        ProcessId::new(child.id() as libc::pid_t)
    }

    #[test]
    fn exit_code_is_reported_once() {
        let child = spawn_sh("exit 2");

        let (pid, status) = child.wait(WaitOptions::new()).unwrap();
        assert_eq!(pid, child);
        assert_eq!(status.exit_status(), Some(2));
        assert_eq!(status.term_signal(), None);
        assert_eq!(format!("{status:?}"), "ExitStatus(2)");

        // the child is gone once it has been reaped
        let err = child.wait(WaitOptions::new()).unwrap_err();
        assert!(err.is_no_child());
    }

    #[test]
    fn interrupted_child_reports_signal() {
        let child = spawn_sh("sleep 5");
        thread::sleep(Duration::from_millis(50));
        kill(child, SIGINT).unwrap();

        let (_, status) = child.wait(WaitOptions::new()).unwrap();
        assert!(!status.did_exit());
        assert_eq!(status.exit_status(), None);
        assert_eq!(status.term_signal(), Some(SIGINT));
        assert_eq!(format!("{status:?}"), "TermSignal(SIGINT)");
    }

    #[test]
    fn no_hang_polls_until_child_ends() {
        let child = spawn_sh("sleep 0.1; exit 3");

        let mut polls = 0;
        let status = loop {
            match child.wait(WaitOptions::new().no_hang()) {
                Ok((_, status)) => break status,
                Err(WaitError::NotReady) => {
                    polls += 1;
                    thread::sleep(Duration::from_millis(10));
                }
                Err(WaitError::Io(err)) => panic!("{err}"),
            }
        };

        assert!(polls > 0);
        assert_eq!(status.exit_status(), Some(3));
    }
}
