use std::{ffi::CStr, io};

use crate::cutils::cerr;
use interface::ProcessId;

pub mod interface;

pub mod file;

pub mod signal;

pub mod wait;

pub(crate) fn _exit(status: libc::c_int) -> ! {
    // SAFETY: `_exit` is always safe to call; it does not run any destructors or exit handlers.
    unsafe { libc::_exit(status) }
}

pub(crate) enum ForkResult {
    // Parent process branch with the child process' PID.
    Parent(ProcessId),
    // Child process branch.
    Child,
}

unsafe fn inner_fork() -> io::Result<ForkResult> {
    let pid = cerr(unsafe { libc::fork() })?;
    if pid == 0 {
        Ok(ForkResult::Child)
    } else {
        Ok(ForkResult::Parent(ProcessId::new(pid)))
    }
}

#[cfg(target_os = "linux")]
/// Create a new process.
pub(crate) fn fork() -> io::Result<ForkResult> {
    // SAFETY: `fork` is implemented using `clone` in linux so we don't need to worry about signal
    // safety.
    unsafe { inner_fork() }
}

#[cfg(not(target_os = "linux"))]
/// Create a new process.
///
/// # Safety
///
/// In a multithreaded program, only async-signal-safe functions are guaranteed to work in the
/// child process until a call to `execve` or a similar function is done.
pub(crate) unsafe fn fork() -> io::Result<ForkResult> {
    inner_fork()
}

/// Send a signal to a process with the specified ID.
#[cfg(test)]
pub fn kill(pid: ProcessId, signal: signal::SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.get(), signal) }).map(|_| ())
}

/// Change the current working directory.
pub fn chdir<S: AsRef<CStr>>(path: &S) -> io::Result<()> {
    // SAFETY: `path` is a valid NUL-terminated string.
    cerr(unsafe { libc::chdir(path.as_ref().as_ptr()) }).map(|_| ())
}

pub struct Process;

impl Process {
    /// Return the process identifier for the current process
    pub fn process_id() -> ProcessId {
        // NOTE libstd casts the `i32` that `libc::getpid` returns into `u32`
        // here we cast it back into `i32` (`ProcessId`)
        ProcessId::new(std::process::id() as libc::pid_t)
    }
}

pub fn make_zeroed_sigaction() -> libc::sigaction {
    // SAFETY: `sigaction` is a C struct, all-zeroes is a valid representation. Its layout differs
    // between platforms, so it cannot be built with a struct literal.
    unsafe { std::mem::zeroed() }
}
