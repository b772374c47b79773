use std::{
    ffi::CStr,
    io,
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
};

use crate::cutils::cerr;

/// Permission bits for files created by an output redirection, before the umask is applied.
const CREATE_MODE: libc::c_uint = 0o666;

fn open(path: &CStr, flags: libc::c_int) -> io::Result<OwnedFd> {
    // SAFETY: `path` is a valid NUL-terminated string; the mode argument is only read when
    // `O_CREAT` is part of `flags`.
    let fd = cerr(unsafe { libc::open(path.as_ptr(), flags, CREATE_MODE) })?;
    // SAFETY: `open` returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Open an existing file for reading.
pub fn open_for_input(path: &CStr) -> io::Result<OwnedFd> {
    open(path, libc::O_RDONLY)
}

/// Open a file for writing, creating it if needed and truncating it otherwise.
pub fn open_for_output(path: &CStr) -> io::Result<OwnedFd> {
    open(path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)
}

/// Make `target` refer to the same open file as `fd`.
pub fn duplicate_onto(fd: &impl AsRawFd, target: RawFd) -> io::Result<()> {
    // SAFETY: `dup2` cannot cause UB even if either descriptor is invalid.
    cerr(unsafe { libc::dup2(fd.as_raw_fd(), target) }).map(|_| ())
}

/// Set or clear the close-on-exec flag of a descriptor.
pub fn set_close_on_exec(fd: &impl AsRawFd, close_on_exec: bool) -> io::Result<()> {
    let fd = fd.as_raw_fd();
    // SAFETY: `fcntl` with `F_GETFD`/`F_SETFD` cannot cause UB even if `fd` is invalid.
    let flags = cerr(unsafe { libc::fcntl(fd, libc::F_GETFD) })?;
    let flags = if close_on_exec {
        flags | libc::FD_CLOEXEC
    } else {
        flags & !libc::FD_CLOEXEC
    };
    cerr(unsafe { libc::fcntl(fd, libc::F_SETFD, flags) }).map(|_| ())
}

#[cfg(test)]
pub fn is_close_on_exec(fd: &impl AsRawFd) -> io::Result<bool> {
    // SAFETY: `fcntl` with `F_GETFD` cannot cause UB even if the descriptor is invalid.
    let flags = cerr(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFD) })?;
    Ok(flags & libc::FD_CLOEXEC != 0)
}

/// Replace the standard stream `target` by the file behind `fd`.
///
/// Afterwards `target` survives `exec` and `fd` does not.
pub fn redirect(fd: &OwnedFd, target: RawFd) -> Result<(), RedirectError> {
    if fd.as_raw_fd() == target {
        // `open` handed out the stream's own number because it was closed.
        return set_close_on_exec(fd, false).map_err(RedirectError::Duplicate);
    }

    duplicate_onto(fd, target).map_err(RedirectError::Duplicate)?;
    set_close_on_exec(fd, true).map_err(RedirectError::CloseOnExec)
}

#[derive(Debug)]
pub enum RedirectError {
    Duplicate(io::Error),
    CloseOnExec(io::Error),
}
