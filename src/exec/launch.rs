use std::{
    ffi::{CStr, CString},
    fmt,
    io::{self, Write},
    os::fd::{OwnedFd, RawFd},
    path::{Path, PathBuf},
};

use super::InterruptDisposition;
use crate::{
    common::Command,
    cutils::to_cstring,
    defaults::{EXIT_EXEC_FAILED, EXIT_REDIRECT_FAILED},
    log::{dev_info, dev_warn, user_error},
    system::{
        _exit,
        file::{open_for_input, open_for_output, redirect, RedirectError},
        fork,
        interface::ProcessId,
        signal::{consts::*, SignalHandler, SignalHandlerBehavior, SignalNumber, SignalSet},
        ForkResult,
    },
};

#[derive(Debug)]
pub enum LaunchError {
    /// A word of the command cannot be passed to a program.
    InvalidArgument(io::Error),
    /// No child process could be created.
    Fork(io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::InvalidArgument(e) => write!(f, "invalid argument: {e}"),
            LaunchError::Fork(e) => write!(f, "cannot create a child process: {e}"),
        }
    }
}

/// A command converted to C strings, so the child does not need to allocate before `exec`.
struct ExecRequest<'a> {
    program: CString,
    args: Vec<CString>,
    input: Option<(&'a Path, CString)>,
    output: Option<(&'a Path, CString)>,
}

impl<'a> ExecRequest<'a> {
    fn new(command: &'a Command) -> io::Result<Self> {
        let path = |path: &'a Option<PathBuf>| -> io::Result<Option<(&'a Path, CString)>> {
            path.as_deref()
                .map(|path| to_cstring(&path.to_string_lossy()).map(|c_path| (path, c_path)))
                .transpose()
        };

        Ok(Self {
            program: to_cstring(&command.program)?,
            args: command
                .args
                .iter()
                .map(|arg| to_cstring(arg))
                .collect::<io::Result<_>>()?,
            input: path(&command.input_redirect)?,
            output: path(&command.output_redirect)?,
        })
    }

    /// The NULL-terminated argument vector for `execvp`. Borrows from `self.args`.
    fn argv(&self) -> Vec<*const libc::c_char> {
        self.args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect()
    }
}

/// Start `command` in a new child process and return its pid without waiting for it.
///
/// Problems that only show up in the child (a redirection target that cannot be opened, a
/// program that cannot be executed) make the child exit with a non-zero status; they are never
/// reported through the return value.
pub fn launch(
    command: &Command,
    disposition: InterruptDisposition,
) -> Result<ProcessId, LaunchError> {
    let request = ExecRequest::new(command).map_err(LaunchError::InvalidArgument)?;
    let argv = request.argv();

    // Anything still buffered would otherwise be written a second time by the child.
    io::stdout().flush().ok();

    // Hold `SIGTSTP` back until the child has replaced the mode toggle handler.
    let original_set = match SignalSet::with(&[SIGTSTP]).and_then(|set| set.block()) {
        Ok(original_set) => Some(original_set),
        Err(err) => {
            dev_warn!("cannot block signals: {err}");
            None
        }
    };

    let forked = match fork() {
        Ok(ForkResult::Child) => run_child(&request, &argv, disposition, original_set.as_ref()),
        Ok(ForkResult::Parent(pid)) => Ok(pid),
        Err(err) => Err(err),
    };

    if let Some(set) = &original_set {
        if let Err(err) = set.set_mask() {
            dev_warn!("cannot restore signal mask: {err}");
        }
    }

    match forked {
        Ok(pid) => {
            dev_info!("launched `{command}` with pid {pid}");
            Ok(pid)
        }
        Err(err) => {
            dev_warn!("unable to fork command process: {err}");
            Err(LaunchError::Fork(err))
        }
    }
}

fn set_disposition(signal: SignalNumber, behavior: SignalHandlerBehavior) {
    match SignalHandler::register(signal, behavior) {
        Ok(handler) => handler.forget(),
        Err(err) => dev_warn!("cannot set disposition of signal {signal}: {err}"),
    }
}

fn redirect_or_exit(
    (path, c_path): &(&Path, CString),
    open: fn(&CStr) -> io::Result<OwnedFd>,
    target: RawFd,
) -> OwnedFd {
    let fd = match open(c_path) {
        Ok(fd) => fd,
        Err(err) => {
            user_error!("cannot open {}: {err}", path.display());
            _exit(EXIT_REDIRECT_FAILED)
        }
    };

    match redirect(&fd, target) {
        Ok(()) => {}
        Err(RedirectError::Duplicate(err)) => {
            user_error!("cannot redirect to {}: {err}", path.display());
            _exit(EXIT_EXEC_FAILED)
        }
        // the stream itself is in place, the extra descriptor only leaks into the program
        Err(RedirectError::CloseOnExec(err)) => {
            dev_warn!("cannot mark {} close-on-exec: {err}", path.display())
        }
    }

    fd
}

fn run_child(
    request: &ExecRequest,
    argv: &[*const libc::c_char],
    disposition: InterruptDisposition,
    original_set: Option<&SignalSet>,
) -> ! {
    set_disposition(
        SIGINT,
        match disposition {
            InterruptDisposition::Default => SignalHandlerBehavior::Default,
            InterruptDisposition::Ignore => SignalHandlerBehavior::Ignore,
        },
    );
    // A stopped foreground child would never be reported to the shell's wait.
    set_disposition(SIGTSTP, SignalHandlerBehavior::Ignore);

    if let Some(set) = original_set {
        if let Err(err) = set.set_mask() {
            dev_warn!("cannot restore signal mask: {err}");
        }
    }

    // Kept open until `exec`: if the stream was closed, `open` may have returned its number.
    let _input = request
        .input
        .as_ref()
        .map(|input| redirect_or_exit(input, open_for_input, libc::STDIN_FILENO));
    let _output = request
        .output
        .as_ref()
        .map(|output| redirect_or_exit(output, open_for_output, libc::STDOUT_FILENO));

    #[allow(unsafe_code)]
    // SAFETY: `program` is NUL-terminated and `argv` is a NULL-terminated array of pointers into
    // `request.args`, which outlives this call.
    unsafe {
        libc::execvp(request.program.as_ptr(), argv.as_ptr());
    }

    let err = io::Error::last_os_error();
    let program = request.program.to_string_lossy();
    if err.kind() == io::ErrorKind::NotFound {
        user_error!("{program}: command not found");
    } else {
        user_error!("{program}: {err}");
    }
    _exit(EXIT_EXEC_FAILED)
}
