//! Utilities to handle signals.
mod handler;
mod set;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use set::SignalSet;

pub(crate) type SignalNumber = libc::c_int;

/// A signal-catching function. It runs asynchronously, so it may only call async-signal-safe
/// functions.
pub(crate) type SignalCallback = extern "C" fn(SignalNumber);

pub(crate) mod consts {
    pub(crate) use signal_hook::consts::{SIGINT, SIGKILL, SIGSTOP, SIGTSTP};
}

/// The name of a signal, or its number if it has no well-known name.
pub(crate) fn signal_fmt(signal: SignalNumber) -> std::borrow::Cow<'static, str> {
    signal_hook::low_level::signal_name(signal)
        .map(|name| name.into())
        .unwrap_or_else(|| format!("unknown signal #{}", signal).into())
}
