use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::cutils::write_raw;
use crate::defaults::{ENTER_FOREGROUND_ONLY, EXIT_FOREGROUND_ONLY};
use crate::log::dev_error;
use crate::system::signal::{
    consts::*, signal_fmt, SignalHandler, SignalHandlerBehavior, SignalNumber,
};

// Written only by `on_mode_toggle`.
static BACKGROUND_ALLOWED: AtomicBool = AtomicBool::new(true);

/// Whether a trailing `&` is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    ForegroundOnly,
    BackgroundAllowed,
}

impl SignalMode {
    pub fn current() -> Self {
        Self::from_flag(BACKGROUND_ALLOWED.load(Ordering::SeqCst))
    }

    fn from_flag(background_allowed: bool) -> Self {
        if background_allowed {
            SignalMode::BackgroundAllowed
        } else {
            SignalMode::ForegroundOnly
        }
    }

    /// The line announcing that this mode was just entered.
    fn notice(self) -> &'static str {
        match self {
            SignalMode::ForegroundOnly => ENTER_FOREGROUND_ONLY,
            SignalMode::BackgroundAllowed => EXIT_FOREGROUND_ONLY,
        }
    }
}

/// Flip the mode and announce the new one on `fd`. Async-signal-safe.
fn toggle_and_announce(fd: libc::c_int) -> SignalMode {
    let was_allowed = BACKGROUND_ALLOWED.fetch_xor(true, Ordering::SeqCst);
    let mode = SignalMode::from_flag(!was_allowed);
    write_raw(fd, mode.notice().as_bytes());
    mode
}

extern "C" fn on_mode_toggle(_signal: SignalNumber) {
    toggle_and_announce(libc::STDOUT_FILENO);
}

/// Owns the shell's signal dispositions: `SIGINT` is ignored and `SIGTSTP` toggles the
/// [`SignalMode`].
///
/// Dropping the controller restores the previous dispositions.
pub struct ModeController {
    _handlers: [SignalHandler; 2],
}

impl ModeController {
    pub fn install() -> io::Result<Self> {
        let register = |signal, behavior| {
            SignalHandler::register(signal, behavior).map_err(|err| {
                dev_error!("cannot setup handler for {}: {err}", signal_fmt(signal));
                err
            })
        };

        let interrupt = register(SIGINT, SignalHandlerBehavior::Ignore)?;
        let toggle = register(SIGTSTP, SignalHandlerBehavior::Catch(on_mode_toggle))?;

        Ok(Self {
            _handlers: [interrupt, toggle],
        })
    }
}
