#![deny(unsafe_code)]

mod launch;
mod mode;
mod reaper;
mod status;

pub use launch::{launch, LaunchError};
pub use mode::{ModeController, SignalMode};
pub use reaper::{ChildWaiter, JobReaper, SystemWaiter};
pub use status::{StatusTracker, TerminationStatus};

/// Where a launched command runs relative to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The shell blocks until the command terminates.
    Foreground,
    /// The shell goes on reading commands and reaps this one later.
    Background,
}

impl Placement {
    /// A command only leaves the foreground if it asked to and background commands are allowed.
    pub fn decide(background_requested: bool, mode: SignalMode) -> Self {
        if background_requested && mode == SignalMode::BackgroundAllowed {
            Placement::Background
        } else {
            Placement::Foreground
        }
    }

    /// Foreground commands can be interrupted from the terminal, background ones cannot.
    pub fn interrupt_disposition(self) -> InterruptDisposition {
        match self {
            Placement::Foreground => InterruptDisposition::Default,
            Placement::Background => InterruptDisposition::Ignore,
        }
    }
}

/// What a child does when it receives `SIGINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptDisposition {
    Default,
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::{InterruptDisposition, Placement, SignalMode};

    #[test]
    fn background_needs_request_and_permission() {
        use Placement::*;
        use SignalMode::*;

        assert_eq!(Placement::decide(true, BackgroundAllowed), Background);
        assert_eq!(Placement::decide(false, BackgroundAllowed), Foreground);
        assert_eq!(Placement::decide(true, ForegroundOnly), Foreground);
        assert_eq!(Placement::decide(false, ForegroundOnly), Foreground);
    }

    #[test]
    fn only_foreground_children_are_interruptible() {
        assert_eq!(
            Placement::Foreground.interrupt_disposition(),
            InterruptDisposition::Default
        );
        assert_eq!(
            Placement::Background.interrupt_disposition(),
            InterruptDisposition::Ignore
        );
    }
}
