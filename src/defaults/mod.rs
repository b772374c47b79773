//! Compile-time settings of the shell.
#![forbid(unsafe_code)]

/// Printed before every line that is read.
pub const PROMPT: &str = ": ";

/// Longest accepted input line, not counting the line terminator.
pub const MAX_LINE_LENGTH: usize = 2048;

/// Most words a single command may have, the program name included.
pub const MAX_ARGUMENTS: usize = 512;

/// Replaced by the decimal pid of the shell inside every word.
pub const PID_VARIABLE: &str = "$$";

/// Lines starting with this character are ignored.
pub const COMMENT_MARKER: char = '#';

pub const BACKGROUND_MARKER: &str = "&";
pub const INPUT_REDIRECT: &str = "<";
pub const OUTPUT_REDIRECT: &str = ">";

/// Exit status of a child that could not open a redirection target.
pub const EXIT_REDIRECT_FAILED: libc::c_int = 1;

/// Exit status of a child that could not set up its streams or execute the program.
pub const EXIT_EXEC_FAILED: libc::c_int = 2;

/// Exit status of the shell after an error it cannot recover from, such as a failed `fork` or
/// an unreadable input.
pub const EXIT_FATAL: libc::c_int = 1;

pub const ENTER_FOREGROUND_ONLY: &str = "\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &str = "\nExiting foreground-only mode\n";
