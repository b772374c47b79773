use std::{fmt, path::PathBuf};

use crate::defaults::{
    BACKGROUND_MARKER, COMMENT_MARKER, INPUT_REDIRECT, MAX_ARGUMENTS, MAX_LINE_LENGTH,
    OUTPUT_REDIRECT, PID_VARIABLE,
};
use crate::system::interface::ProcessId;

/// One parsed input line.
///
/// A blank or comment line parses into the empty command, see [`Command::is_empty`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    /// All words of the command; the first one is always `program`.
    pub args: Vec<String>,
    pub input_redirect: Option<PathBuf>,
    pub output_redirect: Option<PathBuf>,
    pub background_requested: bool,
}

impl Command {
    /// Returns `true` for lines that carry nothing to run.
    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// The words after the program name.
    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))?;
        if let Some(path) = &self.input_redirect {
            write!(f, " {INPUT_REDIRECT} {}", path.display())?;
        }
        if let Some(path) = &self.output_redirect {
            write!(f, " {OUTPUT_REDIRECT} {}", path.display())?;
        }
        if self.background_requested {
            write!(f, " {BACKGROUND_MARKER}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    LineTooLong { length: usize, limit: usize },
    MissingRedirectTarget(&'static str),
    TooManyArguments { limit: usize },
    MissingCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LineTooLong { length, limit } => {
                write!(f, "line too long ({length} bytes, at most {limit} allowed)")
            }
            ParseError::MissingRedirectTarget(operator) => {
                write!(f, "syntax error: expected a file name after '{operator}'")
            }
            ParseError::TooManyArguments { limit } => {
                write!(f, "too many arguments (at most {limit} allowed)")
            }
            ParseError::MissingCommand => f.write_str("syntax error: no command given"),
        }
    }
}

/// Replace every `$$` in `word` by the pid of the shell.
fn expand_pid(word: &str, shell_pid: ProcessId) -> String {
    if word.contains(PID_VARIABLE) {
        word.replace(PID_VARIABLE, &shell_pid.to_string())
    } else {
        word.to_string()
    }
}

/// Parse one line exactly as it was read from the input.
///
/// The length limit applies to the bytes read; anything that is not UTF-8 is replaced lossily
/// afterwards.
pub fn parse_input(raw: &[u8], shell_pid: ProcessId) -> Result<Command, ParseError> {
    let content = raw.strip_suffix(b"\n").unwrap_or(raw);
    let content = content.strip_suffix(b"\r").unwrap_or(content);

    if content.len() > MAX_LINE_LENGTH {
        return Err(ParseError::LineTooLong {
            length: content.len(),
            limit: MAX_LINE_LENGTH,
        });
    }

    parse_line(&String::from_utf8_lossy(content), shell_pid)
}

/// Parse one line of input into a [`Command`].
///
/// Words are separated by spaces; there is no quoting. `<` and `>` take the next word as the
/// file to redirect from or to, and a final `&` asks for the command to run in the background.
pub fn parse_line(line: &str, shell_pid: ProcessId) -> Result<Command, ParseError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.len() > MAX_LINE_LENGTH {
        return Err(ParseError::LineTooLong {
            length: line.len(),
            limit: MAX_LINE_LENGTH,
        });
    }

    if line.trim_start_matches(' ').starts_with(COMMENT_MARKER) {
        return Ok(Command::default());
    }

    let words: Vec<&str> = line.split(' ').filter(|word| !word.is_empty()).collect();
    if words.is_empty() {
        return Ok(Command::default());
    }

    let mut command = Command::default();
    let last = words.len() - 1;
    let mut words = words.into_iter().enumerate();

    while let Some((index, word)) = words.next() {
        match word {
            BACKGROUND_MARKER if index == last => command.background_requested = true,
            INPUT_REDIRECT | OUTPUT_REDIRECT => {
                let operator = if word == INPUT_REDIRECT {
                    INPUT_REDIRECT
                } else {
                    OUTPUT_REDIRECT
                };
                let Some((_, target)) = words.next() else {
                    return Err(ParseError::MissingRedirectTarget(operator));
                };
                let target = Some(PathBuf::from(expand_pid(target, shell_pid)));
                if operator == INPUT_REDIRECT {
                    command.input_redirect = target;
                } else {
                    command.output_redirect = target;
                }
            }
            _ => {
                if command.args.len() == MAX_ARGUMENTS {
                    return Err(ParseError::TooManyArguments {
                        limit: MAX_ARGUMENTS,
                    });
                }
                command.args.push(expand_pid(word, shell_pid));
            }
        }
    }

    match command.args.first() {
        Some(program) => command.program = program.clone(),
        None => return Err(ParseError::MissingCommand),
    }

    Ok(command)
}
