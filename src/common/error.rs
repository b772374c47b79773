use std::{fmt, io, path::PathBuf};

use super::command::ParseError;
use crate::exec::LaunchError;

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Launch(LaunchError),
    ChDir(PathBuf, io::Error),
    HomeNotSet,
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Launch(e) => write!(f, "{e}"),
            Error::ChDir(path, e) => write!(f, "cd: {}: {e}", path.display()),
            Error::HomeNotSet => f.write_str("cd: HOME not set"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<LaunchError> for Error {
    fn from(err: LaunchError) -> Self {
        Error::Launch(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Returns `true` if the shell cannot go on after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Launch(LaunchError::Fork(_)) | Self::Io(_))
    }
}
