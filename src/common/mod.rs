#![forbid(unsafe_code)]

pub use command::{parse_input, Command};
pub use context::ShellContext;
pub use error::Error;

pub mod command;
pub mod context;
pub mod error;
