use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
};

use crate::{
    common::{parse_input, Error, ShellContext},
    cutils::{retry_while_interrupted, to_cstring},
    defaults::{EXIT_FATAL, PROMPT},
    exec::{launch, ChildWaiter, JobReaper, ModeController, Placement, SignalMode, SystemWaiter},
    log::{dev_debug, dev_info, user_error, ShellLogger},
    system::chdir,
};

use builtin::Builtin;
use cli::ShellAction;
use help::{long_help_message, USAGE_MSG};

mod builtin;
mod cli;
mod help;

const VERSION: &str = env!("CARGO_PKG_VERSION");

enum Flow {
    Continue,
    Exit,
}

/// The read-parse-run loop.
struct Shell<R, O, W: ChildWaiter = SystemWaiter> {
    input: R,
    output: O,
    reaper: JobReaper<W>,
    context: ShellContext,
}

impl<R: BufRead, O: Write, W: ChildWaiter> Shell<R, O, W> {
    fn new(input: R, output: O, reaper: JobReaper<W>, context: ShellContext) -> Self {
        Self {
            input,
            output,
            reaper,
            context,
        }
    }

    /// Run until `exit`, end of input or a fatal error.
    fn run(&mut self) -> Result<(), Error> {
        let mut buffer = Vec::new();

        loop {
            self.reaper.sweep_finished_background(&mut self.output);

            write!(self.output, "{PROMPT}").ok();
            self.output.flush().ok();

            buffer.clear();
            let read = retry_while_interrupted(|| self.input.read_until(b'\n', &mut buffer))?;
            if read == 0 {
                dev_info!("end of input");
                return Ok(());
            }

            match self.execute(&buffer) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => user_error!("{error}"),
            }
        }
    }

    fn execute(&mut self, line: &[u8]) -> Result<Flow, Error> {
        let command = parse_input(line, self.context.shell_pid)?;
        dev_debug!("parsed {command:?}");
        if command.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(builtin) = Builtin::from_command(&command) {
            return self.run_builtin(builtin);
        }

        let placement = Placement::decide(command.background_requested, SignalMode::current());
        let pid = launch(&command, placement.interrupt_disposition())?;
        self.reaper.dispatch(pid, placement, &mut self.output);

        Ok(Flow::Continue)
    }

    fn run_builtin(&mut self, builtin: Builtin) -> Result<Flow, Error> {
        match builtin {
            Builtin::Exit => return Ok(Flow::Exit),
            Builtin::Cd(directory) => {
                let target = match directory {
                    Some(directory) => PathBuf::from(directory),
                    None => self.context.home.clone().ok_or(Error::HomeNotSet)?,
                };
                to_cstring(&target.to_string_lossy())
                    .and_then(|path| chdir(&path))
                    .map_err(|err| Error::ChDir(target, err))?;
            }
            Builtin::Status => {
                writeln!(self.output, "{}", self.reaper.status().format()).ok();
                self.output.flush().ok();
            }
        }

        Ok(Flow::Continue)
    }
}

fn run() -> Result<(), Error> {
    let _mode = ModeController::install()?;
    let context = ShellContext::from_env();
    dev_info!("shell started with pid {}", context.shell_pid);

    let mut shell = Shell::new(
        io::stdin().lock(),
        io::stdout(),
        JobReaper::new(),
        context,
    );
    shell.run()
}

pub fn main() {
    ShellLogger::new("smallsh: ").into_global_logger();

    let action = match ShellAction::from_env() {
        Ok(action) => action,
        Err(error) => {
            eprintln_ignore_io_error!("smallsh: {error}\n{USAGE_MSG}");
            process::exit(1);
        }
    };

    match action {
        ShellAction::Help => println_ignore_io_error!("{}", long_help_message()),
        ShellAction::Version => println_ignore_io_error!("smallsh-rs {VERSION}"),
        ShellAction::Run => {
            if let Err(error) = run() {
                user_error!("{error}");
                process::exit(EXIT_FATAL);
            }
        }
    }
}
