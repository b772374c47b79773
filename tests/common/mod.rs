#![allow(dead_code)]

use std::{
    io::{Read, Write},
    os::unix::process::CommandExt,
    process::{Child, ChildStdin, Command, ExitStatus, Stdio},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

pub type Error = Box<dyn std::error::Error>;
pub type Result<T> = core::result::Result<T, Error>;

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct Output {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Buffer filled by a thread that drains one of the shell's pipes.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn drain(&self, mut source: impl Read + Send + 'static) -> JoinHandle<()> {
        let sink = self.0.clone();
        thread::spawn(move || {
            let mut buf = [0; 1024];
            while let Ok(n @ 1..) = source.read(&mut buf) {
                sink.lock().unwrap().extend_from_slice(&buf[..n]);
            }
        })
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// A running `smallsh` that is fed one line at a time.
///
/// The shell runs in a process group of its own, so signals sent with
/// [`Session::signal_group`] reach the shell and its children only.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Capture,
    stderr: Capture,
    readers: Vec<JoinHandle<()>>,
    cursor: usize,
}

impl Session {
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {})
    }

    pub fn spawn_with(configure: impl FnOnce(&mut Command)) -> Result<Self> {
        let mut command = Command::new(env!("CARGO_BIN_EXE_smallsh"));
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);
        configure(&mut command);

        let mut child = command.spawn()?;
        let stdin = child.stdin.take();
        let (stdout, stderr) = (Capture::default(), Capture::default());
        let readers = vec![
            stdout.drain(child.stdout.take().ok_or("stdout is not piped")?),
            stderr.drain(child.stderr.take().ok_or("stderr is not piped")?),
        ];

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
            readers,
            cursor: 0,
        })
    }

    pub fn pid(&self) -> libc::pid_t {
        self.child.id() as libc::pid_t
    }

    pub fn send(&mut self, line: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or("stdin already closed")?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    /// Send `signal` to the shell only.
    pub fn signal(&self, signal: libc::c_int) -> Result<()> {
        // SAFETY: `kill` cannot cause UB.
        if unsafe { libc::kill(self.pid(), signal) } == -1 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }

    /// Send `signal` to the shell and every child it started, like a terminal would.
    pub fn signal_group(&self, signal: libc::c_int) -> Result<()> {
        // SAFETY: `kill` cannot cause UB.
        if unsafe { libc::kill(-self.pid(), signal) } == -1 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }

    /// Wait until `needle` shows up on stdout after everything matched so far, and return the
    /// output up to and including it.
    pub fn expect(&mut self, needle: &str) -> Result<String> {
        let deadline = Instant::now() + TIMEOUT;
        loop {
            let stdout = self.stdout.contents();
            if let Some(offset) = stdout[self.cursor..].find(needle) {
                let end = self.cursor + offset + needle.len();
                let seen = stdout[self.cursor..end].to_string();
                self.cursor = end;
                return Ok(seen);
            }
            if Instant::now() > deadline {
                return Err(format!("timed out waiting for {needle:?}, got {stdout:?}").into());
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Everything written to stdout so far.
    pub fn stdout(&self) -> String {
        self.stdout.contents()
    }

    /// Close stdin and wait for the shell to exit.
    ///
    /// Background jobs keep the output pipes open, so they must be done before this is called.
    pub fn finish(mut self) -> Result<Output> {
        drop(self.stdin.take());
        let status = self.child.wait()?;
        for reader in self.readers.drain(..) {
            reader.join().map_err(|_| "output reader panicked")?;
        }

        Ok(Output {
            status,
            stdout: self.stdout.contents(),
            stderr: self.stderr.contents(),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.stdin.is_some() {
            let _ = self.signal_group(libc::SIGKILL);
            let _ = self.child.wait();
        }
    }
}

/// Feed `input` to a fresh shell and collect what it printed.
pub fn run(input: impl AsRef<[u8]>) -> Result<Output> {
    run_with(input, |_| {})
}

pub fn run_with(input: impl AsRef<[u8]>, configure: impl FnOnce(&mut Command)) -> Result<Output> {
    let mut session = Session::spawn_with(configure)?;
    session
        .stdin
        .as_mut()
        .ok_or("stdin already closed")?
        .write_all(input.as_ref())?;
    session.finish()
}
