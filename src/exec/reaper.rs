use std::{collections::BTreeSet, io::Write};

use super::{Placement, StatusTracker, TerminationStatus};
use crate::{
    cutils::was_interrupted,
    log::{dev_info, dev_warn},
    system::{
        interface::ProcessId,
        wait::{Wait, WaitError, WaitOptions, WaitStatus},
    },
};

/// Source of child state changes. [`SystemWaiter`] asks the OS; tests script the answers.
pub trait ChildWaiter {
    fn wait(
        &mut self,
        pid: ProcessId,
        options: WaitOptions,
    ) -> Result<(ProcessId, WaitStatus), WaitError>;
}

/// Waits for children with `waitpid`.
#[derive(Debug, Default)]
pub struct SystemWaiter;

impl ChildWaiter for SystemWaiter {
    fn wait(
        &mut self,
        pid: ProcessId,
        options: WaitOptions,
    ) -> Result<(ProcessId, WaitStatus), WaitError> {
        pid.wait(options)
    }
}

/// Reaps launched commands and remembers how the last one ended.
///
/// Foreground commands are waited for as soon as they are dispatched. Background commands are
/// collected by [`JobReaper::sweep_finished_background`], which the shell runs before every
/// prompt.
pub struct JobReaper<W: ChildWaiter = SystemWaiter> {
    waiter: W,
    background: BTreeSet<ProcessId>,
    status: StatusTracker,
}

impl JobReaper {
    pub fn new() -> Self {
        Self::with_waiter(SystemWaiter)
    }
}

impl Default for JobReaper {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ChildWaiter> JobReaper<W> {
    pub fn with_waiter(waiter: W) -> Self {
        Self {
            waiter,
            background: BTreeSet::new(),
            status: StatusTracker::default(),
        }
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Background commands that have not been reaped yet.
    #[cfg(test)]
    pub fn background_jobs(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.background.iter().copied()
    }

    fn wait(
        &mut self,
        pid: ProcessId,
        options: WaitOptions,
    ) -> Result<(ProcessId, WaitStatus), WaitError> {
        loop {
            match self.waiter.wait(pid, options) {
                Err(WaitError::Io(err)) if was_interrupted(&err) => {}
                result => return result,
            }
        }
    }

    fn record(&mut self, pid: ProcessId, status: WaitStatus) -> Option<TerminationStatus> {
        let status = TerminationStatus::from_wait_status(status);
        match status {
            Some(status) => {
                dev_info!("process {pid} ended: {status}");
                self.status.record(status);
            }
            None => dev_warn!("process {pid} changed state without terminating"),
        }
        status
    }

    /// Hand a freshly launched command over to the reaper.
    ///
    /// A foreground command is waited for before this returns. For a background command the
    /// pid is announced on `out` and tracked until a sweep reaps it.
    pub fn dispatch(&mut self, pid: ProcessId, placement: Placement, out: &mut impl Write) {
        match placement {
            Placement::Foreground => match self.wait(pid, WaitOptions::new()) {
                Ok((pid, status)) => {
                    self.record(pid, status);
                }
                Err(err) => dev_warn!("cannot wait for foreground process {pid}: {err:?}"),
            },
            Placement::Background => {
                writeln!(out, "background pid is {pid}").ok();

                match self.wait(pid, WaitOptions::new().no_hang()) {
                    Ok((pid, status)) => {
                        // gone before it could be tracked, no sweep will ever see it
                        if let Some(status) = self.record(pid, status) {
                            writeln!(out, "background pid {pid} is done: {status}").ok();
                        }
                    }
                    Err(WaitError::NotReady) => {
                        self.background.insert(pid);
                    }
                    Err(err) => dev_warn!("cannot poll background process {pid}: {err:?}"),
                }

                out.flush().ok();
            }
        }
    }

    /// Reap every child that has terminated since the last sweep without blocking.
    ///
    /// Each reaped child is announced on `out` once and becomes the last recorded status.
    pub fn sweep_finished_background(
        &mut self,
        out: &mut impl Write,
    ) -> Vec<(ProcessId, TerminationStatus)> {
        let mut finished = Vec::new();

        loop {
            let (pid, status) = match self.wait(ProcessId::ANY_CHILD, WaitOptions::new().no_hang())
            {
                Ok(reaped) => reaped,
                Err(WaitError::NotReady) => break,
                Err(err) if err.is_no_child() => break,
                Err(err) => {
                    dev_warn!("cannot collect finished processes: {err:?}");
                    break;
                }
            };

            if !self.background.remove(&pid) {
                dev_warn!("reaped process {pid} that was not running in the background");
            }

            if let Some(status) = self.record(pid, status) {
                writeln!(out, "background pid {pid} is done: {status}").ok();
                finished.push((pid, status));
            }
        }

        out.flush().ok();
        finished
    }
}
