//! Process spawning capability.
//!
//! The runner never touches `std::process` directly; it goes through the
//! [`Spawner`] trait so classification can be tested with fabricated
//! outcomes, and so callers can swap in their own process layer.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::outcome::{CommandOutcome, CommandRequest};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for output pipes to close after a timeout kill.
///
/// Grandchildren (e.g. `git-remote-https`) can keep the pipes open after the
/// direct child is gone. The same holds for a child that exits in time: its
/// output is only waited for until the request's deadline.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Errors raised before a process produced an outcome.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The process layer refused to start the command.
    #[error("{0}")]
    Runtime(String),

    /// The OS failed to start or wait for the process.
    #[error("failed to run process: {0}")]
    Io(#[from] io::Error),
}

/// Capability to run one command to completion or timeout.
///
/// Implementations capture stdout and stderr in full and report a timeout
/// through [`CommandOutcome::timed_out`] rather than as an error.
pub trait Spawner {
    /// Run `request` and report what happened.
    ///
    /// # Errors
    /// Returns [`SpawnError`] if the process could not be started.
    fn spawn(&self, request: &CommandRequest) -> Result<CommandOutcome, SpawnError>;
}

impl<T: Spawner + ?Sized> Spawner for &T {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandOutcome, SpawnError> {
        (**self).spawn(request)
    }
}

/// [`Spawner`] backed by `std::process`.
///
/// Inherits the parent environment, gives the child a null stdin, and kills
/// it once the request's timeout elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandOutcome, SpawnError> {
        let cwd = request.working_dir();
        if !cwd.is_dir() {
            return Err(SpawnError::Runtime(format!(
                "The provided cwd \"{}\" does not exist.",
                cwd.display()
            )));
        }

        let (program, args) = request
            .argv()
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + request.timeout();
        let (status, mut timed_out) = loop {
            if let Some(status) = child.try_wait()? {
                break (status, false);
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    command = %request.command_line(),
                    timeout = ?request.timeout(),
                    "command timed out, killing"
                );
                // The child may have exited between the poll and the kill
                if let Err(e) = child.kill() {
                    tracing::debug!("kill after timeout failed: {e}");
                }
                break (child.wait()?, true);
            }
            thread::sleep(POLL_INTERVAL);
        };

        // Reading the pipes shares the command's deadline
        let drain_deadline = if timed_out {
            Instant::now() + DRAIN_GRACE
        } else {
            deadline
        };
        let stdout = collect(&stdout, drain_deadline);
        let stderr = collect(&stderr, drain_deadline);

        if !timed_out && (stdout.is_none() || stderr.is_none()) {
            tracing::warn!(
                command = %request.command_line(),
                timeout = ?request.timeout(),
                "command exited but its output stayed open past the timeout"
            );
            timed_out = true;
        }

        Ok(CommandOutcome {
            exit_code: status.code(),
            stdout: stdout.unwrap_or_default(),
            stderr: stderr.unwrap_or_default(),
            timed_out,
        })
    }
}

/// Read a pipe to its end on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                tracing::debug!("failed reading process output: {e}");
            }
        }
        // Receiver is gone if the caller stopped waiting
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Wait for a drained pipe until `deadline`; `None` if it's still open.
fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        .ok()
}
