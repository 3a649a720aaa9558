//! Synchronous command runner with failure classification.

use std::path::Path;
use std::time::Duration;

use crate::classify::classify;
use crate::config::Config;
use crate::error::{Error, ProcessFailure, Result};
use crate::outcome::{CommandOutcome, CommandRequest, DEFAULT_TIMEOUT};
use crate::spawn::{SpawnError, Spawner, SystemSpawner};

/// Marker in the spawn error raised for a missing working directory.
const INVALID_CWD_MARKER: &str = "The provided cwd ";

/// Runs one command at a time and maps failures to typed [`Error`]s.
///
/// Holds no per-call state; a single runner can be shared between threads
/// when its spawner allows it.
#[derive(Debug, Clone)]
pub struct CommandRunner<S = SystemSpawner> {
    spawner: S,
    timeout: Duration,
}

impl CommandRunner {
    /// Runner on real processes with the default 60 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_spawner(SystemSpawner)
    }

    /// Runner on real processes using the timeout from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_timeout(config.runner.timeout())
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spawner> CommandRunner<S> {
    /// Runner on a custom process layer.
    pub const fn with_spawner(spawner: S) -> Self {
        Self {
            spawner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the timeout applied to every command.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Run a space-separated command line and return its trimmed stdout.
    ///
    /// # Errors
    /// Returns a classified [`Error`] if the command fails, times out, or
    /// can't be started.
    pub fn execute(&self, command_line: &str, working_dir: impl AsRef<Path>) -> Result<String> {
        let outcome = self.run(command_line, working_dir)?;
        Ok(outcome.stdout.trim().to_string())
    }

    /// Run a pre-split argument vector and return its trimmed stdout.
    ///
    /// # Errors
    /// Same as [`CommandRunner::execute`].
    pub fn execute_args<I, A>(&self, args: I, working_dir: impl AsRef<Path>) -> Result<String>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let request = CommandRequest::from_args(args, working_dir.as_ref()).with_timeout(self.timeout);
        let outcome = self.run_request(&request)?;
        Ok(outcome.stdout.trim().to_string())
    }

    /// Run a space-separated command line and return the full outcome.
    ///
    /// # Errors
    /// Same as [`CommandRunner::execute`].
    pub fn run(&self, command_line: &str, working_dir: impl AsRef<Path>) -> Result<CommandOutcome> {
        let request =
            CommandRequest::parse(command_line, working_dir.as_ref()).with_timeout(self.timeout);
        self.run_request(&request)
    }

    /// Run a prepared request and return the full outcome.
    ///
    /// The request's own timeout is used as-is.
    ///
    /// # Errors
    /// Same as [`CommandRunner::execute`].
    pub fn run_request(&self, request: &CommandRequest) -> Result<CommandOutcome> {
        tracing::debug!(
            command = %request.command_line(),
            cwd = %request.working_dir().display(),
            "running command"
        );

        let result = interpret(request, self.spawner.spawn(request));

        match &result {
            Ok(outcome) => tracing::debug!(exit_code = ?outcome.exit_code, "command succeeded"),
            Err(e) => tracing::debug!(kind = %e.kind(), exit_code = ?e.exit_code(), "command failed"),
        }
        result
    }
}

/// Turn a spawn result into the runner's result.
fn interpret(
    request: &CommandRequest,
    spawned: std::result::Result<CommandOutcome, SpawnError>,
) -> Result<CommandOutcome> {
    let outcome = spawned.map_err(reclassify_spawn_error)?;

    if outcome.timed_out {
        let command = request.command_line();
        return Err(Error::Process {
            message: format!(
                "The process \"{command}\" exceeded the timeout of {} seconds.",
                request.timeout().as_secs_f64()
            ),
            exit_code: None,
            source: Some(failure(request, outcome)),
        });
    }

    if outcome.is_success() {
        return Ok(outcome);
    }

    let kind = classify(&outcome);
    let failure = failure(request, outcome);
    Err(match kind {
        Some(kind) => Error::classified(kind, failure),
        None => Error::unclassified(failure),
    })
}

fn failure(request: &CommandRequest, outcome: CommandOutcome) -> ProcessFailure {
    ProcessFailure {
        command: request.command_line(),
        working_dir: request.working_dir().to_path_buf(),
        outcome,
    }
}

/// Spawn errors about the working directory become [`Error::InvalidPath`].
/// Everything else passes through untouched.
fn reclassify_spawn_error(err: SpawnError) -> Error {
    let rewritten = match &err {
        SpawnError::Runtime(message) if message.contains(INVALID_CWD_MARKER) => {
            Some(message.replace("cwd", "working directory"))
        }
        _ => None,
    };

    match rewritten {
        Some(message) => Error::InvalidPath {
            message,
            source: err,
        },
        None => Error::Spawn(err),
    }
}
