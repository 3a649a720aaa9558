//! Request and outcome types for a single command invocation.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout applied when the caller doesn't configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One command to run: its argument vector, where to run it, and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    argv: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
}

impl CommandRequest {
    /// Build a request from a command line split on single spaces.
    ///
    /// There is no quoting support: `"git commit -m a b"` yields five
    /// arguments, and consecutive spaces yield empty arguments.
    #[must_use]
    pub fn parse(command_line: &str, working_dir: impl Into<PathBuf>) -> Self {
        Self::from_args(command_line.split(' '), working_dir)
    }

    /// Build a request from an already split argument vector.
    #[must_use]
    pub fn from_args<I, S>(args: I, working_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: args.into_iter().map(Into::into).collect(),
            working_dir: working_dir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument vector, executable first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The executable, if the argument vector isn't empty.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The argument vector joined back with single spaces.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// Everything captured from a finished (or killed) process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, or `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The process was killed because it ran past its timeout.
    pub timed_out: bool,
}

impl CommandOutcome {
    /// Outcome of a process that exited 0.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Outcome of a process that exited with `code` and wrote `stderr`.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Outcome of a process killed at its deadline.
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    /// Attach stdout to an outcome.
    #[must_use]
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Exited normally with code 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}
