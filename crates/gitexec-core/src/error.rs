//! Error types for gitexec-core.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::outcome::CommandOutcome;
use crate::spawn::SpawnError;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A command that ran and did not succeed.
///
/// Kept as the `source` of every classified error so the raw exit code and
/// output stay available for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the command \"{command}\" failed with exit code {}", describe_exit(.outcome.exit_code))]
pub struct ProcessFailure {
    /// Command line as it was spawned.
    pub command: String,
    pub working_dir: PathBuf,
    pub outcome: CommandOutcome,
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
}

/// Errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A merge stopped on conflicts.
    #[error("automatic merge failed - fix conflicts and then commit the result")]
    MergeConflict(#[source] ProcessFailure),

    /// A branch or pathspec git doesn't know about.
    #[error("branch did not match any file(s) known to git")]
    InvalidBranch(#[source] ProcessFailure),

    /// A reference that doesn't resolve.
    #[error("not a valid git reference")]
    InvalidReference(#[source] ProcessFailure),

    /// The working directory isn't inside a git repository.
    #[error("not a git repository")]
    InvalidRepository(#[source] ProcessFailure),

    /// The remote refused the connection. The message is git's full stderr.
    #[error("{message}")]
    ConnectionRefused {
        message: String,
        source: ProcessFailure,
    },

    /// The working directory doesn't exist.
    #[error("{message}")]
    InvalidPath { message: String, source: SpawnError },

    /// A timeout, or a failure no specific rule recognised.
    #[error("{message}")]
    Process {
        message: String,
        exit_code: Option<i32>,
        source: Option<ProcessFailure>,
    },

    /// The process could not be started.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("toml error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Discriminant of [`Error`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MergeConflict,
    InvalidBranch,
    InvalidReference,
    InvalidRepository,
    ConnectionRefused,
    InvalidPath,
    Process,
    Spawn,
    Config,
}

impl ErrorKind {
    /// Stable snake-case name, as used in JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MergeConflict => "merge_conflict",
            Self::InvalidBranch => "invalid_branch",
            Self::InvalidReference => "invalid_reference",
            Self::InvalidRepository => "invalid_repository",
            Self::ConnectionRefused => "connection_refused",
            Self::InvalidPath => "invalid_path",
            Self::Process => "process",
            Self::Spawn => "spawn",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Build the error for a failure the classifier matched.
    ///
    /// Kinds that no classification rule produces fall back to
    /// [`Error::Process`].
    #[must_use]
    pub fn classified(kind: ErrorKind, failure: ProcessFailure) -> Self {
        match kind {
            ErrorKind::MergeConflict => Self::MergeConflict(failure),
            ErrorKind::InvalidBranch => Self::InvalidBranch(failure),
            ErrorKind::InvalidReference => Self::InvalidReference(failure),
            ErrorKind::InvalidRepository => Self::InvalidRepository(failure),
            ErrorKind::ConnectionRefused => Self::ConnectionRefused {
                message: failure.outcome.stderr.clone(),
                source: failure,
            },
            _ => Self::unclassified(failure),
        }
    }

    /// Generic failure carrying stderr verbatim and the exit code.
    #[must_use]
    pub fn unclassified(failure: ProcessFailure) -> Self {
        Self::Process {
            message: failure.outcome.stderr.clone(),
            exit_code: failure.outcome.exit_code,
            source: Some(failure),
        }
    }

    /// Which kind of error this is.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MergeConflict(_) => ErrorKind::MergeConflict,
            Self::InvalidBranch(_) => ErrorKind::InvalidBranch,
            Self::InvalidReference(_) => ErrorKind::InvalidReference,
            Self::InvalidRepository(_) => ErrorKind::InvalidRepository,
            Self::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::Process { .. } => ErrorKind::Process,
            Self::Spawn(_) => ErrorKind::Spawn,
            Self::Io(_) | Self::Toml(_) | Self::TomlSerialize(_) => ErrorKind::Config,
        }
    }

    /// The failed process behind this error, if it got as far as running.
    #[must_use]
    pub const fn failure(&self) -> Option<&ProcessFailure> {
        match self {
            Self::MergeConflict(f)
            | Self::InvalidBranch(f)
            | Self::InvalidReference(f)
            | Self::InvalidRepository(f)
            | Self::ConnectionRefused { source: f, .. }
            | Self::Process {
                source: Some(f), ..
            } => Some(f),
            _ => None,
        }
    }

    /// Captured outcome of the failed process.
    #[must_use]
    pub fn outcome(&self) -> Option<&CommandOutcome> {
        self.failure().map(|f| &f.outcome)
    }

    /// Exit code of the failed process.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Process { exit_code, .. } => *exit_code,
            _ => self.outcome().and_then(|o| o.exit_code),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn failure(code: i32, stderr: &str) -> ProcessFailure {
        ProcessFailure {
            command: "git fetch origin".into(),
            working_dir: "/repo".into(),
            outcome: CommandOutcome::failure(code, stderr),
        }
    }

    #[test]
    fn test_connection_refused_message_is_stderr() {
        let stderr = "fatal: unable to access 'https://x': Failed to connect to host port 443: Connection refused";
        let err = Error::classified(ErrorKind::ConnectionRefused, failure(128, stderr));
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), stderr);
        assert_eq!(err.exit_code(), Some(128));
    }

    #[test]
    fn test_classified_keeps_source() {
        let err = Error::classified(ErrorKind::InvalidBranch, failure(1, "error: pathspec"));
        let source = err.source().unwrap();
        assert_eq!(
            source.to_string(),
            "the command \"git fetch origin\" failed with exit code 1"
        );
        assert_eq!(err.outcome().unwrap().stderr, "error: pathspec");
    }

    #[test]
    fn test_unclassified_preserves_stderr_and_code() {
        let err = Error::unclassified(failure(2, "unknown flag"));
        assert_eq!(err.kind(), ErrorKind::Process);
        assert_eq!(err.to_string(), "unknown flag");
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn test_classified_falls_back_for_non_rule_kinds() {
        let err = Error::classified(ErrorKind::InvalidPath, failure(3, "boom"));
        assert_eq!(err.kind(), ErrorKind::Process);
    }

    #[test]
    fn test_signal_exit_code_display() {
        let f = ProcessFailure {
            command: "sleep 5".into(),
            working_dir: "/".into(),
            outcome: CommandOutcome::timeout(),
        };
        assert_eq!(
            f.to_string(),
            "the command \"sleep 5\" failed with exit code <signal>"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::MergeConflict.to_string(), "merge_conflict");
        assert_eq!(ErrorKind::InvalidPath.as_str(), "invalid_path");
    }
}
