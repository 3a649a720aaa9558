//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use gitexec_core::{Error, ErrorKind};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// A failure that has already been written out (e.g. as JSON).
///
/// Still fails the process, but [`report`] prints nothing more for it.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Reported(pub Error);

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Print a top-level failure with a hint for known error kinds.
pub fn report(err: &anyhow::Error) {
    if err.downcast_ref::<Reported>().is_some() {
        return;
    }

    error(&format!("{err:#}"));

    if let Some(hint) = err.downcast_ref::<Error>().and_then(hint_for) {
        eprintln!();
        eprintln!("{} {}", "hint:".dimmed(), hint);
    }
}

const TIMEOUT_HINT: &str = "raise the limit with --timeout if the command needs longer";

fn hint_for(err: &Error) -> Option<&'static str> {
    if err.outcome().is_some_and(|o| o.timed_out) {
        return Some(TIMEOUT_HINT);
    }
    hint(err.kind())
}

/// Suggested next step for an error kind.
#[must_use]
pub const fn hint(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::MergeConflict => {
            Some("resolve the conflicts, `git add` the files and commit, or run `git merge --abort`")
        }
        ErrorKind::InvalidBranch => Some("check the branch name with `git branch --all`"),
        ErrorKind::InvalidReference => Some("check the reference with `git show-ref`"),
        ErrorKind::InvalidRepository => {
            Some("run inside a git repository or point -C at one")
        }
        ErrorKind::ConnectionRefused => Some("check the remote URL and your network connection"),
        ErrorKind::InvalidPath => Some("the -C directory must exist"),
        ErrorKind::Process | ErrorKind::Spawn | ErrorKind::Config => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitexec_core::{CommandOutcome, ProcessFailure};

    #[test]
    fn test_every_git_kind_has_a_hint() {
        for kind in [
            ErrorKind::MergeConflict,
            ErrorKind::InvalidBranch,
            ErrorKind::InvalidReference,
            ErrorKind::InvalidRepository,
            ErrorKind::ConnectionRefused,
            ErrorKind::InvalidPath,
        ] {
            assert!(hint(kind).is_some(), "missing hint for {kind}");
        }
        assert!(hint(ErrorKind::Spawn).is_none());
    }

    #[test]
    fn test_timeout_hint() {
        let err = Error::Process {
            message: "The process \"sleep 5\" exceeded the timeout of 1 seconds.".into(),
            exit_code: None,
            source: Some(ProcessFailure {
                command: "sleep 5".into(),
                working_dir: ".".into(),
                outcome: CommandOutcome::timeout(),
            }),
        };
        assert_eq!(hint_for(&err), Some(TIMEOUT_HINT));

        let plain = Error::unclassified(ProcessFailure {
            command: "git nope".into(),
            working_dir: ".".into(),
            outcome: CommandOutcome::failure(1, "nope"),
        });
        assert_eq!(hint_for(&plain), None);
    }

    #[test]
    fn test_quiet_mode_toggle() {
        set_quiet(true);
        assert!(is_quiet());
        set_quiet(false);
        assert!(!is_quiet());
    }
}
