//! Ordered classification of failed command outcomes.
//!
//! Each [`Rule`] pairs a predicate on `(exit code, output)` with the
//! [`ErrorKind`] it produces. [`RULES`] is evaluated top to bottom and the
//! first match wins, so the order of the table is the priority order.

use crate::error::ErrorKind;
use crate::outcome::CommandOutcome;

/// Which captured stream a rule searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stderr,
    /// stderr, then stdout.
    Either,
}

/// One classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    kind: ErrorKind,
    exit_code: Option<i32>,
    needle: &'static str,
    stream: Stream,
}

impl Rule {
    const fn new(kind: ErrorKind, exit_code: Option<i32>, needle: &'static str) -> Self {
        Self {
            kind,
            exit_code,
            needle,
            stream: Stream::Stderr,
        }
    }

    const fn in_either_stream(mut self) -> Self {
        self.stream = Stream::Either;
        self
    }

    /// The error kind this rule produces.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Substring the rule looks for.
    #[must_use]
    pub const fn needle(&self) -> &'static str {
        self.needle
    }

    /// Whether `outcome` satisfies this rule.
    #[must_use]
    pub fn matches(&self, outcome: &CommandOutcome) -> bool {
        if self.exit_code.is_some_and(|code| outcome.exit_code != Some(code)) {
            return false;
        }

        match self.stream {
            Stream::Stderr => outcome.stderr.contains(self.needle),
            Stream::Either => {
                outcome.stderr.contains(self.needle) || outcome.stdout.contains(self.needle)
            }
        }
    }
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    // git prints the conflict summary on stdout
    Rule::new(ErrorKind::MergeConflict, None, "Automatic merge failed").in_either_stream(),
    // error: pathspec 'develop' did not match any file(s) known to git
    Rule::new(
        ErrorKind::InvalidBranch,
        Some(1),
        "did not match any file(s) known to git",
    ),
    // fatal: 'refs/heads/develop' - not a valid ref
    Rule::new(ErrorKind::InvalidReference, Some(128), "not a valid ref"),
    // Case-sensitive: git itself writes "fatal:", which falls through to a
    // generic process error
    Rule::new(
        ErrorKind::InvalidRepository,
        Some(128),
        "Fatal: not a git repository",
    ),
    // fatal: unable to access '<url>': Failed to connect to <host> port 443: Connection refused
    Rule::new(ErrorKind::ConnectionRefused, Some(128), "Connection refused"),
];

/// Classify a failed outcome.
///
/// Returns `None` when no rule matches; the caller then reports a generic
/// process failure.
#[must_use]
pub fn classify(outcome: &CommandOutcome) -> Option<ErrorKind> {
    RULES
        .iter()
        .find(|rule| rule.matches(outcome))
        .map(Rule::kind)
}
