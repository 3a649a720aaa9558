//! CLI command definitions and implementations.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use gitexec_core::{CommandRunner, Config, GitRepository};

pub mod completions;
pub mod exec;
pub mod git;

/// gitexec - run git commands and get typed failures.
#[derive(Parser)]
#[command(name = "gitexec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory to run in.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Path to a gitexec.toml config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds before a command is killed (overrides the config file).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a command and print its trimmed output.
    ///
    /// A single argument is split on spaces; several arguments are passed
    /// through as they are. Options for `exec` itself go before the command:
    /// everything from the first argument on belongs to the command.
    Exec {
        /// The command line, or the command and its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Output the result as JSON. Must come before the command.
        #[arg(long)]
        json: bool,
    },

    /// Print the current branch.
    Branch,

    /// Fetch from a remote.
    Fetch {
        /// Remote to fetch from.
        #[arg(default_value = "origin")]
        remote: String,
    },

    /// Checkout a branch.
    #[command(alias = "co")]
    Checkout {
        /// Branch to check out.
        branch: String,
    },

    /// Merge a branch into the current one with a merge commit.
    Merge {
        /// Branch to merge.
        branch: String,
    },

    /// List tags.
    Tags {
        /// Only print the most recent tag reachable from HEAD.
        #[arg(long)]
        latest: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Settings shared by every command.
pub struct Context {
    pub dir: PathBuf,
    pub runner: CommandRunner,
}

impl Context {
    /// Resolve the config file and CLI overrides into a runner.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        let mut runner = CommandRunner::from_config(&config);
        if let Some(secs) = cli.timeout {
            runner = runner.with_timeout(Duration::from_secs(secs));
        }

        tracing::debug!(timeout_secs = runner.timeout().as_secs(), dir = %cli.dir.display(), "cli context");

        Ok(Self {
            dir: cli.dir.clone(),
            runner,
        })
    }

    /// Open the repository containing the target directory.
    pub fn open_repo(&self) -> Result<GitRepository> {
        Ok(GitRepository::open_with(self.runner.clone(), &self.dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_exec(argv: &[&str]) -> (Vec<String>, bool) {
        match Cli::try_parse_from(argv).map(|cli| cli.command) {
            Ok(Commands::Exec { args, json }) => (args, json),
            _ => panic!("expected exec for {argv:?}"),
        }
    }

    #[test]
    fn test_exec_json_before_command() {
        let (args, json) = parse_exec(&["gitexec", "exec", "--json", "git", "status"]);
        assert!(json);
        assert_eq!(args, ["git", "status"]);
    }

    #[test]
    fn test_exec_flags_after_command_belong_to_it() {
        let (args, json) = parse_exec(&["gitexec", "exec", "git", "log", "-n", "1", "--json"]);
        assert!(!json);
        assert_eq!(args, ["git", "log", "-n", "1", "--json"]);
    }
}
