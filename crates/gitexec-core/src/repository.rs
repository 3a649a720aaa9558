//! Git repository wrapper built on the command runner.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use crate::spawn::{Spawner, SystemSpawner};

/// High-level git operations run through the `git` executable.
///
/// Every operation is a single git invocation in the repository's working
/// directory; failures surface as the runner's classified errors.
pub struct GitRepository<S = SystemSpawner> {
    runner: CommandRunner<S>,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if `path` doesn't exist. Outside a
    /// repository git exits 128 with a lowercase `fatal:` message, which
    /// surfaces as [`Error::Process`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(CommandRunner::new(), path)
    }
}

impl<S: Spawner> GitRepository<S> {
    /// Open the repository containing `path` using a specific runner.
    ///
    /// # Errors
    /// Same as [`GitRepository::open`].
    pub fn open_with(runner: CommandRunner<S>, path: impl AsRef<Path>) -> Result<Self> {
        let toplevel = runner.execute("git rev-parse --show-toplevel", path.as_ref())?;
        Ok(Self {
            runner,
            workdir: PathBuf::from(toplevel),
        })
    }

    /// Wrap a known working directory without asking git about it.
    pub fn at(runner: CommandRunner<S>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[must_use]
    pub const fn runner(&self) -> &CommandRunner<S> {
        &self.runner
    }

    /// Run a git command line in the workdir.
    fn git(&self, command_line: &str) -> Result<String> {
        self.runner.execute(command_line, &self.workdir)
    }

    // === Branch operations ===

    /// Get the name of the current branch (`HEAD` when detached).
    ///
    /// # Errors
    /// Returns error if git fails.
    pub fn current_branch(&self) -> Result<String> {
        self.git("git rev-parse --abbrev-ref HEAD")
    }

    /// Checkout a branch.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranch`] if git doesn't know the branch.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&format!("git checkout {branch}"))?;
        Ok(())
    }

    /// Merge `branch` into the current branch, always creating a merge commit.
    ///
    /// # Errors
    /// Returns [`Error::MergeConflict`] if the merge stops on conflicts.
    pub fn merge_no_ff(&self, branch: &str) -> Result<()> {
        self.git(&format!("git merge --no-ff --no-edit {branch}"))?;
        Ok(())
    }

    /// Resolve a full reference (e.g. `refs/heads/main`) to its commit SHA.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] if the reference doesn't exist.
    pub fn ref_commit(&self, reference: &str) -> Result<String> {
        let output = self.git(&format!("git show-ref --verify {reference}"))?;
        output
            .split_whitespace()
            .next()
            .map(String::from)
            .ok_or_else(|| Error::Process {
                message: format!("git show-ref printed nothing for {reference}"),
                exit_code: Some(0),
                source: None,
            })
    }

    // === Working directory state ===

    /// Check if the working directory is clean.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.git("git status --porcelain")?.is_empty())
    }

    // === Remote operations ===

    /// Fetch from a remote.
    ///
    /// # Errors
    /// Returns [`Error::ConnectionRefused`] if the remote is unreachable.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.git(&format!("git fetch {remote}"))?;
        Ok(())
    }

    /// Pull a branch from a remote into the current branch.
    ///
    /// # Errors
    /// Returns error if the pull fails, including merge conflicts.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&format!("git pull {remote} {branch}"))?;
        Ok(())
    }

    /// Push a branch to a remote.
    ///
    /// # Errors
    /// Returns error if the push fails.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&format!("git push {remote} {branch}"))?;
        Ok(())
    }

    // === Tags ===

    /// List all tags.
    ///
    /// # Errors
    /// Returns error if git fails.
    pub fn tags(&self) -> Result<Vec<String>> {
        let output = self.git("git tag --list")?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Most recent tag reachable from HEAD.
    ///
    /// # Errors
    /// Returns error if there are no tags.
    pub fn latest_tag(&self) -> Result<String> {
        self.git("git describe --tags --abbrev=0")
    }

    /// Create an annotated tag at HEAD.
    ///
    /// # Errors
    /// Returns error if the tag exists or git fails.
    pub fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        self.runner
            .execute_args(["git", "tag", "-a", name, "-m", message], &self.workdir)?;
        Ok(())
    }
}

impl<S> std::fmt::Debug for GitRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::ErrorKind;
    use crate::outcome::{CommandOutcome, CommandRequest};
    use crate::spawn::SpawnError;

    /// Spawner replaying scripted outcomes in order.
    #[derive(Default)]
    struct ScriptedSpawner {
        outcomes: RefCell<VecDeque<CommandOutcome>>,
        commands: RefCell<Vec<String>>,
        argv_lens: RefCell<Vec<usize>>,
    }

    impl ScriptedSpawner {
        fn then(self, outcome: CommandOutcome) -> Self {
            self.outcomes.borrow_mut().push_back(outcome);
            self
        }
    }

    impl Spawner for ScriptedSpawner {
        fn spawn(&self, request: &CommandRequest) -> std::result::Result<CommandOutcome, SpawnError> {
            self.commands.borrow_mut().push(request.command_line());
            self.argv_lens.borrow_mut().push(request.argv().len());
            Ok(self
                .outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| CommandOutcome::success("")))
        }
    }

    fn repo(spawner: ScriptedSpawner) -> GitRepository<ScriptedSpawner> {
        GitRepository::at(CommandRunner::with_spawner(spawner), "/repo")
    }

    fn commands(repo: &GitRepository<ScriptedSpawner>) -> Vec<String> {
        repo.runner().spawner().commands.borrow().clone()
    }

    #[test]
    fn test_open_uses_toplevel() {
        let spawner = ScriptedSpawner::default().then(CommandOutcome::success("/srv/app\n"));
        let repo = GitRepository::open_with(CommandRunner::with_spawner(spawner), "/srv/app/src").unwrap();
        assert_eq!(repo.workdir(), Path::new("/srv/app"));
        assert_eq!(commands(&repo), ["git rev-parse --show-toplevel"]);
    }

    #[test]
    fn test_open_outside_repository() {
        let stderr = "fatal: not a git repository (or any of the parent directories): .git";
        let spawner = ScriptedSpawner::default().then(CommandOutcome::failure(128, stderr));
        let err = GitRepository::open_with(CommandRunner::with_spawner(spawner), "/tmp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Process);
        assert_eq!(err.exit_code(), Some(128));
        assert_eq!(err.to_string(), stderr);
    }

    #[test]
    fn test_open_invalid_repository_message() {
        let spawner = ScriptedSpawner::default().then(CommandOutcome::failure(
            128,
            "Fatal: not a git repository (or any of the parent directories): .git",
        ));
        let err = GitRepository::open_with(CommandRunner::with_spawner(spawner), "/tmp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRepository);
    }

    #[test]
    fn test_current_branch() {
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::success("develop\n")));
        assert_eq!(repo.current_branch().unwrap(), "develop");
    }

    #[test]
    fn test_command_lines() {
        let repo = repo(ScriptedSpawner::default());
        repo.fetch("origin").unwrap();
        repo.checkout("develop").unwrap();
        repo.merge_no_ff("feature/x").unwrap();
        repo.pull("origin", "main").unwrap();
        repo.push("origin", "main").unwrap();

        assert_eq!(
            commands(&repo),
            [
                "git fetch origin",
                "git checkout develop",
                "git merge --no-ff --no-edit feature/x",
                "git pull origin main",
                "git push origin main",
            ]
        );
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::failure(
            1,
            "error: pathspec 'nope' did not match any file(s) known to git",
        )));
        assert!(matches!(repo.checkout("nope"), Err(Error::InvalidBranch(_))));
    }

    #[test]
    fn test_merge_conflict() {
        let repo = repo(ScriptedSpawner::default().then(
            CommandOutcome::failure(1, "")
                .with_stdout("Automatic merge failed; fix conflicts and then commit the result."),
        ));
        assert!(matches!(
            repo.merge_no_ff("feature"),
            Err(Error::MergeConflict(_))
        ));
    }

    #[test]
    fn test_ref_commit() {
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::success(
            "3f1c2ab9d0e4 refs/heads/main\n",
        )));
        assert_eq!(repo.ref_commit("refs/heads/main").unwrap(), "3f1c2ab9d0e4");
    }

    #[test]
    fn test_ref_commit_invalid() {
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::failure(
            128,
            "fatal: 'refs/heads/nope' - not a valid ref",
        )));
        let err = repo.ref_commit("refs/heads/nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
    }

    #[test]
    fn test_is_clean() {
        let repo = repo(
            ScriptedSpawner::default()
                .then(CommandOutcome::success(""))
                .then(CommandOutcome::success("?? new.txt\n")),
        );
        assert!(repo.is_clean().unwrap());
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_tags() {
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::success("v1.0.0\nv1.1.0\n")));
        assert_eq!(repo.tags().unwrap(), ["v1.0.0", "v1.1.0"]);
    }

    #[test]
    fn test_create_tag_keeps_message_whole() {
        let repo = repo(ScriptedSpawner::default());
        repo.create_tag("v2.0.0", "second release").unwrap();
        assert_eq!(commands(&repo), ["git tag -a v2.0.0 -m second release"]);
        assert_eq!(*repo.runner().spawner().argv_lens.borrow(), [6]);
    }

    #[test]
    fn test_fetch_connection_refused() {
        let stderr = "fatal: unable to access 'https://x': Failed to connect to host port 443: Connection refused";
        let repo = repo(ScriptedSpawner::default().then(CommandOutcome::failure(128, stderr)));
        let err = repo.fetch("origin").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), stderr);
    }
}
