//! Thin commands over common git operations.

use anyhow::Result;

use super::Context;
use crate::output;

/// `gitexec branch` - print the current branch.
pub fn branch(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repo()?;
    output::essential(&repo.current_branch()?);
    Ok(())
}

/// `gitexec fetch` - fetch from a remote.
pub fn fetch(ctx: &Context, remote: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    output::info(&format!("Fetching {remote}..."));
    repo.fetch(remote)?;
    output::success(&format!("Fetched {remote}"));
    Ok(())
}

/// `gitexec checkout` - switch to a branch.
pub fn checkout(ctx: &Context, branch: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    repo.checkout(branch)?;
    output::success(&format!("Checked out {branch}"));
    Ok(())
}

/// `gitexec merge` - merge a branch with `--no-ff`.
pub fn merge(ctx: &Context, branch: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    let current = repo.current_branch()?;
    repo.merge_no_ff(branch)?;
    output::success(&format!("Merged {branch} into {current}"));
    Ok(())
}

/// `gitexec tags` - list tags.
pub fn tags(ctx: &Context, latest: bool) -> Result<()> {
    let repo = ctx.open_repo()?;

    if latest {
        output::essential(&repo.latest_tag()?);
        return Ok(());
    }

    let tags = repo.tags()?;
    if tags.is_empty() {
        output::info("No tags yet.");
    }
    for tag in tags {
        output::essential(&tag);
    }
    Ok(())
}
