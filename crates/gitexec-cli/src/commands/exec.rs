//! `gitexec exec` command - Run an arbitrary command line.

use anyhow::Result;
use gitexec_core::{Error, ErrorKind};
use serde::Serialize;

use super::Context;
use crate::output;

/// JSON output for the exec command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ExecOutput {
    Success {
        ok: bool,
        stdout: String,
    },
    Failure {
        ok: bool,
        kind: ErrorKind,
        message: String,
        exit_code: Option<i32>,
    },
}

impl ExecOutput {
    const fn success(stdout: String) -> Self {
        Self::Success { ok: true, stdout }
    }

    fn failure(err: &Error) -> Self {
        Self::Failure {
            ok: false,
            kind: err.kind(),
            message: err.to_string(),
            exit_code: err.exit_code(),
        }
    }
}

/// Run the exec command.
pub fn run(ctx: &Context, args: &[String], json: bool) -> Result<()> {
    let result = match args {
        [line] => ctx.runner.execute(line, &ctx.dir),
        _ => ctx.runner.execute_args(args.iter().cloned(), &ctx.dir),
    };

    if !json {
        let stdout = result?;
        if !stdout.is_empty() {
            output::essential(&stdout);
        }
        return Ok(());
    }

    match result {
        Ok(stdout) => print_json(&ExecOutput::success(stdout)),
        Err(e) => {
            print_json(&ExecOutput::failure(&e))?;
            Err(output::Reported(e).into())
        }
    }
}

fn print_json(out: &ExecOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(out)?);
    Ok(())
}
