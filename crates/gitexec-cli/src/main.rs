//! gitexec CLI - run git commands and report typed failures.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_env("GITEXEC_LOG"))
        .init();

    let cli = Cli::parse();
    output::set_quiet(cli.quiet);

    let ctx = commands::Context::from_cli(&cli);

    let result = ctx.and_then(|ctx| match cli.command {
        Commands::Exec { args, json } => commands::exec::run(&ctx, &args, json),
        Commands::Branch => commands::git::branch(&ctx),
        Commands::Fetch { remote } => commands::git::fetch(&ctx, &remote),
        Commands::Checkout { branch } => commands::git::checkout(&ctx, &branch),
        Commands::Merge { branch } => commands::git::merge(&ctx, &branch),
        Commands::Tags { latest } => commands::git::tags(&ctx, latest),
        Commands::Completions { shell } => commands::completions::run(shell),
    });

    if let Err(e) = result {
        output::report(&e);
        std::process::exit(1);
    }
}
