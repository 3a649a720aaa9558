//! # gitexec-core
//!
//! Runs version-control commands as one-shot subprocesses and turns the
//! well-known git failure messages into typed errors.
//!
//! ```no_run
//! use gitexec_core::{CommandRunner, Error};
//!
//! let runner = CommandRunner::new();
//! match runner.execute("git checkout develop", "/srv/app") {
//!     Ok(out) => println!("{out}"),
//!     Err(Error::InvalidBranch(_)) => eprintln!("no such branch"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod classify;
pub mod config;
mod error;
mod outcome;
mod repository;
mod runner;
mod spawn;

pub use classify::{Rule, RULES, classify};
pub use config::Config;
pub use error::{Error, ErrorKind, ProcessFailure, Result};
pub use outcome::{CommandOutcome, CommandRequest, DEFAULT_TIMEOUT};
pub use repository::GitRepository;
pub use runner::CommandRunner;
pub use spawn::{SpawnError, Spawner, SystemSpawner};
