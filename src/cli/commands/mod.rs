//! Command implementations for the catastrophe clock CLI
//!
//! - `run`: execute one or all catastrophe jobs and report the results
//! - `shared`: logging and configuration helpers

pub mod run;
pub mod shared;

pub use run::{JobReport, RunReport};

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Dispatches to the subcommand handler; `cancellation_token` is cancelled on
/// Ctrl-C so in-flight station fetches stop taking new work.
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<RunReport> {
    match args.get_command()? {
        Commands::Run(run_args) => run::run_jobs(run_args, cancellation_token).await,
    }
}
