//! Command-line argument definitions for the catastrophe clock
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::DepletionStrategy;
use crate::constants::{DEPLETION_JOB, MAX_WORKERS_LIMIT, SUBMERSION_JOB};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the catastrophe clock
///
/// Fetches public time-series data, fits a linear trend and writes the date
/// each catastrophe is expected to arrive to the result store.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "catastrophe-clock",
    version,
    about = "Estimate catastrophe arrival dates from public time-series data",
    long_about = "Fetches California reservoir storage and global sea level records, fits a \
                  least-squares trend to each and extrapolates the date a threshold is crossed: \
                  reservoirs reaching zero storage, and the sea reaching Miami's elevation. \
                  Results are upserted by name into a JSON result store."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run one catastrophe job, or all of them
    Run(RunArgs),
}

/// Which pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Job {
    /// California reservoirs running dry
    ReservoirDepletion,
    /// Sea level reaching the coastal elevation
    CoastalSubmersion,
    /// Both jobs, one after the other
    All,
}

impl Job {
    /// Jobs to execute, in order
    pub fn expand(&self) -> Vec<Job> {
        match self {
            Job::All => vec![Job::ReservoirDepletion, Job::CoastalSubmersion],
            job => vec![*job],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Job::ReservoirDepletion => DEPLETION_JOB,
            Job::CoastalSubmersion => SUBMERSION_JOB,
            Job::All => "all",
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    #[arg(value_enum, value_name = "JOB", help = "Job to run")]
    pub job: Job,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/catastrophe-clock/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Path of the JSON result store
    #[arg(
        long = "store",
        value_name = "FILE",
        help = "Path of the JSON result store"
    )]
    pub store_path: Option<PathBuf>,

    /// Upper bound on concurrent station fetches
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Maximum number of concurrent station fetches"
    )]
    pub workers: Option<usize>,

    /// How station series are combined into one depletion date
    #[arg(
        long = "strategy",
        value_enum,
        help = "Depletion strategy (aggregate or latest-per-station)"
    )]
    pub strategy: Option<DepletionStrategy>,

    /// Compute estimates without writing to the result store
    #[arg(long = "dry-run", help = "Compute estimates without writing to the store")]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the run report"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Result<Commands> {
        self.command
            .clone()
            .ok_or_else(|| Error::configuration("No command given"))
    }
}

impl RunArgs {
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }

            if workers > MAX_WORKERS_LIMIT {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_WORKERS_LIMIT
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> RunArgs {
        match Args::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(run)) => run,
            None => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let args = parse(&[
            "catastrophe-clock",
            "run",
            "reservoir-depletion",
            "--store",
            "/tmp/store.json",
            "-j",
            "4",
            "--strategy",
            "latest-per-station",
            "--dry-run",
            "-vv",
        ]);

        assert_eq!(args.job, Job::ReservoirDepletion);
        assert_eq!(args.store_path, Some(PathBuf::from("/tmp/store.json")));
        assert_eq!(args.workers, Some(4));
        assert_eq!(args.strategy, Some(DepletionStrategy::LatestPerStation));
        assert!(args.dry_run);
        assert_eq!(args.get_log_level(), "debug");
        assert_eq!(args.output_format, OutputFormat::Human);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_no_subcommand() {
        let args = Args::try_parse_from(["catastrophe-clock"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.get_command().is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["catastrophe-clock", "run", "all", "-q", "-v"]).is_err());

        let args = parse(&["catastrophe-clock", "run", "all", "-q", "--output-format", "json"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_job_expansion() {
        assert_eq!(
            Job::All.expand(),
            vec![Job::ReservoirDepletion, Job::CoastalSubmersion]
        );
        assert_eq!(Job::CoastalSubmersion.expand(), vec![Job::CoastalSubmersion]);
        assert_eq!(Job::CoastalSubmersion.name(), "coastal-submersion");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let args = parse(&["catastrophe-clock", "run", "all", "-j", "0"]);
        assert!(args.validate().is_err());
    }
}
