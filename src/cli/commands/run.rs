//! The `run` command
//!
//! Builds the HTTP source and result sink from configuration, runs the
//! requested jobs in order and prints a report. The first failing job fails
//! the whole run.

use super::shared::{load_configuration, setup_logging};
use crate::app::services::pipeline::{DepletionOutcome, Pipeline, SubmersionOutcome};
use crate::app::services::result_sink::{JsonFileSink, MemorySink, ResultSink};
use crate::app::services::source_fetcher::{HttpTextSource, TextSource};
use crate::cli::args::{Job, OutputFormat, RunArgs};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of one job
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "job", rename_all = "kebab-case")]
pub enum JobReport {
    ReservoirDepletion(DepletionOutcome),
    CoastalSubmersion(SubmersionOutcome),
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Store written to, `None` on a dry run
    pub store: Option<PathBuf>,
    pub jobs: Vec<JobReport>,
    pub elapsed_secs: f64,
}

/// Execute the `run` command
pub async fn run_jobs(args: RunArgs, cancellation_token: CancellationToken) -> Result<RunReport> {
    setup_logging(&args)?;
    let config = load_configuration(&args)?;

    let store_path = config.store.path.clone();
    let sink: Arc<dyn ResultSink> = if args.dry_run {
        info!("Dry run: results will not be written to {}", store_path.display());
        Arc::new(MemorySink::new())
    } else {
        Arc::new(JsonFileSink::new(&store_path))
    };

    let source = Arc::new(HttpTextSource::new(&config.fetch)?);
    let pipeline = Pipeline::new(source, config, sink)
        .with_progress(args.show_progress())
        .with_cancellation(cancellation_token);

    let report = execute(&pipeline, args.job, Utc::now(), args.dry_run, store_path).await?;
    print_report(&report, args.output_format)?;

    Ok(report)
}

/// Run `job` (expanded) against `pipeline` as of `now`
pub async fn execute<S: TextSource + 'static>(
    pipeline: &Pipeline<S>,
    job: Job,
    now: DateTime<Utc>,
    dry_run: bool,
    store_path: PathBuf,
) -> Result<RunReport> {
    let start_time = Instant::now();
    let mut jobs = Vec::new();

    for job in job.expand() {
        info!("Starting job {}", job.name());
        let report = match job {
            Job::ReservoirDepletion => {
                JobReport::ReservoirDepletion(pipeline.run_depletion(now).await?)
            }
            Job::CoastalSubmersion => {
                JobReport::CoastalSubmersion(pipeline.run_submersion(now).await?)
            }
            Job::All => {
                return Err(Error::configuration("job 'all' cannot be run directly"));
            }
        };
        jobs.push(report);
    }

    Ok(RunReport {
        run_at: now,
        dry_run,
        store: (!dry_run).then_some(store_path),
        jobs,
        elapsed_secs: start_time.elapsed().as_secs_f64(),
    })
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => print_human_report(report),
    }
    Ok(())
}

fn print_human_report(report: &RunReport) {
    println!("\n{}", "Catastrophe Clock".bright_green().bold());

    for job in &report.jobs {
        match job {
            JobReport::ReservoirDepletion(outcome) => {
                println!(
                    "\n{} ({} strategy)",
                    outcome.catastrophe_name.bright_white().bold(),
                    outcome.strategy
                );
                println!(
                    "  Stations: {} fetched of {} discovered",
                    outcome.stations_fetched.to_string().bright_white().bold(),
                    outcome.stations_discovered
                );
                if !outcome.failures.is_empty() {
                    println!(
                        "  Failed:   {}",
                        outcome.failures.len().to_string().bright_red().bold()
                    );
                }
                if let Some(line) = &outcome.aggregate_line {
                    println!("  Trend:    {:.1} AF/day", line.rate);
                }
                for crossing in &outcome.crossings {
                    let note = if crossing.already_crossed {
                        "already crossed".yellow()
                    } else {
                        "future".normal()
                    };
                    println!(
                        "    {} ({}): {} [{}]",
                        crossing.name, crossing.station_id, crossing.crossing_date, note
                    );
                }
                print_arrival(outcome.arrival_date, report.dry_run, outcome.upsert.created());
            }
            JobReport::CoastalSubmersion(outcome) => {
                println!("\n{}", outcome.catastrophe_name.bright_white().bold());
                println!(
                    "  Points:   {}",
                    outcome.points.to_string().bright_white().bold()
                );
                println!(
                    "  Trend:    {:.3} mm/yr to {} mm (decimal year {})",
                    outcome.line.rate, outcome.elevation_mm, outcome.crossing_year
                );
                println!(
                    "  Check:    {} (years from now)",
                    outcome.cross_check_date.date_naive()
                );
                print_arrival(outcome.arrival_date, report.dry_run, outcome.upsert.created());
            }
        }
    }

    match &report.store {
        Some(path) => println!("\nStore: {}", path.display()),
        None => println!("\n{}", "Dry run: nothing written".yellow()),
    }
    println!("Elapsed: {:.1}s", report.elapsed_secs);
}

fn print_arrival(arrival: DateTime<Utc>, dry_run: bool, created: bool) {
    let action = match (dry_run, created) {
        (true, _) => "computed",
        (false, true) => "created",
        (false, false) => "updated",
    };
    println!(
        "  Arrival:  {} ({})",
        arrival.date_naive().to_string().bright_green().bold(),
        action
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::source_fetcher::tests::MockTextSource;
    use crate::app::services::text_parser::tests::sea_level_line;
    use crate::config::Config;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_execute_submersion_dry_run() {
        let config = Config::default();
        let mut payload = "HDR header\n".to_string();
        payload.push_str(&sea_level_line(1993.0, 1400.0));
        payload.push_str(&sea_level_line(1995.0, 1408.0));
        let mock = MockTextSource::new().with_document(config.sources.sea_level_url.clone(), payload);
        let sink = Arc::new(MemorySink::new());
        let pipeline = Pipeline::new(Arc::new(mock), config, sink.clone());
        let now = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

        let report = execute(&pipeline, Job::CoastalSubmersion, now, true, PathBuf::from("x.json"))
            .await
            .unwrap();

        assert!(report.store.is_none());
        assert_eq!(report.jobs.len(), 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["jobs"][0]["job"], "coastal-submersion");
        assert_eq!(json["jobs"][0]["upsert"], "created");
    }

    #[tokio::test]
    async fn test_execute_all_stops_at_first_failure() {
        let config = Config::default();
        let sea_level_url = config.sources.sea_level_url.clone();
        let mock = Arc::new(
            MockTextSource::new()
                .with_document(config.sources.reservoir_listing_url.clone(), "<table></table>"),
        );
        let sink = Arc::new(MemorySink::new());
        let pipeline = Pipeline::new(mock.clone(), config, sink.clone());
        let now = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();

        let result = execute(&pipeline, Job::All, now, false, PathBuf::from("x.json")).await;

        assert!(matches!(result, Err(Error::NoUsableData { .. })));
        assert!(sink.list().unwrap().is_empty());
        assert!(!mock.requests().contains(&sea_level_url));
    }
}
