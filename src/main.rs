use anyhow::Context;
use catastrophe_clock::cli::{args::Args, commands};
use clap::{CommandFactory, Parser};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and exit cleanly
    if args.command.is_none() {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        println!();
        process::exit(0);
    }

    match run_main(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run_main(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => cancellation_token.cancel(),
                // Without a signal handler the run simply cannot be interrupted
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result.map(|_report| ()).context("Catastrophe run failed")
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                let interrupted =
                    catastrophe_clock::Error::processing_interrupted("Processing interrupted by user");
                Err(anyhow::Error::new(interrupted).context("Catastrophe run failed"))
            }
        }
    })
}
