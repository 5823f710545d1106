use std::{fs, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use csv2po::{Orchestrator, SyncReport};
use csv2po_cli::{ConsoleObserver, ConvertArgs, HttpFetcher, SiteResolver};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a translation table into one PO catalog per language.
    Convert(ConvertArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}

fn write_report(report: &SyncReport, path: &std::path::Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("unable to serialize the report: {}", e))?;
    fs::write(path, json).map_err(|e| format!("unable to write {}: {}", path.display(), e))
}

fn convert(args: ConvertArgs) -> ExitCode {
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    let fetcher = match HttpFetcher::new(FETCH_TIMEOUT) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = Orchestrator::builder(SiteResolver::new(&args.root, args.active_theme.clone()))
        .with_fetcher(fetcher)
        .with_observer(ConsoleObserver { quiet: args.quiet })
        .build();

    // Fatal errors were already reported by the observer.
    let Ok(report) = orchestrator.run(&config) else {
        return ExitCode::FAILURE;
    };

    if let Some(path) = &args.report_json {
        if let Err(e) = write_report(&report, path) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match args.commands {
        Commands::Convert(convert_args) => {
            init_tracing(convert_args.verbose);
            convert(convert_args)
        }
    }
}
