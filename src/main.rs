//! CLI entry point for the airline passenger satisfaction analysis.
//!
//! Provides subcommands for cleaning the raw survey export and for the age,
//! gender, flight distance and service-correlation analyses.

use airline_satisfaction::analyzers::analyzer::{
    run_age, run_distance, run_gender, run_report, run_service,
};
use airline_satisfaction::analyzers::correlation::select_features;
use airline_satisfaction::cleaning::clean_file;
use airline_satisfaction::config::{CleaningOptions, PathConfig};
use airline_satisfaction::output::{OutputOptions, print_json};
use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airline_satisfaction")]
#[command(about = "Clean and analyze airline passenger satisfaction survey data", long_about = None)]
struct Cli {
    /// Project root that data/ and reports/ are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw survey file into the processed file
    Clean {
        /// Raw CSV to read (default: data/raw/raw-data.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Processed CSV to write (default: data/processed/processed.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Warn when more than this fraction of rows is dropped
        #[arg(long, default_value_t = 0.05)]
        max_drop_fraction: f64,

        /// Print the cleaning report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Satisfaction by age band
    Age(AnalysisArgs),
    /// Satisfaction by gender
    Gender(AnalysisArgs),
    /// Satisfaction by flight distance band, with distance distribution
    Distance(AnalysisArgs),
    /// Correlation of service ratings with satisfaction
    Service {
        /// Service column to include (repeatable; default: all)
        #[arg(long = "feature", value_name = "NAME")]
        features: Vec<String>,

        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Run every analysis with the same options
    Report(AnalysisArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalysisArgs {
    /// Processed CSV to analyze (default: data/processed/processed.csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Open rendered charts in the system viewer
    #[arg(long, default_value_t = false)]
    show: bool,

    /// Do not write tables or charts under reports/
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Tag appended to every output file name
    #[arg(long)]
    suffix: Option<String>,

    /// Append the run time (%Y%m%d-%H%M%S) to every output file name
    #[arg(long, default_value_t = false)]
    timestamp: bool,

    /// Open saved tables and charts once written
    #[arg(long, default_value_t = false)]
    open: bool,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write tables without rendering charts
    #[arg(long, default_value_t = false)]
    tables_only: bool,
}

impl AnalysisArgs {
    fn options(&self) -> OutputOptions {
        OutputOptions {
            show: self.show,
            save: !self.no_save,
            suffix: self.suffix.clone(),
            timestamp: self.timestamp,
            open: self.open,
            json: self.json,
            charts: !self.tables_only,
        }
    }

    /// Applies `--input` and creates the report dirs when saving.
    fn paths(&self, root: &Path) -> Result<PathConfig> {
        let mut paths = PathConfig::from_root(root);
        if let Some(input) = &self.input {
            paths = paths.with_processed_path(input);
        }
        if !self.no_save {
            paths.ensure_output_dirs()?;
        }
        Ok(paths)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/airline_satisfaction.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airline_satisfaction.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output,
            max_drop_fraction,
            json,
        } => {
            let mut paths = PathConfig::from_root(&cli.root);
            if let Some(input) = input {
                paths = paths.with_raw_path(input);
            }
            if let Some(output) = output {
                paths = paths.with_processed_path(output);
            }

            let report = clean_file(&paths, &CleaningOptions { max_drop_fraction })?;
            if json {
                print_json(&report)?;
            }
        }
        Commands::Age(args) => {
            run_age(&args.paths(&cli.root)?, &args.options())?;
        }
        Commands::Gender(args) => {
            run_gender(&args.paths(&cli.root)?, &args.options())?;
        }
        Commands::Distance(args) => {
            run_distance(&args.paths(&cli.root)?, &args.options())?;
        }
        Commands::Service { features, args } => {
            let features = select_features(&features).map_err(anyhow::Error::msg)?;
            run_service(&args.paths(&cli.root)?, &args.options(), &features)?;
        }
        Commands::Report(args) => {
            let failures = run_report(&args.paths(&cli.root)?, &args.options());
            if !failures.is_empty() {
                let names: Vec<_> = failures.iter().map(|(name, _)| *name).collect();
                bail!("{} of 4 analyses failed: {}", failures.len(), names.join(", "));
            }
            info!("All analyses complete");
        }
    }

    Ok(())
}
