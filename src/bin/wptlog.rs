use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wptlog::aggregate::StatusPolicy;
use wptlog::config::{self, OutputFormat, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "wptlog", version, about = "Summarize WPT mozlog runs by top-level directory")]
struct Cli {
    /// Newline-delimited JSON test log
    #[arg(default_value = config::DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Stop after this many test_end events
    #[arg(long = "max-entries")]
    max_entries: Option<usize>,

    /// Output substring that flags a test
    #[arg(long = "marker", default_value = wptlog::scan::FAILURE_MARKER)]
    marker: String,

    /// Directory whose flagged tests are written to the detail file
    #[arg(long = "detail-dir", default_value = config::DEFAULT_DETAIL_DIRECTORY)]
    detail_dir: String,

    /// Detail file path (default: <detail-dir>.txt)
    #[arg(long = "detail-output")]
    detail_output: Option<PathBuf>,

    /// Fail on statuses outside PASS/TIMEOUT/FAIL/SKIP/ERROR/OK/CRASH
    #[arg(long = "strict-status", default_value_t = false)]
    strict_status: bool,

    /// Summary format: text | json
    #[arg(long = "format", default_value = "text")]
    format: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let format = match self.format.as_str() {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => anyhow::bail!("unknown --format {other:?} (expected text or json)"),
        };
        Ok(RunConfig {
            log_path: self.log,
            max_entries: self.max_entries.unwrap_or(usize::MAX),
            marker: self.marker,
            detail_directory: self.detail_dir,
            detail_path: self.detail_output,
            status_policy: if self.strict_status { StatusPolicy::Strict } else { StatusPolicy::Widen },
            format,
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.into_config()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = wptlog::pipeline::run(&config, &mut out)
        .with_context(|| format!("failed to summarize {}", config.log_path.display()))?;
    out.flush()?;

    if let Some((path, n)) = &outcome.detail {
        tracing::info!("{n} flagged {} tests written to {}", config.detail_directory, path.display());
    }
    Ok(())
}
