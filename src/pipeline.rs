use crate::config::{OutputFormat, RunConfig};
use crate::error::{Error, Result};
use crate::report::{self, Report};
use crate::scan::{self, LogScanner, ScanOutput};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub struct RunOutcome {
    pub scan: ScanOutput,
    pub report: Report,
    /// Path and block count of the detail file, when one was written.
    pub detail: Option<(PathBuf, usize)>,
}

/// Parse the configured log, print the summary to `out` and write the detail file.
pub fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<RunOutcome> {
    let scanner = LogScanner::with_marker(config.max_entries, &config.marker);
    let scan = scan::parse_log_with(&config.log_path, scanner)?;
    info!(
        path = %config.log_path.display(),
        results = scan.results.len(),
        flagged = scan.flagged.len(),
        malformed = scan.errors.total,
        "parsed log"
    );

    // Directory rows go out before flagged tests are grouped, so a bad
    // flagged name still leaves the outcome summary on the console.
    let results = report::directory_rows(&scan.results, config.status_policy)?;
    if config.format == OutputFormat::Text {
        report::write_directory_rows(out, &results).map_err(Error::Output)?;
    }
    let report = Report::with_results(&scan, results)?;
    match config.format {
        OutputFormat::Text => report.render_flagged_text(out).map_err(Error::Output)?,
        OutputFormat::Json => report.render_json(out)?,
    }

    let path = config.detail_path();
    let detail = report::write_detail_file(&path, &config.detail_directory, &report, &scan.results)?
        .map(|n| (path, n));

    Ok(RunOutcome { scan, report, detail })
}
