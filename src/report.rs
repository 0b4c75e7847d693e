use crate::aggregate::{self, StatusPolicy};
use crate::error::{Error, Result};
use crate::outcome::{Outcome, OutcomeCounts};
use crate::scan::{FlaggedSet, ParseErrors, ScanOutput, TestResult};
use ahash::AHashMap;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Reverse;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRow {
    pub directory: String,
    pub counts: OutcomeCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedGroup {
    pub directory: String,
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Sorted by TIMEOUT count, descending; ties keep first-seen order.
    pub results: Vec<DirectoryRow>,
    pub flagged_total: usize,
    /// Sorted by number of flagged tests, descending; ties keep first-flagged order.
    pub flagged: Vec<FlaggedGroup>,
    pub parse_errors: ParseErrors,
}

/// Directory rows sorted by TIMEOUT count, descending. The sort is stable,
/// so ties keep first-seen order.
pub fn directory_rows(results: &[TestResult], policy: StatusPolicy) -> Result<Vec<DirectoryRow>> {
    let counts = aggregate::aggregate_by_directory(results, policy)?;
    Ok(counts
        .into_iter()
        .sorted_by_key(|(_, c)| Reverse(c.get(&Outcome::Timeout)))
        .map(|(directory, counts)| DirectoryRow { directory, counts })
        .collect())
}

pub fn flagged_groups(flagged: &FlaggedSet) -> Result<Vec<FlaggedGroup>> {
    let groups = aggregate::group_flagged(flagged)?;
    Ok(groups
        .into_iter()
        .sorted_by_key(|(_, tests)| Reverse(tests.len()))
        .map(|(directory, tests)| FlaggedGroup { directory, tests })
        .collect())
}

pub fn write_directory_rows<W: Write>(w: &mut W, rows: &[DirectoryRow]) -> io::Result<()> {
    writeln!(w, "\nSorted Aggregated Test Results by Number of TIMEOUT:")?;
    for row in rows {
        writeln!(w, "{}: {}", row.directory, row.counts)?;
    }
    Ok(())
}

impl Report {
    pub fn build(scan: &ScanOutput, policy: StatusPolicy) -> Result<Self> {
        let results = directory_rows(&scan.results, policy)?;
        Self::with_results(scan, results)
    }

    /// Finish a report whose directory rows are already computed.
    pub fn with_results(scan: &ScanOutput, results: Vec<DirectoryRow>) -> Result<Self> {
        Ok(Self {
            results,
            flagged_total: scan.flagged.len(),
            flagged: flagged_groups(&scan.flagged)?,
            parse_errors: scan.errors.clone(),
        })
    }

    pub fn flagged_in(&self, directory: &str) -> Option<&FlaggedGroup> {
        self.flagged.iter().find(|g| g.directory == directory)
    }

    pub fn render_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_directory_rows(w, &self.results)?;
        self.render_flagged_text(w)
    }

    /// The part of the text summary that follows the directory rows.
    pub fn render_flagged_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "\nFlagged Tests: {}", self.flagged_total)?;
        for g in &self.flagged {
            writeln!(w, "{}: {}", g.directory, g.tests.len())?;
        }
        if self.parse_errors.total > 0 {
            writeln!(w, "\nMalformed lines skipped: {}", self.parse_errors.total)?;
        }
        Ok(())
    }

    pub fn render_json<W: Write>(&self, w: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *w, self)?;
        writeln!(w).map_err(Error::Output)?;
        Ok(())
    }
}

/// Write one block per test: its name, every captured output line, then a
/// blank line. Tests without a recorded result are skipped. Returns the
/// number of blocks written.
pub fn write_detail<W: Write>(w: &mut W, tests: &[String], results: &[TestResult]) -> io::Result<usize> {
    // later test_end events for the same name replace earlier ones
    let by_name: AHashMap<&str, &TestResult> = results.iter().map(|r| (r.test_name.as_str(), r)).collect();
    let mut written = 0;
    for test in tests {
        let Some(result) = by_name.get(test.as_str()) else {
            warn!(test = %test, "flagged test has no test_end; omitted from detail file");
            continue;
        };
        writeln!(w, "{}", result.test_name)?;
        for output in &result.process_outputs {
            writeln!(w, "{}", output.data)?;
        }
        writeln!(w)?;
        written += 1;
    }
    Ok(written)
}

/// Dump the flagged tests of `directory` to `path`. Nothing is written when
/// the directory has no flagged tests.
pub fn write_detail_file(path: &Path, directory: &str, report: &Report, results: &[TestResult]) -> Result<Option<usize>> {
    let Some(group) = report.flagged_in(directory) else { return Ok(None) };
    let f = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = BufWriter::new(f);
    let written = write_detail(&mut w, &group.tests, results).map_err(|e| Error::io(path, e))?;
    w.flush().map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), tests = written, "wrote detail file");
    Ok(Some(written))
}
