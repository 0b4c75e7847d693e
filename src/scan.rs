use crate::error::{Error, Result};
use crate::event::{self, Action, EventError, OutputEvent};
use indexmap::IndexSet;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Substring in captured output that flags a test.
pub const FAILURE_MARKER: &str = "VERIFICATION FAILED";

const MAX_ERROR_SAMPLES: usize = 10;

/// Aggregated record for one `test_end` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub test_name: String,
    pub status: String,
    pub process_outputs: Vec<OutputEvent>,
}

/// Flagged test names in the order they were first flagged.
pub type FlaggedSet = IndexSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSample {
    pub line_number: usize,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseErrors {
    pub total: usize,
    pub samples: Vec<ErrorSample>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub results: Vec<TestResult>,
    pub flagged: FlaggedSet,
    pub errors: ParseErrors,
}

/// Line-at-a-time reconstruction of test results from a mozlog-style event stream.
///
/// Output events are attributed to the most recently started test. The
/// accumulated output is reset only by `test_start`, so a `test_end` takes a
/// snapshot of whatever has been collected since then.
pub struct LogScanner {
    marker: String,
    max_entries: usize,
    entries: usize,
    line_number: usize,
    current_test: Option<String>,
    outputs: Vec<OutputEvent>,
    out: ScanOutput,
}

impl LogScanner {
    pub fn new(max_entries: usize) -> Self {
        Self::with_marker(max_entries, FAILURE_MARKER)
    }

    pub fn with_marker(max_entries: usize, marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            max_entries,
            entries: 0,
            line_number: 0,
            current_test: None,
            outputs: Vec::new(),
            out: ScanOutput::default(),
        }
    }

    /// True once `max_entries` test results have been produced.
    pub fn is_done(&self) -> bool {
        self.entries >= self.max_entries
    }

    /// Feed one line. Returns false when the cap is reached and no further
    /// lines should be read; lines pushed after that point are ignored.
    pub fn push_line(&mut self, line: &str) -> bool {
        if self.is_done() { return false; }
        self.line_number += 1;

        let ev = match event::parse_event(line) {
            Ok(ev) => ev,
            Err(e) => {
                self.record_error(e);
                return true;
            }
        };

        match ev.action {
            Action::TestStart => {
                self.current_test = ev.test;
                self.outputs.clear();
            }
            Action::ProcessOutput => {
                if let Some(current) = &self.current_test {
                    let hit = ev.data.as_deref().is_some_and(|d| d.contains(self.marker.as_str()));
                    if hit && self.out.flagged.insert(current.clone()) {
                        debug!(test = %current, line = self.line_number, "flagged test");
                    }
                    self.outputs.push(ev.into_output());
                }
            }
            Action::TestEnd => {
                self.out.results.push(TestResult {
                    test_name: ev.test.unwrap_or_default(),
                    status: ev.status.unwrap_or_default(),
                    process_outputs: self.outputs.clone(),
                });
                self.entries += 1;
                if self.is_done() {
                    debug!(max_entries = self.max_entries, line = self.line_number, "entry cap reached");
                }
            }
            Action::Other => {}
        }
        !self.is_done()
    }

    /// Feed one raw line (without its terminator). Lines that are not valid
    /// UTF-8 are recorded as malformed and skipped.
    pub fn push_bytes(&mut self, line: &[u8]) -> bool {
        match std::str::from_utf8(line) {
            Ok(s) => self.push_line(s),
            Err(e) => {
                if self.is_done() { return false; }
                self.line_number += 1;
                self.record_error(e.into());
                true
            }
        }
    }

    fn record_error(&mut self, e: EventError) {
        warn!(line = self.line_number, "skipping log line: {e}");
        self.out.errors.total += 1;
        if self.out.errors.samples.len() < MAX_ERROR_SAMPLES {
            self.out.errors.samples.push(ErrorSample { line_number: self.line_number, kind: e.kind().into() });
        }
    }

    pub fn finish(self) -> ScanOutput {
        debug!(
            lines = self.line_number,
            results = self.out.results.len(),
            flagged = self.out.flagged.len(),
            errors = self.out.errors.total,
            "scan finished"
        );
        self.out
    }
}

/// Drive `scanner` over `reader` until EOF or the entry cap.
pub fn scan_reader<R: BufRead>(mut reader: R, mut scanner: LogScanner) -> io::Result<ScanOutput> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 { break; }
        if !scanner.push_bytes(trim_line_end(&buf)) { break; }
    }
    Ok(scanner.finish())
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

pub fn parse_reader<R: BufRead>(reader: R, max_entries: usize) -> io::Result<ScanOutput> {
    scan_reader(reader, LogScanner::new(max_entries))
}

/// Parse the log at `path`, stopping after `max_entries` `test_end` events.
pub fn parse_log(path: &Path, max_entries: usize) -> Result<ScanOutput> {
    parse_log_with(path, LogScanner::new(max_entries))
}

pub fn parse_log_with(path: &Path, scanner: LogScanner) -> Result<ScanOutput> {
    let f = File::open(path).map_err(|e| Error::io(path, e))?;
    // Larger buffer reduces syscalls on big logs.
    let r = BufReader::with_capacity(1 << 20, f);
    scan_reader(r, scanner).map_err(|e| Error::io(path, e))
}
