use crate::directory::directory_key;
use crate::error::{Error, Result};
use crate::outcome::{Outcome, OutcomeCounts};
use crate::scan::{FlaggedSet, TestResult};
use indexmap::IndexMap;
use tracing::debug;

/// Directory key -> outcome counters, in first-seen order.
pub type AggregatedCounts = IndexMap<String, OutcomeCounts>;

/// Directory key -> flagged test names, in first-flagged order.
pub type FlaggedGroups = IndexMap<String, Vec<String>>;

/// What to do with a status outside the seeded outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Count it under its own name.
    #[default]
    Widen,
    /// Abort with `Error::UnknownStatus`.
    Strict,
}

pub fn aggregate_by_directory(results: &[TestResult], policy: StatusPolicy) -> Result<AggregatedCounts> {
    let mut out = AggregatedCounts::new();
    for r in results {
        let dir = directory_key(&r.test_name)?;
        let outcome = Outcome::parse(&r.status);
        if !outcome.is_known() {
            if policy == StatusPolicy::Strict {
                return Err(Error::UnknownStatus { test_name: r.test_name.clone(), status: r.status.clone() });
            }
            debug!(test = %r.test_name, status = %r.status, "counting unrecognized status");
        }
        out.entry(dir.to_string()).or_default().increment(outcome);
    }
    Ok(out)
}

pub fn group_flagged(flagged: &FlaggedSet) -> Result<FlaggedGroups> {
    let mut out = FlaggedGroups::new();
    for test in flagged {
        let dir = directory_key(test)?;
        out.entry(dir.to_string()).or_default().push(test.clone());
    }
    Ok(out)
}
