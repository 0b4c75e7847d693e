use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Test outcome as reported in `test_end.status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pass,
    Timeout,
    Fail,
    Skip,
    Error,
    Ok,
    Crash,
    /// A status outside the harness vocabulary, kept verbatim.
    Other(String),
}

impl Outcome {
    /// Outcomes every directory starts with, in report order.
    pub const SEEDED: [Outcome; 7] = [
        Outcome::Pass,
        Outcome::Timeout,
        Outcome::Fail,
        Outcome::Skip,
        Outcome::Error,
        Outcome::Ok,
        Outcome::Crash,
    ];

    pub fn parse(status: &str) -> Self {
        match status {
            "PASS" => Outcome::Pass,
            "TIMEOUT" => Outcome::Timeout,
            "FAIL" => Outcome::Fail,
            "SKIP" => Outcome::Skip,
            "ERROR" => Outcome::Error,
            "OK" => Outcome::Ok,
            "CRASH" => Outcome::Crash,
            other => Outcome::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Timeout => "TIMEOUT",
            Outcome::Fail => "FAIL",
            Outcome::Skip => "SKIP",
            Outcome::Error => "ERROR",
            Outcome::Ok => "OK",
            Outcome::Crash => "CRASH",
            Outcome::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Outcome::Other(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Per-directory outcome counters. The seeded outcomes are always present;
/// widened outcomes follow in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutcomeCounts(IndexMap<Outcome, usize>);

impl Default for OutcomeCounts {
    fn default() -> Self {
        Self(Outcome::SEEDED.into_iter().map(|o| (o, 0)).collect())
    }
}

impl OutcomeCounts {
    pub fn increment(&mut self, outcome: Outcome) {
        *self.0.entry(outcome).or_insert(0) += 1;
    }

    pub fn get(&self, outcome: &Outcome) -> usize {
        self.0.get(outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, usize)> + '_ {
        self.0.iter().map(|(o, n)| (o, *n))
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (outcome, n)) in self.iter().enumerate() {
            if i > 0 { f.write_str(" ")?; }
            write!(f, "{outcome}={n}")?;
        }
        Ok(())
    }
}
