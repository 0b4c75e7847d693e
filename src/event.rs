use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("not a JSON object line")]
    NotObject,
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl EventError {
    /// Short label used in error samples.
    pub fn kind(&self) -> &'static str {
        match self {
            EventError::NotObject => "not_object",
            EventError::Parse(_) => "malformed_json",
            EventError::InvalidUtf8(_) => "invalid_utf8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TestStart,
    TestEnd,
    ProcessOutput,
    /// Any other action, or none at all.
    Other,
}

impl Action {
    fn from_field(v: Option<&Value>) -> Self {
        match v.and_then(Value::as_str) {
            Some("test_start") => Action::TestStart,
            Some("test_end") => Action::TestEnd,
            Some("process_output") => Action::ProcessOutput,
            _ => Action::Other,
        }
    }
}

/// One `process_output` event as captured for a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEvent {
    pub data: String,
    pub process: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEvent {
    pub action: Action,
    pub test: Option<String>,
    pub status: Option<String>,
    pub data: Option<String>,
    pub process: Option<String>,
    pub command: Option<String>,
}

impl TestEvent {
    pub fn into_output(self) -> OutputEvent {
        OutputEvent {
            data: self.data.unwrap_or_default(),
            process: self.process,
            command: self.command,
        }
    }
}

pub fn parse_event(line: &str) -> Result<TestEvent, EventError> {
    let v: Value = serde_json::from_str(line)?;
    match v {
        Value::Object(map) => Ok(event_from_map(&map)),
        _ => Err(EventError::NotObject),
    }
}

fn event_from_map(map: &Map<String, Value>) -> TestEvent {
    TestEvent {
        action: Action::from_field(map.get("action")),
        test: string_field(map, "test"),
        status: string_field(map, "status"),
        data: string_field(map, "data"),
        process: string_field(map, "process"),
        command: string_field(map, "command"),
    }
}

// mozlog writes `process` as a pid number in some harnesses
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
