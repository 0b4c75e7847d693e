use crate::aggregate::StatusPolicy;
use crate::scan::FAILURE_MARKER;
use std::path::PathBuf;

pub const DEFAULT_LOG_PATH: &str = "wpt-css-bigger.log";
pub const DEFAULT_DETAIL_DIRECTORY: &str = "css";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub log_path: PathBuf,
    /// Cap on processed `test_end` events.
    pub max_entries: usize,
    pub marker: String,
    /// Directory whose flagged tests are dumped to the detail file.
    pub detail_directory: String,
    /// Defaults to `<detail_directory>.txt`.
    pub detail_path: Option<PathBuf>,
    pub status_policy: StatusPolicy,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            max_entries: usize::MAX,
            marker: FAILURE_MARKER.to_string(),
            detail_directory: DEFAULT_DETAIL_DIRECTORY.to_string(),
            detail_path: None,
            status_policy: StatusPolicy::default(),
            format: OutputFormat::default(),
        }
    }
}

impl RunConfig {
    pub fn detail_path(&self) -> PathBuf {
        self.detail_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.txt", self.detail_directory)))
    }
}
