use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("test name {test_name:?} has no top-level directory")]
    TestNameShape { test_name: String },
    #[error("test {test_name:?} ended with unknown status {status:?}")]
    UnknownStatus { test_name: String, status: String },
    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
