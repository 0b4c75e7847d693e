pub mod error;
pub mod event;
pub mod scan;
pub mod directory;
pub mod outcome;
pub mod aggregate;
pub mod report;
pub mod config;
pub mod pipeline;

pub use error::{Error, Result};
