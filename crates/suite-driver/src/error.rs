/// Driver error types
use crate::testing::driver::DriverState;
use std::path::PathBuf;
use suite_harness::HarnessError;
use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to read test directory {path}: {error}")]
    Discovery {
        path: PathBuf,
        error: walkdir::Error,
    },

    #[error("Invalid driver state transition: {from:?} -> {to:?}")]
    InvalidTransition { from: DriverState, to: DriverState },

    #[error("Completion channel closed with {running} suite(s) still running")]
    CompletionChannelClosed { running: usize },

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

impl DriverError {
    pub fn discovery(path: impl Into<PathBuf>, error: walkdir::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            error,
        }
    }
}
