/// Harness error types
use std::path::PathBuf;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error at {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("No interpreter registered for test file {path}")]
    NoInterpreter { path: PathBuf },

    #[error("Not a test file or directory: {path}")]
    NotATestFile { path: PathBuf },
}

impl HarnessError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }

    /// Create a missing interpreter error
    pub fn no_interpreter(path: impl Into<PathBuf>) -> Self {
        Self::NoInterpreter { path: path.into() }
    }

    pub fn not_a_test_file(path: impl Into<PathBuf>) -> Self {
        Self::NotATestFile { path: path.into() }
    }
}
