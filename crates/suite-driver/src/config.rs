//! Driver configuration
//!
//! Built once from the parsed command line (clap fills in environment
//! fallbacks) and passed by value into discovery and execution. Nothing in
//! the driver reads ambient global state after this point.

use crate::Cli;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// What happens when the safety timeout elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutMode {
    /// Log the number of outstanding tests and keep waiting
    Warn,
    /// Stop waiting and fail the run
    Fail,
}

/// Run configuration derived from the command line
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Verbose diagnostics (`-d` / `--debug`)
    pub debug: bool,
    /// Suite names to run; `None` runs every suite
    pub suites: Option<Vec<String>>,
    /// Single file to run instead of scanning the test directory
    pub file: Option<PathBuf>,
    /// Adapter name passed through to tests
    pub adapter: Option<String>,
    /// Directory holding one subdirectory per suite
    pub test_dir: PathBuf,
    /// Safety timeout after kickoff
    pub timeout: Duration,
    pub timeout_mode: TimeoutMode,
    /// Print the summary as JSON
    pub json: bool,
    /// Disable colored output (`--no-color` or NO_COLOR)
    pub no_color: bool,
}

impl DriverConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            debug: cli.debug,
            suites: cli.suite.as_deref().and_then(parse_suite_list),
            file: cli
                .file
                .as_deref()
                .filter(|file| !file.is_empty())
                .map(PathBuf::from),
            adapter: cli.adapter.clone(),
            test_dir: cli.dir.clone(),
            timeout: Duration::from_millis(cli.timeout_ms),
            timeout_mode: if cli.fail_on_timeout {
                TimeoutMode::Fail
            } else {
                TimeoutMode::Warn
            },
            json: cli.json,
            no_color: cli.no_color || env::var_os("NO_COLOR").is_some(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            debug: false,
            suites: None,
            file: None,
            adapter: None,
            test_dir: PathBuf::from("."),
            timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
            timeout_mode: TimeoutMode::Warn,
            json: false,
            no_color: false,
        }
    }
}

/// Split a comma-separated suite list. An empty list means "no filter".
fn parse_suite_list(value: &str) -> Option<Vec<String>> {
    let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}
