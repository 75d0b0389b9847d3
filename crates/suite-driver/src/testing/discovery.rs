//! Suite discovery - one suite per test subdirectory, or a single file

use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};
use std::path::Path;
use suite_harness::Suite;
use walkdir::WalkDir;

/// Directory holding shared helpers, never a suite
pub const RESERVED_DIR: &str = "lib";

/// Name of the suite created for `--file`
pub const FILE_SUITE_NAME: &str = "file";

/// Find the suites to run under `directory`.
///
/// With `--file` set this is exactly one suite bound to `directory/<file>`.
/// Otherwise every immediate subdirectory except [`RESERVED_DIR`] that
/// passes the suite filter becomes a suite, in file name order.
pub fn find_suites(directory: &Path, config: &DriverConfig) -> DriverResult<Vec<Suite>> {
    if let Some(file) = &config.file {
        let path = directory.join(file);
        tracing::debug!(path = %path.display(), "running single file");
        return Ok(vec![Suite::new(FILE_SUITE_NAME, path)]);
    }

    let mut suites = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| DriverError::discovery(directory, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_suite_to_run(&name, config.suites.as_deref()) {
            tracing::debug!(suite = %name, "found suite directory");
            suites.push(Suite::new(name.to_string(), entry.path()));
        }
    }

    Ok(suites)
}

/// Whether a directory name is a suite selected by the filter
pub fn is_suite_to_run(name: &str, filter: Option<&[String]>) -> bool {
    if name == RESERVED_DIR {
        return false;
    }
    let selected = filter.map_or(true, |names| names.iter().any(|n| n == name));
    tracing::trace!(suite = name, selected, "suite filter");
    selected
}
