//! Test executors - run one test case to an outcome

use crate::environment::Environment;
use crate::error::HarnessError;
use crate::result::TestOutcome;
use crate::suite::TestCase;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Environment variable carrying the adapter name into test processes
pub const ADAPTER_VAR: &str = "DRIVER_ADAPTER";
/// Set to `1` in test processes when the driver runs with `--debug`
pub const DEBUG_VAR: &str = "DRIVER_DEBUG";
/// Name of the suite the test belongs to
pub const SUITE_VAR: &str = "DRIVER_SUITE";

/// Lines of stderr kept in a failure reason
const STDERR_TAIL_LINES: usize = 20;

/// Runs a single test case.
///
/// Called on tokio's blocking pool, so implementations may block.
pub trait TestExecutor: Send + Sync {
    fn execute(&self, test: &TestCase, env: &Environment) -> TestOutcome;
}

/// Runs each test file as a child process through the interpreter registered
/// for its extension. Exit status 0 means the test passed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl TestExecutor for ProcessExecutor {
    fn execute(&self, test: &TestCase, env: &Environment) -> TestOutcome {
        let start = Instant::now();
        let failed = |reason: String| TestOutcome::Failed {
            reason,
            duration: start.elapsed(),
        };

        let Some(program) = env.interpreter_for(&test.path) else {
            return failed(HarnessError::no_interpreter(&test.path).to_string());
        };

        let path = match test.path.canonicalize() {
            Ok(p) => p,
            Err(e) => return failed(HarnessError::io(&test.path, e).to_string()),
        };

        let mut cmd = Command::new(program);
        cmd.arg(&path)
            .env(SUITE_VAR, &test.suite)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = path.parent() {
            cmd.current_dir(dir);
        }
        if let Some(adapter) = env.adapter() {
            cmd.env(ADAPTER_VAR, adapter);
        }
        if env.debug() {
            cmd.env(DEBUG_VAR, "1");
        }

        tracing::debug!(test = %test.name, program, "spawning test process");

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => return failed(format!("Failed to spawn `{}`: {}", program, e)),
        };

        if !output.stdout.is_empty() {
            tracing::debug!(
                test = %test.name,
                stdout = %String::from_utf8_lossy(&output.stdout),
                "test output"
            );
        }

        if output.status.success() {
            TestOutcome::Passed {
                duration: start.elapsed(),
            }
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            failed(failure_reason(&output.status.to_string(), &stderr))
        }
    }
}

/// Status line followed by the tail of stderr
fn failure_reason(status: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
    if tail.is_empty() {
        status.to_string()
    } else {
        format!("{}\n{}", status, tail.join("\n"))
    }
}
