//! Suites - named groups of test files
//!
//! A suite is either a directory (every test file directly inside it) or a
//! single file. Running a suite spawns one task per test; each task sends
//! exactly one [`TestCompletion`] to the driver when it finishes.

use crate::environment::Environment;
use crate::error::{HarnessError, HarnessResult};
use crate::executor::TestExecutor;
use crate::result::{Listener, TestOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// A single test belonging to a suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Test identifier (`<suite>/<file name>`)
    pub name: String,
    /// Name of the owning suite
    pub suite: String,
    /// Test file
    pub path: PathBuf,
}

/// Signal sent by a finished test
#[derive(Debug)]
pub struct TestCompletion {
    pub test: TestCase,
    pub outcome: TestOutcome,
}

/// Everything a running suite needs from the driver
#[derive(Clone)]
pub struct RunContext {
    pub env: Arc<Environment>,
    pub executor: Arc<dyn TestExecutor>,
    pub listener: Arc<Listener>,
    pub completions: mpsc::UnboundedSender<TestCompletion>,
}

/// A named group of tests
#[derive(Debug)]
pub struct Suite {
    name: String,
    path: PathBuf,
    tests: Vec<TestCase>,
    pending: usize,
}

impl Suite {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tests: Vec::new(),
            pending: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Tests that have not reported completion yet
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Materialize the suite's tests.
    ///
    /// A file suite holds exactly that file. A directory suite holds every
    /// regular, non-hidden file directly inside it that has an interpreter
    /// registered in `env`, sorted by file name.
    pub fn create_tests(&mut self, env: &Environment) -> HarnessResult<()> {
        let meta = fs::metadata(&self.path).map_err(|e| HarnessError::io(&self.path, e))?;

        self.tests = if meta.is_file() {
            vec![self.test_case(&self.path)]
        } else if meta.is_dir() {
            self.collect_directory_tests(env)?
        } else {
            return Err(HarnessError::not_a_test_file(&self.path));
        };

        tracing::debug!(suite = %self.name, count = self.tests.len(), "created tests");
        Ok(())
    }

    fn collect_directory_tests(&self, env: &Environment) -> HarnessResult<Vec<TestCase>> {
        let mut tests = Vec::new();

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.path.as_path()).to_path_buf();
                HarnessError::io(path, e.into())
            })?;

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !entry.file_type().is_file() || hidden {
                continue;
            }
            if env.interpreter_for(entry.path()).is_none() {
                tracing::trace!(path = %entry.path().display(), "skipping non-test file");
                continue;
            }
            tests.push(self.test_case(entry.path()));
        }

        Ok(tests)
    }

    fn test_case(&self, path: &Path) -> TestCase {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        TestCase {
            name: format!("{}/{}", self.name, file),
            suite: self.name.clone(),
            path: path.to_path_buf(),
        }
    }

    /// Start every test of the suite.
    ///
    /// Returns `false` without spawning anything when the suite has no tests.
    /// Must be called from within a tokio runtime.
    pub fn run_tests(&mut self, ctx: &RunContext) -> bool {
        if self.tests.is_empty() {
            tracing::debug!(suite = %self.name, "no tests, not running");
            return false;
        }

        self.pending = self.tests.len();
        for test in &self.tests {
            tokio::spawn(run_one(test.clone(), ctx.clone()));
        }
        true
    }

    /// Record that one of this suite's tests finished.
    ///
    /// Returns `true` exactly once: when the last pending test completes.
    pub fn test_completed(&mut self, test: &TestCase) -> bool {
        match self.pending.checked_sub(1) {
            Some(remaining) => {
                self.pending = remaining;
                tracing::debug!(suite = %self.name, test = %test.name, remaining, "test completed");
                remaining == 0
            }
            None => {
                tracing::warn!(
                    suite = %self.name,
                    test = %test.name,
                    "completion reported for a suite with no pending tests"
                );
                false
            }
        }
    }
}

async fn run_one(test: TestCase, ctx: RunContext) {
    let start = Instant::now();
    ctx.listener.test_started();

    let executor = Arc::clone(&ctx.executor);
    let env = Arc::clone(&ctx.env);
    let case = test.clone();
    let outcome = match tokio::task::spawn_blocking(move || executor.execute(&case, &env)).await {
        Ok(outcome) => outcome,
        Err(e) => TestOutcome::Failed {
            reason: format!("Test executor panicked: {}", e),
            duration: start.elapsed(),
        },
    };

    ctx.listener.test_ended();
    if ctx.completions.send(TestCompletion { test, outcome }).is_err() {
        tracing::debug!("completion receiver dropped");
    }
}
