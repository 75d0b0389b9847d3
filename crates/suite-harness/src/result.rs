//! Run-wide result accumulation

use crate::suite::TestCase;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of running a single test
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    /// Test passed successfully
    Passed { duration: Duration },
    /// Test failed with a reason
    Failed { reason: String, duration: Duration },
}

impl TestOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestOutcome::Passed { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestOutcome::Passed { duration } => *duration,
            TestOutcome::Failed { duration, .. } => *duration,
        }
    }
}

/// Counts tests as they start and end.
///
/// Shared with running test tasks; only used for timeout diagnostics.
#[derive(Debug, Default)]
pub struct Listener {
    started: AtomicUsize,
    ended: AtomicUsize,
}

impl Listener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn test_ended(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }

    /// Tests that have started but not yet ended
    pub fn outstanding(&self) -> usize {
        self.started().saturating_sub(self.ended())
    }
}

/// A recorded test outcome
#[derive(Debug, Clone)]
pub struct TestRecord {
    /// Test identifier (`<suite>/<file>`)
    pub name: String,
    pub suite: String,
    pub outcome: TestOutcome,
}

/// Accumulates pass/fail outcomes for the whole run
#[derive(Debug, Default)]
pub struct TestResults {
    records: Vec<TestRecord>,
    listener: Arc<Listener>,
}

impl TestResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> &Arc<Listener> {
        &self.listener
    }

    /// Record the outcome of a finished test
    pub fn record(&mut self, test: &TestCase, outcome: TestOutcome) {
        match &outcome {
            TestOutcome::Passed { duration } => {
                tracing::debug!(test = %test.name, ?duration, "test passed")
            }
            TestOutcome::Failed { reason, duration } => {
                tracing::debug!(test = %test.name, ?duration, %reason, "test failed")
            }
        }
        self.records.push(TestRecord {
            name: test.name.clone(),
            suite: test.suite.clone(),
            outcome,
        });
    }

    /// Identifiers of passed tests, in completion order
    pub fn passed(&self) -> Vec<&str> {
        self.names_where(TestOutcome::is_pass)
    }

    /// Identifiers of failed tests, in completion order
    pub fn failed(&self) -> Vec<&str> {
        self.names_where(TestOutcome::is_fail)
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.outcome.duration()).sum()
    }

    fn names_where(&self, pred: impl Fn(&TestOutcome) -> bool) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| pred(&r.outcome))
            .map(|r| r.name.as_str())
            .collect()
    }
}
