//! The driver - discovers suites, runs them concurrently and aggregates
//! their outcomes.
//!
//! Tests report back over a single completion channel. The driver is that
//! channel's only consumer, so the result accumulator and the running-suite
//! counter are never touched concurrently, and `finish` consumes the driver
//! so reporting happens exactly once.

use crate::config::{DriverConfig, TimeoutMode};
use crate::error::{DriverError, DriverResult};
use crate::testing::discovery;
use std::path::Path;
use std::sync::Arc;
use suite_harness::{
    Environment, ProcessExecutor, RunContext, Suite, TestCompletion, TestExecutor, TestResults,
};
use tokio::sync::mpsc;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Configuring,
    Discovering,
    CreatingTests,
    Running,
    Reporting,
    Terminated,
}

impl DriverState {
    /// The only state reachable from this one
    fn successor(self) -> Option<DriverState> {
        match self {
            DriverState::Configuring => Some(DriverState::Discovering),
            DriverState::Discovering => Some(DriverState::CreatingTests),
            DriverState::CreatingTests => Some(DriverState::Running),
            DriverState::Running => Some(DriverState::Reporting),
            DriverState::Reporting => Some(DriverState::Terminated),
            DriverState::Terminated => None,
        }
    }
}

/// Everything known once a run has finished
#[derive(Debug)]
pub struct RunReport {
    pub results: TestResults,
    /// Suites found during discovery
    pub suites: usize,
    /// The run was stopped by a hard timeout
    pub timed_out: bool,
    /// Open resources closed before reporting
    pub resources_closed: usize,
}

impl RunReport {
    /// `0` when nothing failed, `1` otherwise
    pub fn exit_status(&self) -> u8 {
        if self.results.failed().is_empty() && !self.timed_out {
            0
        } else {
            1
        }
    }
}

pub struct Driver {
    config: DriverConfig,
    env: Arc<Environment>,
    executor: Arc<dyn TestExecutor>,
    suites: Vec<Suite>,
    running_suites: usize,
    state: DriverState,
}

impl Driver {
    /// Create a driver that runs tests as child processes
    pub fn new(config: DriverConfig) -> Self {
        let env = Environment::new()
            .with_debug(config.debug)
            .with_adapter(config.adapter.clone());
        Self {
            config,
            env: Arc::new(env),
            executor: Arc::new(ProcessExecutor::new()),
            suites: Vec::new(),
            running_suites: 0,
            state: DriverState::Configuring,
        }
    }

    /// Replace the test executor
    pub fn with_executor(mut self, executor: Arc<dyn TestExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the environment shared with suites and executors.
    ///
    /// Debug and adapter settings still come from the driver's config.
    #[cfg(test)]
    pub fn with_environment(mut self, env: Environment) -> Self {
        let env = env
            .with_debug(self.config.debug)
            .with_adapter(self.config.adapter.clone());
        self.env = Arc::new(env);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Suites started by `run_all_suites` that have not finished yet
    #[cfg(test)]
    pub fn running_suites(&self) -> usize {
        self.running_suites
    }

    fn transition(&mut self, to: DriverState) -> DriverResult<()> {
        if self.state.successor() != Some(to) {
            return Err(DriverError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = ?self.state, ?to, "driver state");
        self.state = to;
        Ok(())
    }

    pub fn find_suites(&mut self, directory: &Path) -> DriverResult<()> {
        self.suites = discovery::find_suites(directory, &self.config)?;
        tracing::debug!(count = self.suites.len(), "suites found");
        Ok(())
    }

    /// Materialize every suite's tests; the first failure aborts the run
    pub fn create_tests_for_all_suites(&mut self) -> DriverResult<()> {
        for suite in &mut self.suites {
            tracing::debug!(suite = %suite.name(), "creating tests");
            suite.create_tests(&self.env)?;
        }
        Ok(())
    }

    /// Start every suite in discovery order.
    ///
    /// Returns the number of suites that actually started.
    pub fn run_all_suites(&mut self, ctx: &RunContext) -> usize {
        self.running_suites = 0;
        for suite in &mut self.suites {
            tracing::debug!(suite = %suite.name(), "running tests");
            if suite.run_tests(ctx) {
                self.running_suites += 1;
            }
        }
        self.running_suites
    }

    /// Handle one finished test.
    ///
    /// Returns `true` when this completion finished the last running suite.
    pub fn on_test_completed(
        &mut self,
        completion: TestCompletion,
        results: &mut TestResults,
    ) -> bool {
        let TestCompletion { test, outcome } = completion;
        results.record(&test, outcome);

        let Some(suite) = self.suites.iter_mut().find(|s| s.name() == test.suite) else {
            tracing::warn!(test = %test.name, suite = %test.suite, "completion for unknown suite");
            return false;
        };

        if !suite.test_completed(&test) {
            return false;
        }

        match self.running_suites.checked_sub(1) {
            Some(remaining) => {
                tracing::debug!(suite = %test.suite, remaining, "suite finished");
                self.running_suites = remaining;
                remaining == 0
            }
            None => {
                tracing::warn!(suite = %test.suite, "suite finished while none were running");
                false
            }
        }
    }

    /// Run every suite under the configured test directory to completion
    pub async fn run(mut self) -> DriverResult<RunReport> {
        let root = self.config.test_dir.clone();

        self.transition(DriverState::Discovering)?;
        self.find_suites(&root)?;

        self.transition(DriverState::CreatingTests)?;
        self.create_tests_for_all_suites()?;

        self.transition(DriverState::Running)?;
        let mut results = TestResults::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = RunContext {
            env: Arc::clone(&self.env),
            executor: Arc::clone(&self.executor),
            listener: Arc::clone(results.listener()),
            completions: tx,
        };
        let started = self.run_all_suites(&ctx);
        drop(ctx);

        if started == 0 {
            tracing::debug!("no suites started");
            return self.finish(results, false);
        }

        tracing::debug!(timeout = ?self.config.timeout, "setting timeout");
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);
        let mut deadline_passed = false;
        let mut timed_out = false;

        loop {
            tokio::select! {
                completion = rx.recv() => {
                    let Some(completion) = completion else {
                        return Err(DriverError::CompletionChannelClosed {
                            running: self.running_suites,
                        });
                    };
                    if self.on_test_completed(completion, &mut results) {
                        break;
                    }
                }
                () = &mut deadline, if !deadline_passed => {
                    deadline_passed = true;
                    let waiting = results.listener().outstanding();
                    // Printed regardless of the log filter
                    eprintln!(
                        "TIMEOUT: still waiting for {} {}",
                        waiting,
                        if waiting == 1 { "test." } else { "tests." }
                    );
                    tracing::debug!(waiting, mode = ?self.config.timeout_mode, "safety timeout elapsed");
                    if self.config.timeout_mode == TimeoutMode::Fail {
                        timed_out = true;
                        break;
                    }
                }
            }
        }

        self.finish(results, timed_out)
    }

    /// Close open resources and hand the results to the reporter
    fn finish(mut self, results: TestResults, timed_out: bool) -> DriverResult<RunReport> {
        self.transition(DriverState::Reporting)?;
        let resources_closed = self.env.close_open_resources();
        self.transition(DriverState::Terminated)?;

        Ok(RunReport {
            results,
            suites: self.suites.len(),
            timed_out,
            resources_closed,
        })
    }
}
