//! Suite harness
//!
//! Collaborators driven by the `driver` binary:
//! - `Suite` / `TestCase`: test materialization and execution
//! - `TestExecutor`: how one test runs (child process by default)
//! - `TestResults` / `Listener`: pass/fail accumulation and start/end counts
//! - `Environment`: process-wide configuration and open-resource registry

pub mod environment;
pub mod error;
pub mod executor;
pub mod result;
pub mod suite;

pub use environment::{Environment, OpenResource};
pub use error::{HarnessError, HarnessResult};
pub use executor::{ProcessExecutor, TestExecutor};
pub use result::{Listener, TestOutcome, TestRecord, TestResults};
pub use suite::{RunContext, Suite, TestCase, TestCompletion};
