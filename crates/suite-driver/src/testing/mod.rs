//! Test driver infrastructure
//!
//! Suite discovery, the concurrent run loop and result reporting.

pub mod discovery;
pub mod driver;
pub mod reporter;

pub use driver::{Driver, RunReport};
pub use reporter::SummaryReporter;
