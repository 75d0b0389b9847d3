//! Summary reporter - display run results

use crate::testing::RunReport;
use colored::*;
use std::io::{self, Write};
use suite_harness::TestOutcome;

/// Prints the run summary
///
/// Color is decided once per process by the caller through
/// `colored::control`; the reporter never touches that switch.
pub struct SummaryReporter {
    /// Show every test, not just the counts
    verbose: bool,
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SummaryReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Report to stdout
    pub fn report(&self, report: &RunReport) -> io::Result<()> {
        let stdout = io::stdout();
        self.write_report(&mut stdout.lock(), report)
    }

    pub fn write_report<W: Write>(&self, out: &mut W, report: &RunReport) -> io::Result<()> {
        let results = &report.results;

        if self.verbose {
            for record in results.records() {
                match &record.outcome {
                    TestOutcome::Passed { duration } => {
                        writeln!(out, "{} {} ({:.2?})", "PASS".green().bold(), record.name, duration)?
                    }
                    TestOutcome::Failed { duration, .. } => {
                        writeln!(out, "{} {} ({:.2?})", "FAIL".red().bold(), record.name, duration)?
                    }
                }
            }
            if !results.records().is_empty() {
                writeln!(out)?;
            }
        }

        writeln!(out, "Passed: {}", results.passed().len())?;
        writeln!(out, "Failed: {}", results.failed().len())?;

        if report.timed_out {
            writeln!(out, "{}", "Run stopped by timeout".yellow().bold())?;
        }

        self.write_failures(out, report)
    }

    fn write_failures<W: Write>(&self, out: &mut W, report: &RunReport) -> io::Result<()> {
        let failures: Vec<_> = report
            .results
            .records()
            .iter()
            .filter(|r| r.outcome.is_fail())
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "{}", "Failures:".red().bold())?;
        for record in failures {
            writeln!(out, "  {} {}", "●".red(), record.name.bold())?;
            if let TestOutcome::Failed { reason, .. } = &record.outcome {
                if self.verbose {
                    for line in reason.lines() {
                        writeln!(out, "      {}", line.dimmed())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Machine-readable summary
    pub fn to_json(report: &RunReport) -> serde_json::Value {
        let results = &report.results;
        let tests: Vec<_> = results
            .records()
            .iter()
            .map(|r| {
                let mut test = serde_json::json!({
                    "name": r.name,
                    "suite": r.suite,
                    "passed": r.outcome.is_pass(),
                    "duration_ms": r.outcome.duration().as_millis(),
                });
                if let TestOutcome::Failed { reason, .. } = &r.outcome {
                    test["reason"] = serde_json::Value::from(reason.as_str());
                }
                test
            })
            .collect();

        serde_json::json!({
            "suites": report.suites,
            "passed": results.passed().len(),
            "failed": results.failed().len(),
            "timed_out": report.timed_out,
            "duration_ms": results.total_duration().as_millis(),
            "tests": tests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::time::Duration;
    use suite_harness::{TestCase, TestResults};

    fn run_report(outcomes: &[(&str, Option<&str>)]) -> RunReport {
        let mut results = TestResults::new();
        for (name, failure) in outcomes {
            let test = TestCase {
                name: format!("basic/{}", name),
                suite: "basic".to_string(),
                path: PathBuf::from(name),
            };
            let outcome = match failure {
                None => TestOutcome::Passed {
                    duration: Duration::from_millis(10),
                },
                Some(reason) => TestOutcome::Failed {
                    reason: reason.to_string(),
                    duration: Duration::from_millis(5),
                },
            };
            results.record(&test, outcome);
        }
        RunReport {
            results,
            suites: 1,
            timed_out: false,
            resources_closed: 0,
        }
    }

    fn render(reporter: &SummaryReporter, report: &RunReport) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        reporter.write_report(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_lines() {
        let report = run_report(&[("a.js", None), ("b.js", Some("exit status: 1"))]);
        let text = render(&SummaryReporter::new(false), &report);

        assert!(text.starts_with("Passed: 1\nFailed: 1\n"));
        assert!(text.contains("Failures:"));
        assert!(text.contains("basic/b.js"));
        assert!(!text.contains("exit status: 1"));
    }

    #[test]
    fn test_verbose_lists_every_test() {
        let report = run_report(&[("a.js", None), ("b.js", Some("exit status: 1"))]);
        let text = render(&SummaryReporter::new(true), &report);

        assert!(text.contains("PASS basic/a.js"));
        assert!(text.contains("FAIL basic/b.js"));
        assert!(text.contains("exit status: 1"));
    }

    #[test]
    fn test_empty_run() {
        let report = run_report(&[]);
        let text = render(&SummaryReporter::new(true), &report);
        assert_eq!(text, "Passed: 0\nFailed: 0\n");
    }

    #[test]
    fn test_timeout_is_reported() {
        let mut report = run_report(&[("a.js", None)]);
        report.timed_out = true;
        let text = render(&SummaryReporter::new(false), &report);
        assert!(text.contains("Run stopped by timeout"));
    }

    #[test]
    fn test_report_leaves_color_switch_alone() {
        colored::control::set_override(false);
        let report = run_report(&[("a.js", None)]);
        SummaryReporter::new(true).report(&report).unwrap();
        assert!(!colored::control::SHOULD_COLORIZE.should_colorize());
    }

    #[test]
    fn test_json_summary() {
        let report = run_report(&[("a.js", None), ("b.js", Some("boom"))]);
        let json = SummaryReporter::to_json(&report);

        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["timed_out"], false);
        assert_eq!(json["tests"][1]["name"], "basic/b.js");
        assert_eq!(json["tests"][1]["reason"], "boom");
        assert!(json["tests"][0].get("reason").is_none());
    }
}
