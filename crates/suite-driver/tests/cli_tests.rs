//! CLI integration tests
//!
//! Runs the `driver` binary against temporary test directories and checks
//! the printed summary and the exit code.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn driver_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("driver").unwrap();
    cmd.arg(format!("--dir={}", dir.display()))
        .arg("--no-color")
        .env_remove("DRIVER_ADAPTER")
        .env_remove("DRIVER_JSON")
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// `lib/` helpers, a passing suite and a suite with one failure
fn mixed_root() -> TempDir {
    let root = tempdir().unwrap();
    write(root.path(), "lib/helper.sh", "exit 1\n");
    write(root.path(), "basic/insert.sh", "exit 0\n");
    write(root.path(), "basic/find.sh", "exit 0\n");
    write(root.path(), "numeric/overflow.sh", "echo overflow >&2\nexit 1\n");
    write(root.path(), "Driver.sh", "exit 1\n");
    root
}

// ══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ══════════════════════════════════════════════════════════════════════════════

mod options {
    use super::*;

    #[test]
    fn test_help_exits_zero() {
        for flag in ["-h", "--help"] {
            Command::cargo_bin("driver")
                .unwrap()
                .arg(flag)
                .assert()
                .success()
                .stdout(predicate::str::contains("--suite"))
                .stdout(predicate::str::contains("--adapter"))
                .stdout(predicate::str::contains("--file"));
        }
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        Command::cargo_bin("driver")
            .unwrap()
            .arg("--bogus")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn test_malformed_value_is_usage_error() {
        Command::cargo_bin("driver")
            .unwrap()
            .arg("--suite=a=b")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("malformed value"));
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// RUNS
// ══════════════════════════════════════════════════════════════════════════════

#[cfg(unix)]
mod runs {
    use super::*;

    #[test]
    fn test_empty_directory_passes() {
        let root = tempdir().unwrap();
        driver_cmd(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Passed: 0"))
            .stdout(predicate::str::contains("Failed: 0"));
    }

    #[test]
    fn test_failure_sets_exit_code() {
        let root = mixed_root();
        driver_cmd(root.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Passed: 2"))
            .stdout(predicate::str::contains("Failed: 1"))
            .stdout(predicate::str::contains("numeric/overflow.sh"));
    }

    #[test]
    fn test_suite_filter() {
        let root = mixed_root();
        driver_cmd(root.path())
            .arg("--suites=basic")
            .assert()
            .success()
            .stdout(predicate::str::contains("Passed: 2"))
            .stdout(predicate::str::contains("Failed: 0"));
    }

    #[test]
    fn test_single_file() {
        let root = mixed_root();
        driver_cmd(root.path())
            .arg("--file=numeric/overflow.sh")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Passed: 0"))
            .stdout(predicate::str::contains("Failed: 1"));
    }

    #[test]
    fn test_empty_file_runs_every_suite() {
        let root = mixed_root();
        driver_cmd(root.path())
            .arg("--file=")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Passed: 2"))
            .stdout(predicate::str::contains("Failed: 1"))
            .stdout(predicate::str::contains("Driver.sh").not());
    }

    #[test]
    fn test_adapter_reaches_tests() {
        let root = tempdir().unwrap();
        write(
            root.path(),
            "adapter/check.sh",
            "[ \"$DRIVER_ADAPTER\" = \"ndb\" ]\n",
        );
        driver_cmd(root.path())
            .arg("--adapter=ndb")
            .assert()
            .success()
            .stdout(predicate::str::contains("Passed: 1"));
    }

    #[test]
    fn test_debug_run_lists_tests() {
        let root = mixed_root();
        driver_cmd(root.path())
            .arg("-d")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("PASS basic/insert.sh"))
            .stdout(predicate::str::contains("FAIL numeric/overflow.sh"))
            .stdout(predicate::str::contains("overflow"));
    }

    #[test]
    fn test_json_summary() {
        let root = mixed_root();
        let output = driver_cmd(root.path()).arg("--json").output().unwrap();
        assert_eq!(output.status.code(), Some(1));

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["passed"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["suites"], 2);
    }

    #[test]
    fn test_timeout_diagnostic_does_not_fail_run() {
        let root = tempdir().unwrap();
        write(root.path(), "slow/wait.sh", "sleep 1\n");
        driver_cmd(root.path())
            .arg("--timeout-ms=100")
            .assert()
            .success()
            .stderr(predicate::str::contains("TIMEOUT: still waiting for 1 test."))
            .stdout(predicate::str::contains("Passed: 1"));
    }

    #[test]
    fn test_timeout_diagnostic_ignores_log_filter() {
        let root = tempdir().unwrap();
        write(root.path(), "slow/wait.sh", "sleep 1\n");
        driver_cmd(root.path())
            .arg("--timeout-ms=100")
            .env("RUST_LOG", "off")
            .assert()
            .success()
            .stderr(predicate::str::contains("TIMEOUT: still waiting for 1 test."));
    }

    #[test]
    fn test_hard_timeout_fails_run() {
        let root = tempdir().unwrap();
        write(root.path(), "slow/wait.sh", "sleep 5\n");
        driver_cmd(root.path())
            .args(["--timeout-ms=100", "--fail-on-timeout"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Run stopped by timeout"));
    }

    #[test]
    fn test_missing_test_directory_errors() {
        let root = tempdir().unwrap();
        driver_cmd(&root.path().join("missing"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("did not complete"));
    }
}
