use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod error;
mod testing;

/// Default safety timeout after all suites have been started
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Test suite driver.
///
/// Runs every suite found under the test directory (one suite per
/// subdirectory, `lib` excluded) concurrently and prints how many tests
/// passed and failed. Exits 1 if any test failed, 2 on invalid options.
///
/// EXAMPLES:
///     driver                         Run every suite
///     driver --suites=basic,numeric  Run two suites
///     driver --file=basic/insert.js  Run a single test file
///     driver -d --adapter=mysql      Debug run against the mysql adapter
///
/// ENVIRONMENT VARIABLES:
///     DRIVER_ADAPTER     Adapter name passed to tests
///     DRIVER_TEST_DIR    Test directory
///     DRIVER_TIMEOUT_MS  Safety timeout in milliseconds
///     DRIVER_JSON        Set to 'true' for a JSON summary
///     NO_COLOR           Set to disable colored output
///     RUST_LOG           Log filter (overrides --debug)
#[derive(Parser, Debug)]
#[command(name = "driver")]
#[command(version)]
pub struct Cli {
    /// Set the debug flag (verbose logging and report)
    #[arg(short, long)]
    pub debug: bool,

    /// Only run the named suite(s), comma separated
    #[arg(long, visible_alias = "suites", value_name = "SUITE", value_parser = plain_value)]
    pub suite: Option<String>,

    /// Run a single test file (relative to the test directory) as the only suite
    #[arg(long, value_name = "FILE", value_parser = plain_value)]
    pub file: Option<String>,

    /// Adapter passed through to tests (e.g. ndb or mysql)
    #[arg(long, env = "DRIVER_ADAPTER", value_parser = plain_value)]
    pub adapter: Option<String>,

    /// Directory holding one subdirectory per suite
    #[arg(long, env = "DRIVER_TEST_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Log outstanding tests if the run takes longer than this
    #[arg(long, env = "DRIVER_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Fail the run instead of waiting when the timeout elapses
    #[arg(long)]
    pub fail_on_timeout: bool,

    /// Print the summary as JSON
    #[arg(long, env = "DRIVER_JSON")]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Option values are single words; `--suite=a=b` is malformed
fn plain_value(value: &str) -> Result<String, String> {
    if value.contains('=') {
        Err(format!("malformed value `{}`", value))
    } else {
        Ok(value.to_string())
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = config::DriverConfig::from_cli(&cli);

    init_tracing(config.debug);
    tracing::debug!(?config, "configured");

    let status = commands::test::run(config)?;
    Ok(ExitCode::from(status))
}
