//! UtilityHub360 test harness - Main Entry Point
//!
//! Runs the browser E2E suites against a live deployment and writes the
//! JSON/HTML reports. Exit codes: 0 all green, 1 test failures, 2 harness
//! errors.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use hub360_common::{BrowserKind, ReportPaths, SuiteConfig};
use hub360_e2e::runner::select_cases;
use hub360_e2e::suites::all_cases;
use hub360_e2e::TestRunner;

/// Browser E2E test harness for UtilityHub360
#[derive(Parser, Debug)]
#[command(name = "hub360-test")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Application under test
    #[arg(long, env = "HUB360_BASE_URL")]
    base_url: Option<String>,

    /// WebDriver endpoint (chromedriver/geckodriver/selenium)
    #[arg(long, env = "HUB360_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Browser to run tests with: chrome, firefox, edge
    #[arg(long, env = "HUB360_BROWSER")]
    browser: Option<String>,

    /// Run the browser in headless mode
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Run only cases carrying this tag (auth, dashboard, regression, smoke, api_error)
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the case with this exact name
    #[arg(short, long)]
    name: Option<String>,

    /// List registered cases instead of running them
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Root directory for reports
    #[arg(short, long, default_value = "reports")]
    output: PathBuf,

    /// How many times to rerun a failed test
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let mut config = SuiteConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(webdriver_url) = args.webdriver_url {
        config.webdriver_url = webdriver_url;
    }
    if let Some(browser) = args.browser.as_deref() {
        config.browser = browser.parse::<BrowserKind>()?;
    }
    if args.headless {
        config.headless = true;
    }
    config.retry_failed = args.retries;
    config.reports = ReportPaths::under(&args.output);

    let cases = select_cases(&all_cases(), args.name.as_deref(), args.tag.as_deref())?;

    if args.list {
        for case in &cases {
            println!("{}  [{}]  {}", case.name, case.tags.join(", "), case.description);
        }
        return Ok(());
    }

    config.reports.ensure_dirs()?;

    info!("Starting UtilityHub360 automation suite against {}", config.base_url);

    let mut runner = TestRunner::new(config);
    let result = runner.run(&cases).await;

    if let Some(html_report) = runner.write_reports() {
        info!("Test reports generated:");
        info!("   HTML Report: {}", html_report.display());
        info!("   JSON Report: {}", args.output.join("json/test_results.json").display());
        info!("   API Errors:  {}", args.output.join("json/api_errors.json").display());
        info!("   Screenshots: {}", args.output.join("screenshots").display());
    }

    println!(
        "{} total, {} passed, {} failed, {} skipped in {:.1}s",
        result.total,
        result.passed,
        result.failed,
        result.skipped,
        result.duration_ms as f64 / 1000.0
    );

    if !result.all_green() {
        std::process::exit(1);
    }
    Ok(())
}
