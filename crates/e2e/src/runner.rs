//! Test runner
//!
//! Executes registered test cases sequentially, one fresh browser session per
//! case, and feeds everything the session produced (result, screenshots,
//! API errors) into the report store.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use hub360_common::{Error, PageUnderTest, Result, SuiteConfig, TestStatus, TestUser};

use crate::monitor::ApiMonitor;
use crate::pages::LoginPage;
use crate::report::{ReportRenderer, ReportStore};
use crate::session::BrowserSession;

/// Boxed future returned by a test body.
pub type TestFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A plain test body: borrows the context for the duration of the test.
pub type TestFn = for<'a> fn(&'a mut TestContext) -> TestFuture<'a>;

/// A test body parameterized over one entry of the page table.
pub type PageTestFn = for<'a> fn(&'a mut TestContext, &'static PageUnderTest) -> TestFuture<'a>;

/// How a case is invoked.
#[derive(Clone, Copy)]
pub enum TestBody {
    Plain(TestFn),
    /// One instantiation of a page-parameterized check.
    PerPage(PageTestFn, &'static PageUnderTest),
}

/// One registered test case.
#[derive(Clone)]
pub struct TestCase {
    /// Qualified name: "suite::case" or "suite::case[Param]".
    pub name: String,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub body: TestBody,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Everything a test body gets to work with.
pub struct TestContext {
    pub config: SuiteConfig,
    pub session: BrowserSession,
    pub monitor: ApiMonitor,
}

impl TestContext {
    /// Navigate to an application path and re-install the monitor, which a
    /// fresh page load has wiped.
    pub async fn goto(&mut self, path: &str) -> Result<()> {
        self.session.open(path).await?;
        self.monitor.inject(&self.session).await;
        Ok(())
    }

    /// Log in as the given user and wait for the dashboard redirect.
    pub async fn login_as(&mut self, user: &TestUser) -> Result<()> {
        let (email, password) = (user.email.clone(), user.password.clone());
        self.goto(LoginPage::PATH).await?;
        LoginPage::new(&self.session).login(&email, &password).await?;

        if !self.session.wait_for_url_contains("/dashboard", Duration::from_secs(15)).await {
            return Err(Error::AssertionFailed(format!(
                "login as {} did not reach the dashboard",
                email
            )));
        }
        Ok(())
    }
}

/// Aggregate outcome of one runner invocation.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl SuiteResult {
    pub fn all_green(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome of a single attempt at a case.
struct AttemptOutcome {
    status: TestStatus,
    duration: f64,
    error_message: Option<String>,
    screenshot: Option<String>,
}

/// Main suite runner: owns the session store and the report destinations.
pub struct TestRunner {
    config: SuiteConfig,
    store: ReportStore,
    renderer: ReportRenderer,
}

impl TestRunner {
    pub fn new(config: SuiteConfig) -> Self {
        let renderer = ReportRenderer::from_paths(&config.reports);
        Self { config, store: ReportStore::new(), renderer }
    }

    /// Run a list of cases, recording every attempt in the store.
    ///
    /// Failed cases are retried `retry_failed` times; each attempt appends
    /// its own record, and the suite counters reflect the final attempt.
    pub async fn run(&mut self, cases: &[TestCase]) -> SuiteResult {
        let start = Instant::now();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        info!("Running {} test(s)...", cases.len());

        for case in cases {
            let mut outcome = self.run_attempt(case).await;

            let mut retries_left = self.config.retry_failed;
            while outcome.status == TestStatus::Failed && retries_left > 0 {
                warn!("Retrying failed test: {}", case.name);
                self.record(case, &outcome);
                outcome = self.run_attempt(case).await;
                retries_left -= 1;
            }
            self.record(case, &outcome);

            match outcome.status {
                TestStatus::Passed => {
                    passed += 1;
                    info!("✓ {} ({:.2} s)", case.name, outcome.duration);
                }
                TestStatus::Skipped => {
                    skipped += 1;
                    info!(
                        "- {} skipped: {}",
                        case.name,
                        outcome.error_message.as_deref().unwrap_or("")
                    );
                }
                TestStatus::Failed => {
                    failed += 1;
                    error!(
                        "✗ {} - {}",
                        case.name,
                        outcome.error_message.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        SuiteResult { total: cases.len(), passed, failed, skipped, duration_ms }
    }

    /// One attempt: fresh session, run the body, classify, capture, drain.
    async fn run_attempt(&mut self, case: &TestCase) -> AttemptOutcome {
        let session = match BrowserSession::start(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                return AttemptOutcome {
                    status: TestStatus::Failed,
                    duration: 0.0,
                    error_message: Some(e.to_string()),
                    screenshot: None,
                }
            }
        };

        let mut ctx = TestContext {
            config: self.config.clone(),
            session,
            monitor: ApiMonitor::new(self.config.reports.api_errors.clone()),
        };

        let start = Instant::now();
        let result = match case.body {
            TestBody::Plain(f) => f(&mut ctx).await,
            TestBody::PerPage(f, page) => f(&mut ctx, page).await,
        };
        let duration = start.elapsed().as_secs_f64();

        let (status, error_message) = match result {
            Ok(()) => (TestStatus::Passed, None),
            Err(Error::Skipped(reason)) => (TestStatus::Skipped, Some(reason)),
            Err(e) => (TestStatus::Failed, Some(e.to_string())),
        };

        let screenshot = if status == TestStatus::Failed && self.config.screenshot_on_failure {
            self.capture_failure_screenshot(&case.name, &ctx.session).await
        } else {
            None
        };

        self.drain_monitor(&case.name, &mut ctx).await;

        if let Err(e) = ctx.session.close().await {
            warn!("Failed to close session for {}: {}", case.name, e);
        }

        AttemptOutcome { status, duration, error_message, screenshot }
    }

    /// Screenshot the failed page. Best effort; a broken session just logs.
    async fn capture_failure_screenshot(
        &mut self,
        test_name: &str,
        session: &BrowserSession,
    ) -> Option<String> {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.png", sanitize_test_name(test_name), timestamp);
        let path = self.config.reports.screenshots_dir.join(filename);

        match session.screenshot(&path).await {
            Ok(()) => {
                let path = path.to_string_lossy().to_string();
                self.store.add_screenshot(test_name, path.clone());
                Some(path)
            }
            Err(e) => {
                error!("Failed to take screenshot: {}", e);
                None
            }
        }
    }

    /// Pull whatever the monitor buffered, tag it, and persist it.
    async fn drain_monitor(&mut self, test_name: &str, ctx: &mut TestContext) {
        ctx.monitor.get_errors(&ctx.session).await;
        ctx.monitor.get_api_calls(&ctx.session).await;

        if ctx.monitor.errors().is_empty() {
            return;
        }

        let page = ctx
            .session
            .current_url()
            .await
            .unwrap_or_else(|_| test_name.to_string());

        warn!("{} API error(s) detected during {}", ctx.monitor.errors().len(), test_name);
        let drained: Vec<_> = ctx.monitor.errors().to_vec();
        for api_error in drained {
            self.store.add_api_error(page.clone(), api_error.url, api_error.status, api_error.error);
        }

        ctx.monitor.save_errors_to_file(test_name);
    }

    fn record(&mut self, case: &TestCase, outcome: &AttemptOutcome) {
        self.store.add_test_result(
            case.name.clone(),
            outcome.status,
            outcome.duration,
            outcome.error_message.clone(),
            outcome.screenshot.clone(),
        );
    }

    /// Flush the store to the JSON and HTML artifacts.
    pub fn write_reports(&self) -> Option<std::path::PathBuf> {
        self.renderer.generate_html_report(&self.store)
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }
}

/// Select the cases to run: an exact name wins, then a tag filter.
pub fn select_cases(
    cases: &[TestCase],
    name: Option<&str>,
    tag: Option<&str>,
) -> Result<Vec<TestCase>> {
    if let Some(name) = name {
        return cases
            .iter()
            .find(|c| c.name == name)
            .map(|c| vec![c.clone()])
            .ok_or_else(|| Error::TestNotFound(name.to_string()));
    }

    let selected: Vec<TestCase> = match tag {
        Some(tag) => cases.iter().filter(|c| c.tags.contains(&tag)).cloned().collect(),
        None => cases.to_vec(),
    };
    Ok(selected)
}

/// Make a test name safe for use as a file name.
fn sanitize_test_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ctx: &mut TestContext) -> TestFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn case(name: &str, tags: &'static [&'static str]) -> TestCase {
        TestCase { name: name.to_string(), description: "", tags, body: TestBody::Plain(noop) }
    }

    #[test]
    fn select_by_exact_name() {
        let cases = [case("auth::login", &["auth"]), case("dash::loads", &["smoke"])];
        let selected = select_cases(&cases, Some("dash::loads"), None).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "dash::loads");

        assert!(matches!(
            select_cases(&cases, Some("missing"), None),
            Err(Error::TestNotFound(_))
        ));
    }

    #[test]
    fn select_by_tag() {
        let cases = [
            case("auth::login", &["auth", "smoke"]),
            case("auth::logout", &["auth"]),
            case("dash::loads", &["smoke"]),
        ];
        let selected = select_cases(&cases, None, Some("smoke")).unwrap();
        let names: Vec<&str> = selected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["auth::login", "dash::loads"]);
    }

    #[test]
    fn select_everything_by_default() {
        let cases = [case("a", &[]), case("b", &[])];
        assert_eq!(select_cases(&cases, None, None).unwrap().len(), 2);
    }

    #[test]
    fn sanitized_names_are_filesystem_safe() {
        assert_eq!(
            sanitize_test_name("regression::page_loads[Bank Accounts]"),
            "regression__page_loads_Bank_Accounts_"
        );
    }
}
