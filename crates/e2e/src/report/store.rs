//! Session-scoped result accumulator
//!
//! One store per test session, append-only for its whole lifetime. Nothing is
//! ever removed or edited; reruns of a test simply append another record.

use hub360_common::types::now_iso8601;
use hub360_common::{PageApiError, ScreenshotRef, TestResult, TestStatus};

/// In-memory accumulator for one test session.
#[derive(Debug)]
pub struct ReportStore {
    /// Session start time; reused as the report's execution date so that
    /// rendering the same store twice produces identical output.
    started_at: String,
    test_results: Vec<TestResult>,
    api_errors: Vec<PageApiError>,
    screenshots: Vec<ScreenshotRef>,
}

impl ReportStore {
    /// Create the store at session start.
    pub fn new() -> Self {
        Self {
            started_at: now_iso8601(),
            test_results: Vec::new(),
            api_errors: Vec::new(),
            screenshots: Vec::new(),
        }
    }

    /// Append one test outcome. No uniqueness constraint on `test_name`.
    pub fn add_test_result(
        &mut self,
        test_name: impl Into<String>,
        status: TestStatus,
        duration: f64,
        error_message: Option<String>,
        screenshot_path: Option<String>,
    ) {
        self.test_results.push(TestResult::new(
            test_name,
            status,
            duration,
            error_message,
            screenshot_path,
        ));
    }

    /// Append a page-tagged API error (the store's own copy, independent of
    /// any monitor buffer).
    pub fn add_api_error(
        &mut self,
        page: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        error: impl Into<String>,
    ) {
        self.api_errors.push(PageApiError {
            page: page.into(),
            url: url.into(),
            status,
            error: error.into(),
            timestamp: now_iso8601(),
        });
    }

    /// Append a screenshot reference.
    pub fn add_screenshot(&mut self, test_name: impl Into<String>, path: impl Into<String>) {
        self.screenshots.push(ScreenshotRef {
            test_name: test_name.into(),
            path: path.into(),
            timestamp: now_iso8601(),
        });
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    pub fn test_results(&self) -> &[TestResult] {
        &self.test_results
    }

    pub fn api_errors(&self) -> &[PageApiError] {
        &self.api_errors
    }

    pub fn screenshots(&self) -> &[ScreenshotRef] {
        &self.screenshots
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_insertion_order() {
        let mut store = ReportStore::new();
        store.add_test_result("a", TestStatus::Passed, 0.1, None, None);
        store.add_test_result("b", TestStatus::Failed, 0.2, Some("x".into()), None);
        store.add_test_result("c", TestStatus::Skipped, 0.0, None, None);

        let names: Vec<&str> = store.test_results().iter().map(|r| r.test_name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let mut store = ReportStore::new();
        store.add_test_result("flaky", TestStatus::Failed, 1.0, Some("first try".into()), None);
        store.add_test_result("flaky", TestStatus::Passed, 0.9, None, None);
        assert_eq!(store.test_results().len(), 2);
    }

    #[test]
    fn api_errors_and_screenshots_accumulate() {
        let mut store = ReportStore::new();
        store.add_api_error("/dashboard", "/Loans", 500, "HTTP 500: Internal Server Error");
        store.add_screenshot("auth::login", "reports/screenshots/auth_login.png");

        assert_eq!(store.api_errors().len(), 1);
        assert_eq!(store.api_errors()[0].page, "/dashboard");
        assert_eq!(store.screenshots().len(), 1);
    }
}
