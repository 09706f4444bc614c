//! Core record types for the E2E suite
//!
//! Everything here is an append-only record: created once, serialized into
//! the session reports, never mutated afterwards.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Produce the ISO-8601 timestamp used across all records.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// One observed network call from the page under test.
///
/// Records are appended at response/error time, so ordering within a page
/// session is by interception time, not request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// HTTP status; 0 is reserved for transport-level failure.
    #[serde(default)]
    pub status: u16,
    /// Wall-clock duration in milliseconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub timestamp: String,
}

fn default_method() -> String {
    "GET".to_string()
}

impl CallRecord {
    /// Whether this call classifies as an error (transport failure or HTTP >= 400).
    pub fn is_error(&self) -> bool {
        self.status == 0 || self.status >= 400
    }
}

/// A [`CallRecord`] classified as failed, with a human-readable cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub duration: u64,
    /// "HTTP <status>: <statusText>" or "Network Error" / exception message.
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub timestamp: String,
}

impl ErrorRecord {
    /// The URL with any query string stripped, for per-endpoint grouping.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// Outcome classification for one executed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "PASSED"),
            TestStatus::Failed => write!(f, "FAILED"),
            TestStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// One test execution outcome. Reruns of the same test produce one record
/// per attempt; `test_name` carries no uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_name: String,
    pub status: TestStatus,
    /// Duration in seconds.
    pub duration: f64,
    pub error_message: Option<String>,
    pub screenshot: Option<String>,
    pub timestamp: String,
}

impl TestResult {
    pub fn new(
        test_name: impl Into<String>,
        status: TestStatus,
        duration: f64,
        error_message: Option<String>,
        screenshot: Option<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            status,
            duration,
            error_message,
            screenshot,
            timestamp: now_iso8601(),
        }
    }
}

/// An API error tagged with the page (or test) it was observed on.
///
/// This is the report store's own copy, distinct from the monitor's buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageApiError {
    pub page: String,
    pub url: String,
    pub status: u16,
    pub error: String,
    pub timestamp: String,
}

/// Reference to a captured screenshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotRef {
    pub test_name: String,
    pub path: String,
    pub timestamp: String,
}

/// Aggregate snapshot of one test session, serialized to `test_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub execution_date: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_api_errors: usize,
    pub test_results: Vec<TestResult>,
    pub api_errors: Vec<PageApiError>,
    pub screenshots: Vec<ScreenshotRef>,
}

/// One element of the on-disk `api_errors.json` array: everything one test
/// saw through the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionErrorReport {
    pub test_name: String,
    pub timestamp: String,
    pub total_errors: usize,
    pub errors: Vec<ErrorRecord>,
    pub api_calls: Vec<CallRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_record_error_threshold() {
        let mut call = CallRecord {
            url: "/Loans".into(),
            method: "GET".into(),
            status: 200,
            duration: 12,
            timestamp: now_iso8601(),
        };
        assert!(!call.is_error());

        call.status = 404;
        assert!(call.is_error());

        call.status = 0;
        assert!(call.is_error());

        call.status = 399;
        assert!(!call.is_error());

        call.status = 400;
        assert!(call.is_error());
    }

    #[test]
    fn endpoint_strips_query_string() {
        let err = ErrorRecord {
            url: "/Loans?x=1".into(),
            method: "GET".into(),
            status: 500,
            duration: 3,
            error: "HTTP 500: Internal Server Error".into(),
            timestamp: now_iso8601(),
        };
        assert_eq!(err.endpoint(), "/Loans");

        let plain = ErrorRecord { url: "/Bills".into(), ..err };
        assert_eq!(plain.endpoint(), "/Bills");
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&TestStatus::Passed).unwrap(), "\"PASSED\"");
        assert_eq!(serde_json::to_string(&TestStatus::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(serde_json::to_string(&TestStatus::Skipped).unwrap(), "\"SKIPPED\"");
        assert_eq!(TestStatus::Skipped.to_string(), "SKIPPED");
    }

    #[test]
    fn call_record_defaults_method_to_get() {
        let call: CallRecord = serde_json::from_str(r#"{"url": "/Auth/me", "status": 200}"#).unwrap();
        assert_eq!(call.method, "GET");
    }
}
