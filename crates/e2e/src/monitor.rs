//! In-page API call monitor
//!
//! Patches the page's `fetch` and `XMLHttpRequest` entry points with a
//! passive side-channel: every completed call is appended to the page-global
//! `window.apiCalls` buffer, and failed calls (transport failure or HTTP
//! status >= 400) additionally land in `window.apiErrors`. The wrapped call's
//! outcome is never altered.
//!
//! The monitor itself lives outside the page and only ever reaches it through
//! script execution; a communication failure degrades to an empty result and
//! a log line, never an error to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use hub360_common::types::now_iso8601;
use hub360_common::{CallRecord, ErrorRecord, Result, SessionErrorReport};

use crate::session::BrowserSession;

/// The interception script. Installed once per page load; the page-global
/// flag makes re-injection a no-op until the next navigation wipes it.
const MONITOR_SCRIPT: &str = r#"
if (window.__hub360MonitorInstalled) { return; }
window.__hub360MonitorInstalled = true;
window.apiErrors = [];
window.apiCalls = [];

const originalFetch = window.fetch;
window.fetch = function(...args) {
    const url = typeof args[0] === 'string' ? args[0] : (args[0] && args[0].url) || String(args[0]);
    const startTime = Date.now();

    return originalFetch.apply(this, args)
        .then(response => {
            const callInfo = {
                url: url,
                method: (args[1] && args[1].method) || 'GET',
                status: response.status,
                duration: Date.now() - startTime,
                timestamp: new Date().toISOString()
            };

            window.apiCalls.push(callInfo);

            if (!response.ok) {
                window.apiErrors.push(Object.assign({}, callInfo, {
                    error: 'HTTP ' + response.status + ': ' + response.statusText
                }));
            }

            return response;
        })
        .catch(err => {
            const errorInfo = {
                url: url,
                method: (args[1] && args[1].method) || 'GET',
                status: 0,
                duration: Date.now() - startTime,
                error: err.message || 'Network Error',
                timestamp: new Date().toISOString()
            };

            window.apiErrors.push(errorInfo);
            window.apiCalls.push(errorInfo);

            throw err;
        });
};

const originalXHROpen = XMLHttpRequest.prototype.open;
const originalXHRSend = XMLHttpRequest.prototype.send;

XMLHttpRequest.prototype.open = function(method, url) {
    this._method = method;
    this._url = url;
    this._startTime = Date.now();
    return originalXHROpen.apply(this, arguments);
};

XMLHttpRequest.prototype.send = function() {
    this.addEventListener('load', function() {
        const callInfo = {
            url: this._url,
            method: this._method,
            status: this.status,
            duration: Date.now() - this._startTime,
            timestamp: new Date().toISOString()
        };

        window.apiCalls.push(callInfo);

        if (this.status >= 400) {
            window.apiErrors.push(Object.assign({}, callInfo, {
                error: 'HTTP ' + this.status + ': ' + this.statusText
            }));
        }
    });

    this.addEventListener('error', function() {
        const errorInfo = {
            url: this._url,
            method: this._method,
            status: 0,
            duration: Date.now() - this._startTime,
            error: 'Network Error',
            timestamp: new Date().toISOString()
        };

        window.apiErrors.push(errorInfo);
        window.apiCalls.push(errorInfo);
    });

    return originalXHRSend.apply(this, arguments);
};
"#;

/// Summary of the errors a monitor has accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSummary {
    /// No API errors detected.
    Clean,
    Breakdown {
        total_errors: usize,
        /// Status rendered as a string key ("0", "404", ...).
        by_status: BTreeMap<String, usize>,
        /// URL with the query string stripped.
        by_endpoint: BTreeMap<String, usize>,
    },
}

impl std::fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSummary::Clean => write!(f, "No API errors detected"),
            ErrorSummary::Breakdown { total_errors, by_status, by_endpoint } => {
                write!(
                    f,
                    "{} API error(s) across {} status(es) and {} endpoint(s)",
                    total_errors,
                    by_status.len(),
                    by_endpoint.len()
                )
            }
        }
    }
}

/// Observer for the page's network calls.
///
/// Function-scoped: one monitor per test. The in-page buffers die with the
/// page; whatever was not pulled through an accessor before session end is
/// lost.
pub struct ApiMonitor {
    errors: Vec<ErrorRecord>,
    api_calls: Vec<CallRecord>,
    report_path: PathBuf,
}

impl ApiMonitor {
    /// Create a monitor writing its session reports to `report_path`.
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self { errors: Vec::new(), api_calls: Vec::new(), report_path: report_path.into() }
    }

    /// Install the interception script into the current page.
    pub async fn inject(&self, session: &BrowserSession) {
        match session.execute(MONITOR_SCRIPT, vec![]).await {
            Ok(_) => debug!("API monitoring script injected"),
            Err(e) => error!("Failed to inject monitoring script: {}", e),
        }
    }

    /// Pull the page's error buffer, accumulating into the monitor.
    pub async fn get_errors(&mut self, session: &BrowserSession) -> Vec<ErrorRecord> {
        match session.execute("return window.apiErrors || [];", vec![]).await {
            Ok(value) => {
                let batch = parse_records::<ErrorRecord>(value, "apiErrors");
                self.errors.extend(batch.iter().cloned());
                batch
            }
            Err(e) => {
                error!("Failed to get API errors: {}", e);
                Vec::new()
            }
        }
    }

    /// Pull the page's call buffer (all calls, not just errors).
    pub async fn get_api_calls(&mut self, session: &BrowserSession) -> Vec<CallRecord> {
        match session.execute("return window.apiCalls || [];", vec![]).await {
            Ok(value) => {
                let batch = parse_records::<CallRecord>(value, "apiCalls");
                self.api_calls.extend(batch.iter().cloned());
                batch
            }
            Err(e) => {
                error!("Failed to get API calls: {}", e);
                Vec::new()
            }
        }
    }

    /// Reset both page-global buffers, e.g. between test phases.
    pub async fn clear_errors(&self, session: &BrowserSession) {
        match session.execute("window.apiErrors = []; window.apiCalls = [];", vec![]).await {
            Ok(_) => debug!("API errors cleared"),
            Err(e) => error!("Failed to clear API errors: {}", e),
        }
    }

    /// Append everything this monitor accumulated to the on-disk error report.
    ///
    /// Read-modify-write on a shared file: not safe for concurrent writers,
    /// callers running tests in parallel must serialize access themselves.
    pub fn save_errors_to_file(&self, test_name: &str) {
        let report = SessionErrorReport {
            test_name: test_name.to_string(),
            timestamp: now_iso8601(),
            total_errors: self.errors.len(),
            errors: self.errors.clone(),
            api_calls: self.api_calls.clone(),
        };

        match append_session_report(&self.report_path, report) {
            Ok(()) => info!("API errors saved to {}", self.report_path.display()),
            Err(e) => error!("Failed to save API errors: {}", e),
        }
    }

    /// Summarize accumulated errors by status and endpoint.
    pub fn error_summary(&self) -> ErrorSummary {
        summarize(&self.errors)
    }

    /// Errors accumulated across all `get_errors` calls.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Calls accumulated across all `get_api_calls` calls.
    pub fn api_calls(&self) -> &[CallRecord] {
        &self.api_calls
    }
}

/// Deserialize a page buffer, tolerating junk by dropping it with a log line.
fn parse_records<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    error!("Dropping malformed {} entry: {}", what, e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            error!("Unexpected {} payload: {}", what, other);
            Vec::new()
        }
    }
}

/// Build the status/endpoint breakdown for a set of error records.
pub fn summarize(errors: &[ErrorRecord]) -> ErrorSummary {
    if errors.is_empty() {
        return ErrorSummary::Clean;
    }

    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_endpoint: BTreeMap<String, usize> = BTreeMap::new();

    for error in errors {
        *by_status.entry(error.status.to_string()).or_default() += 1;
        *by_endpoint.entry(error.endpoint().to_string()).or_default() += 1;
    }

    ErrorSummary::Breakdown { total_errors: errors.len(), by_status, by_endpoint }
}

/// Append one session report to the JSON array file (created if missing).
fn append_session_report(path: &Path, report: SessionErrorReport) -> Result<()> {
    let mut reports: Vec<SessionErrorReport> = if path.exists() {
        serde_json::from_str(&std::fs::read_to_string(path)?)?
    } else {
        Vec::new()
    };

    reports.push(report);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&reports)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_record(url: &str, status: u16) -> ErrorRecord {
        ErrorRecord {
            url: url.to_string(),
            method: "GET".to_string(),
            status,
            duration: 5,
            error: if status == 0 {
                "Network Error".to_string()
            } else {
                format!("HTTP {}: boom", status)
            },
            timestamp: now_iso8601(),
        }
    }

    #[test]
    fn summary_is_clean_without_errors() {
        assert_eq!(summarize(&[]), ErrorSummary::Clean);
        assert_eq!(summarize(&[]).to_string(), "No API errors detected");
    }

    #[test]
    fn summary_groups_endpoints_ignoring_query() {
        let errors = vec![
            error_record("/Loans?x=1", 500),
            error_record("/Loans?y=2", 404),
            error_record("/Bills", 0),
        ];

        match summarize(&errors) {
            ErrorSummary::Breakdown { total_errors, by_status, by_endpoint } => {
                assert_eq!(total_errors, 3);
                assert_eq!(by_endpoint.get("/Loans"), Some(&2));
                assert_eq!(by_endpoint.get("/Bills"), Some(&1));
                assert_eq!(by_status.get("500"), Some(&1));
                assert_eq!(by_status.get("404"), Some(&1));
                assert_eq!(by_status.get("0"), Some(&1));
            }
            ErrorSummary::Clean => panic!("expected a breakdown"),
        }
    }

    #[test]
    fn session_reports_append_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_errors.json");

        let mut monitor = ApiMonitor::new(&path);
        monitor.errors.push(error_record("/Auth/login", 401));
        monitor.save_errors_to_file("auth::invalid_login");

        let monitor2 = ApiMonitor::new(&path);
        monitor2.save_errors_to_file("dashboard::loads");

        let reports: Vec<SessionErrorReport> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].test_name, "auth::invalid_login");
        assert_eq!(reports[0].total_errors, 1);
        assert_eq!(reports[1].test_name, "dashboard::loads");
        assert_eq!(reports[1].total_errors, 0);
    }

    #[test]
    fn save_swallows_unwritable_destination() {
        // A file used as a directory makes the write fail; the monitor must
        // log and carry on rather than propagate.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let monitor = ApiMonitor::new(blocker.join("api_errors.json"));
        monitor.save_errors_to_file("any");
    }

    #[test]
    fn parse_records_drops_malformed_entries() {
        let value = serde_json::json!([
            { "url": "/Loans", "method": "GET", "status": 500, "duration": 3,
              "error": "HTTP 500: Internal Server Error", "timestamp": "t" },
            "garbage",
        ]);
        let records = parse_records::<ErrorRecord>(value, "apiErrors");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, 500);
    }

    #[test]
    fn monitor_script_guards_reinjection() {
        assert!(MONITOR_SCRIPT.contains("__hub360MonitorInstalled"));
        assert!(MONITOR_SCRIPT.contains("window.apiErrors = []"));
        assert!(MONITOR_SCRIPT.contains("window.apiCalls = []"));
    }
}
