//! Report serialization
//!
//! Renders the store's current state to two artifacts: a pretty-printed JSON
//! document and a self-contained HTML page. Both are regenerated from scratch
//! and overwritten on every call; an I/O failure is logged and surfaced as a
//! `None` sentinel, never an error.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use hub360_common::{ReportDocument, ReportPaths, TestStatus};

use crate::report::store::ReportStore;

/// Renderer bound to the two report destinations.
pub struct ReportRenderer {
    json_path: PathBuf,
    html_path: PathBuf,
}

impl ReportRenderer {
    pub fn new(json_path: impl Into<PathBuf>, html_path: impl Into<PathBuf>) -> Self {
        Self { json_path: json_path.into(), html_path: html_path.into() }
    }

    pub fn from_paths(paths: &ReportPaths) -> Self {
        Self::new(&paths.json_report, &paths.html_report)
    }

    /// Build the aggregate document for the store's current state.
    pub fn build_document(&self, store: &ReportStore) -> ReportDocument {
        let results = store.test_results();
        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();

        ReportDocument {
            execution_date: store.started_at().to_string(),
            total_tests: results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            total_api_errors: store.api_errors().len(),
            test_results: results.to_vec(),
            api_errors: store.api_errors().to_vec(),
            screenshots: store.screenshots().to_vec(),
        }
    }

    /// Write the JSON report, overwriting any previous version.
    ///
    /// Returns the document on success, `None` after a logged I/O failure.
    pub fn generate_json_report(&self, store: &ReportStore) -> Option<ReportDocument> {
        let document = self.build_document(store);

        match write_json(&self.json_path, &document) {
            Ok(()) => {
                info!("JSON report generated: {}", self.json_path.display());
                Some(document)
            }
            Err(e) => {
                error!("Failed to generate JSON report: {}", e);
                None
            }
        }
    }

    /// Write the HTML report (regenerating the JSON one first).
    ///
    /// Returns the HTML path on success, `None` after a logged failure or
    /// when the JSON step already failed.
    pub fn generate_html_report(&self, store: &ReportStore) -> Option<PathBuf> {
        let document = self.generate_json_report(store)?;
        let html = render_html(&document);

        match write_text(&self.html_path, &html) {
            Ok(()) => {
                info!("HTML report generated: {}", self.html_path.display());
                Some(self.html_path.clone())
            }
            Err(e) => {
                error!("Failed to generate HTML report: {}", e);
                None
            }
        }
    }
}

fn write_json(path: &Path, document: &ReportDocument) -> hub360_common::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(document)?)?;
    Ok(())
}

fn write_text(path: &Path, text: &str) -> hub360_common::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Minimal HTML escape for text interpolated into the report.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the self-contained HTML document. No external assets.
fn render_html(report: &ReportDocument) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>UtilityHub360 Test Report</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #f5f5f5; padding: 20px; }}
        .container {{ max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 8px 8px 0 0; }}
        .header h1 {{ margin-bottom: 10px; }}
        .summary {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; padding: 30px; }}
        .summary-card {{ background: #f8f9fa; padding: 20px; border-radius: 8px; text-align: center; }}
        .summary-card h3 {{ font-size: 36px; margin-bottom: 5px; }}
        .summary-card p {{ color: #666; text-transform: uppercase; font-size: 12px; letter-spacing: 1px; }}
        .passed {{ color: #28a745; }}
        .failed {{ color: #dc3545; }}
        .skipped {{ color: #ffc107; }}
        .section {{ padding: 30px; border-top: 1px solid #eee; }}
        .section h2 {{ margin-bottom: 20px; color: #333; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 12px; text-align: left; border-bottom: 1px solid #eee; }}
        th {{ background: #f8f9fa; font-weight: 600; color: #666; }}
        .status {{ padding: 4px 12px; border-radius: 4px; font-size: 12px; font-weight: 600; }}
        .status.passed {{ background: #d4edda; color: #155724; }}
        .status.failed {{ background: #f8d7da; color: #721c24; }}
        .status.skipped {{ background: #fff3cd; color: #856404; }}
        .error-message {{ color: #dc3545; font-size: 12px; margin-top: 5px; }}
        .api-error {{ background: #f8d7da; padding: 15px; margin-bottom: 10px; border-left: 4px solid #dc3545; border-radius: 4px; }}
        .api-error strong {{ display: block; margin-bottom: 5px; }}
        .footer {{ padding: 20px; text-align: center; color: #666; border-top: 1px solid #eee; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>UtilityHub360 Test Execution Report</h1>
            <p>Execution Date: {execution_date}</p>
        </div>

        <div class="summary">
            <div class="summary-card">
                <h3>{total}</h3>
                <p>Total Tests</p>
            </div>
            <div class="summary-card">
                <h3 class="passed">{passed}</h3>
                <p>Passed</p>
            </div>
            <div class="summary-card">
                <h3 class="failed">{failed}</h3>
                <p>Failed</p>
            </div>
            <div class="summary-card">
                <h3 class="skipped">{skipped}</h3>
                <p>Skipped</p>
            </div>
        </div>

        <div class="section">
            <h2>Test Results</h2>
            <table>
                <thead>
                    <tr>
                        <th>Test Name</th>
                        <th>Status</th>
                        <th>Duration (s)</th>
                        <th>Error</th>
                    </tr>
                </thead>
                <tbody>
"#,
        execution_date = escape(&report.execution_date),
        total = report.total_tests,
        passed = report.passed,
        failed = report.failed,
        skipped = report.skipped,
    );

    for result in &report.test_results {
        let status_class = result.status.to_string().to_lowercase();
        let error_html = result
            .error_message
            .as_deref()
            .map(|msg| format!("<div class='error-message'>{}</div>", escape(msg)))
            .unwrap_or_default();

        let _ = write!(
            html,
            r#"                    <tr>
                        <td>{name}</td>
                        <td><span class="status {class}">{status}</span></td>
                        <td>{duration:.2}</td>
                        <td>{error}</td>
                    </tr>
"#,
            name = escape(&result.test_name),
            class = status_class,
            status = result.status,
            duration = result.duration,
            error = error_html,
        );
    }

    html.push_str(
        r#"                </tbody>
            </table>
        </div>
"#,
    );

    if !report.api_errors.is_empty() {
        let _ = write!(
            html,
            r#"        <div class="section">
            <h2>API Errors ({count})</h2>
"#,
            count = report.api_errors.len(),
        );

        for api_error in &report.api_errors {
            let _ = write!(
                html,
                r#"            <div class="api-error">
                <strong>Page: {page}</strong>
                <div>URL: {url}</div>
                <div>Status: {status}</div>
                <div>Error: {error}</div>
            </div>
"#,
                page = escape(&api_error.page),
                url = escape(&api_error.url),
                status = api_error.status,
                error = escape(&api_error.error),
            );
        }

        html.push_str("        </div>\n");
    }

    html.push_str(
        r#"        <div class="footer">
            <p>Generated by the UtilityHub360 Automation Suite</p>
        </div>
    </div>
</body>
</html>
"#,
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub360_common::TestStatus;

    fn renderer_in(dir: &Path) -> ReportRenderer {
        ReportRenderer::new(dir.join("json/test_results.json"), dir.join("html/test_report.html"))
    }

    #[test]
    fn counts_partition_the_results() {
        let mut store = ReportStore::new();
        store.add_test_result("p1", TestStatus::Passed, 0.5, None, None);
        store.add_test_result("p2", TestStatus::Passed, 0.4, None, None);
        store.add_test_result("f1", TestStatus::Failed, 0.3, Some("nope".into()), None);
        store.add_test_result("s1", TestStatus::Skipped, 0.0, None, None);

        let dir = tempfile::tempdir().unwrap();
        let report = renderer_in(dir.path()).generate_json_report(&store).unwrap();

        assert_eq!(report.total_tests, 4);
        assert_eq!(report.passed + report.failed + report.skipped, report.total_tests);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn two_result_scenario_matches_expected_document() {
        let mut store = ReportStore::new();
        store.add_test_result("t1", TestStatus::Passed, 1.2, None, None);
        store.add_test_result("t2", TestStatus::Failed, 0.5, Some("boom".into()), None);

        let dir = tempfile::tempdir().unwrap();
        let report = renderer_in(dir.path()).generate_json_report(&store).unwrap();

        assert_eq!(report.total_tests, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.test_results[1].error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn results_render_in_insertion_order() {
        let mut store = ReportStore::new();
        for name in ["A", "B", "C"] {
            store.add_test_result(name, TestStatus::Passed, 0.1, None, None);
        }

        let dir = tempfile::tempdir().unwrap();
        let report = renderer_in(dir.path()).generate_json_report(&store).unwrap();
        let names: Vec<&str> = report.test_results.iter().map(|r| r.test_name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn regeneration_without_new_records_is_byte_identical() {
        let mut store = ReportStore::new();
        store.add_test_result("t1", TestStatus::Passed, 1.0, None, None);

        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());

        renderer.generate_json_report(&store).unwrap();
        let first = std::fs::read(dir.path().join("json/test_results.json")).unwrap();

        renderer.generate_json_report(&store).unwrap();
        let second = std::fs::read(dir.path().join("json/test_results.json")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn json_failure_is_a_none_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        // Block directory creation by occupying the parent path with a file.
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();

        let renderer =
            ReportRenderer::new(blocker.join("json/test_results.json"), blocker.join("html/r.html"));
        let store = ReportStore::new();

        assert!(renderer.generate_json_report(&store).is_none());
        assert!(renderer.generate_html_report(&store).is_none());
    }

    #[test]
    fn html_report_embeds_results_and_escapes_markup() {
        let mut store = ReportStore::new();
        store.add_test_result(
            "auth::invalid_login",
            TestStatus::Failed,
            2.345,
            Some("<script>alert(1)</script>".into()),
            None,
        );
        store.add_api_error("/login", "/Auth/login?next=1", 401, "HTTP 401: Unauthorized");

        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        let path = renderer.generate_html_report(&store).unwrap();
        let html = std::fs::read_to_string(path).unwrap();

        assert!(html.contains("auth::invalid_login"));
        assert!(html.contains("2.35"));
        assert!(html.contains("API Errors (1)"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn html_report_omits_api_error_section_when_clean() {
        let mut store = ReportStore::new();
        store.add_test_result("t1", TestStatus::Passed, 0.2, None, None);

        let dir = tempfile::tempdir().unwrap();
        let path = renderer_in(dir.path()).generate_html_report(&store).unwrap();
        let html = std::fs::read_to_string(path).unwrap();

        assert!(!html.contains("API Errors"));
        assert!(html.contains("Test Results"));
    }
}
