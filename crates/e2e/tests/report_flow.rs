//! End-to-end flow of the reporting subsystem: a simulated session feeding
//! the store, rendering both artifacts, and appending monitor reports.

use hub360_common::{ReportDocument, SessionErrorReport, TestStatus};
use hub360_e2e::report::{ReportRenderer, ReportStore};

#[test]
fn full_session_report_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("json/test_results.json");
    let html_path = dir.path().join("html/test_report.html");

    let mut store = ReportStore::new();

    // A session with a retried failure: first attempt failed, rerun passed.
    store.add_test_result("auth::login_page_loads", TestStatus::Passed, 1.8, None, None);
    store.add_test_result(
        "auth::valid_login",
        TestStatus::Failed,
        4.2,
        Some("login as test@utilityhub360.com did not reach the dashboard".into()),
        Some("reports/screenshots/auth__valid_login_20260806_101512.png".into()),
    );
    store.add_test_result("auth::valid_login", TestStatus::Passed, 3.9, None, None);
    store.add_test_result(
        "dashboard::unemployed_checkbox",
        TestStatus::Skipped,
        0.6,
        Some("profile modal not visible".into()),
        None,
    );
    store.add_api_error(
        "http://localhost:3000/dashboard",
        "/Notifications?unread=1",
        500,
        "HTTP 500: Internal Server Error",
    );
    store.add_screenshot(
        "auth::valid_login",
        "reports/screenshots/auth__valid_login_20260806_101512.png",
    );

    let renderer = ReportRenderer::new(&json_path, &html_path);
    let html = renderer.generate_html_report(&store).expect("html report");
    assert_eq!(html, html_path);

    // The JSON artifact was produced by the HTML step and partitions cleanly.
    let document: ReportDocument =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(document.total_tests, 4);
    assert_eq!(document.passed + document.failed + document.skipped, document.total_tests);
    assert_eq!(document.passed, 2);
    assert_eq!(document.failed, 1);
    assert_eq!(document.skipped, 1);
    assert_eq!(document.total_api_errors, 1);

    // Both attempts of the retried test are present, in attempt order.
    let attempts: Vec<_> = document
        .test_results
        .iter()
        .filter(|r| r.test_name == "auth::valid_login")
        .collect();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].status, TestStatus::Failed);
    assert_eq!(attempts[1].status, TestStatus::Passed);

    let html_text = std::fs::read_to_string(&html_path).unwrap();
    assert!(html_text.contains("dashboard::unemployed_checkbox"));
    assert!(html_text.contains("API Errors (1)"));
    assert!(html_text.contains("/Notifications?unread=1"));

    // A second render of the unchanged store replaces the files in place
    // with identical content.
    let before = std::fs::read(&json_path).unwrap();
    renderer.generate_html_report(&store).expect("second render");
    assert_eq!(std::fs::read(&json_path).unwrap(), before);
}

#[test]
fn monitor_file_accumulates_across_tests() {
    use hub360_e2e::ApiMonitor;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api_errors.json");

    // Two tests write their sessions in sequence; the array grows in order.
    ApiMonitor::new(&path).save_errors_to_file("regression::page_loads[Loans]");
    ApiMonitor::new(&path).save_errors_to_file("regression::page_loads[Bills]");

    let reports: Vec<SessionErrorReport> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].test_name, "regression::page_loads[Loans]");
    assert_eq!(reports[1].test_name, "regression::page_loads[Bills]");
}
