//! UtilityHub360 E2E Test Framework
//!
//! This crate provides a Rust-controlled E2E testing framework that:
//! - Drives a real browser through the W3C WebDriver protocol
//! - Observes the page's API traffic through an injected monitor
//! - Accumulates results in a session-scoped report store
//! - Renders JSON and self-contained HTML reports at session end
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── BrowserSession (one per test, WebDriver over HTTP)   │
//! │    ├── ApiMonitor (injected fetch/XHR interception)         │
//! │    ├── ReportStore (append-only session accumulator)        │
//! │    └── ReportRenderer (test_results.json + test_report.html)│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suites                                                     │
//! │    ├── auth: login flows and validation                     │
//! │    ├── dashboard: post-login dashboard behavior             │
//! │    └── regression: every routed page, parameterized         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod monitor;
pub mod pages;
pub mod report;
pub mod runner;
pub mod session;
pub mod suites;

pub use monitor::{ApiMonitor, ErrorSummary};
pub use report::{ReportRenderer, ReportStore};
pub use runner::{SuiteResult, TestCase, TestContext, TestRunner};
pub use session::{BrowserSession, Locator};
