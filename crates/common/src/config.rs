//! Suite configuration
//!
//! Defaults mirror the values the application team runs against; everything
//! can be overridden through `HUB360_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Browser to drive through the WebDriver endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    /// The W3C `browserName` capability value.
    pub fn browser_name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "MicrosoftEdge",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" => Ok(BrowserKind::Edge),
            other => Err(Error::InvalidConfig(format!("unsupported browser: {}", other))),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Firefox => write!(f, "firefox"),
            BrowserKind::Edge => write!(f, "edge"),
        }
    }
}

/// Credentials for a seeded test account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestUser {
    pub email: String,
    pub password: String,
}

/// One entry of the page regression table.
#[derive(Debug, Clone, Serialize)]
pub struct PageUnderTest {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
}

/// Report output locations, all rooted under one reports directory.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json_report: PathBuf,
    pub html_report: PathBuf,
    pub api_errors: PathBuf,
    pub screenshots_dir: PathBuf,
}

impl ReportPaths {
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            json_report: root.join("json").join("test_results.json"),
            html_report: root.join("html").join("test_report.html"),
            api_errors: root.join("json").join("api_errors.json"),
            screenshots_dir: root.join("screenshots"),
        }
    }

    /// Create every directory a report write may touch.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.json_report.parent(),
            self.html_report.parent(),
            self.api_errors.parent(),
            Some(self.screenshots_dir.as_path()),
        ]
        .into_iter()
        .flatten()
        {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Top-level suite configuration.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Application under test.
    pub base_url: String,

    /// Backend API base, used for log context only.
    pub api_base_url: String,

    /// WebDriver endpoint (chromedriver/geckodriver/selenium).
    pub webdriver_url: String,

    pub browser: BrowserKind,
    pub headless: bool,
    pub window_size: (u32, u32),

    /// Driver-side implicit wait.
    pub implicit_wait: Duration,
    /// Default timeout for explicit waits.
    pub explicit_wait: Duration,
    pub page_load_timeout: Duration,

    pub screenshot_on_failure: bool,
    /// How many times a failed test is rerun.
    pub retry_failed: u32,

    pub reports: ReportPaths,

    pub valid_user: TestUser,
    pub admin_user: TestUser,
    pub invalid_user: TestUser,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_base_url: "https://api.utilityhub360.com/api".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: false,
            window_size: (1920, 1080),
            implicit_wait: Duration::from_secs(10),
            explicit_wait: Duration::from_secs(20),
            page_load_timeout: Duration::from_secs(30),
            screenshot_on_failure: true,
            retry_failed: 1,
            reports: ReportPaths::under("reports"),
            valid_user: TestUser {
                email: "test@utilityhub360.com".to_string(),
                password: "Test@123456".to_string(),
            },
            admin_user: TestUser {
                email: "admin@utilityhub360.com".to_string(),
                password: "Admin@123456".to_string(),
            },
            invalid_user: TestUser {
                email: "invalid@test.com".to_string(),
                password: "WrongPassword".to_string(),
            },
        }
    }
}

impl SuiteConfig {
    /// Build a configuration from defaults plus `HUB360_*` env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("HUB360_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(url) = std::env::var("HUB360_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("HUB360_WEBDRIVER_URL") {
            config.webdriver_url = url;
        }
        if let Ok(browser) = std::env::var("HUB360_BROWSER") {
            config.browser = browser.parse()?;
        }
        if let Ok(headless) = std::env::var("HUB360_HEADLESS") {
            config.headless = headless.eq_ignore_ascii_case("true") || headless == "1";
        }
        if let Ok(dir) = std::env::var("HUB360_REPORTS_DIR") {
            config.reports = ReportPaths::under(dir);
        }

        Ok(config)
    }

    /// Absolute URL for an application path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// The page regression table: every routed page of the application.
pub const PAGES_TO_TEST: &[PageUnderTest] = &[
    PageUnderTest { name: "Login", path: "/login", requires_auth: false },
    PageUnderTest { name: "Register", path: "/register", requires_auth: false },
    PageUnderTest { name: "Dashboard", path: "/dashboard", requires_auth: true },
    PageUnderTest { name: "Settings", path: "/settings", requires_auth: true },
    PageUnderTest { name: "Bills", path: "/bills", requires_auth: true },
    PageUnderTest { name: "Loans", path: "/loans", requires_auth: true },
    PageUnderTest { name: "Transactions", path: "/transactions", requires_auth: true },
    PageUnderTest { name: "Bank Accounts", path: "/bank-accounts", requires_auth: true },
    PageUnderTest { name: "Apportioner", path: "/apportioner", requires_auth: true },
    PageUnderTest { name: "Savings", path: "/savings", requires_auth: true },
    PageUnderTest { name: "Notifications", path: "/notifications", requires_auth: true },
    PageUnderTest { name: "Reports", path: "/reports", requires_auth: true },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_double_slash() {
        let mut config = SuiteConfig::default();
        config.base_url = "http://localhost:3000/".to_string();
        assert_eq!(config.url_for("/login"), "http://localhost:3000/login");
    }

    #[test]
    fn browser_kind_parses() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert!("safari".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn report_paths_layout() {
        let paths = ReportPaths::under("reports");
        assert_eq!(paths.json_report, PathBuf::from("reports/json/test_results.json"));
        assert_eq!(paths.html_report, PathBuf::from("reports/html/test_report.html"));
        assert_eq!(paths.api_errors, PathBuf::from("reports/json/api_errors.json"));
    }

    #[test]
    fn regression_table_covers_auth_split() {
        assert_eq!(PAGES_TO_TEST.len(), 12);
        assert_eq!(PAGES_TO_TEST.iter().filter(|p| !p.requires_auth).count(), 2);
    }
}
