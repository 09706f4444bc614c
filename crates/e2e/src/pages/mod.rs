//! Page objects
//!
//! Typed wrappers over [`BrowserSession`](crate::session::BrowserSession) for
//! the application pages the suites exercise. Pages never navigate on their
//! own; navigation goes through the test context so the API monitor is
//! re-injected on every page load.

pub mod dashboard;
pub mod login;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
