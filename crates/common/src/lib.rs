//! UtilityHub360 E2E Common Library
//!
//! Shared record types, error handling, and suite configuration used by the
//! framework and the CLI harness.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{BrowserKind, PageUnderTest, ReportPaths, SuiteConfig, TestUser, PAGES_TO_TEST};
pub use error::{Error, Result};
pub use types::*;

/// Suite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
