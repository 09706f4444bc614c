//! Built-in test suites
//!
//! The Rust rendering of the application's test modules: each suite exposes a
//! `cases()` registry, and `all_cases` concatenates them in execution order.

pub mod auth;
pub mod dashboard;
pub mod regression;

use hub360_common::{Error, Result};

use crate::runner::{TestBody, TestCase, TestFn};

/// Every registered case, in suite order.
pub fn all_cases() -> Vec<TestCase> {
    let mut cases = Vec::new();
    cases.extend(auth::cases());
    cases.extend(dashboard::cases());
    cases.extend(regression::cases());
    cases
}

/// Build an unparameterized case.
fn plain(
    name: &str,
    description: &'static str,
    tags: &'static [&'static str],
    run: TestFn,
) -> TestCase {
    TestCase { name: name.to_string(), description, tags, body: TestBody::Plain(run) }
}

/// Assertion helper: fail the test with a readable message.
fn ensure(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::AssertionFailed(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_names_are_unique() {
        let cases = all_cases();
        let names: HashSet<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), cases.len());
    }

    #[test]
    fn registry_covers_all_suites() {
        let cases = all_cases();
        assert_eq!(cases.iter().filter(|c| c.name.starts_with("auth::")).count(), 7);
        assert_eq!(cases.iter().filter(|c| c.name.starts_with("dashboard::")).count(), 5);
        // 12 pages load + 12 titles + 10 protected-page checks
        assert_eq!(cases.iter().filter(|c| c.name.starts_with("regression::")).count(), 34);
    }

    #[test]
    fn every_case_is_tagged_with_its_suite() {
        for case in all_cases() {
            let suite = case.name.split("::").next().unwrap();
            assert!(
                case.tags.contains(&suite),
                "{} is missing its suite tag {}",
                case.name,
                suite
            );
        }
    }
}
