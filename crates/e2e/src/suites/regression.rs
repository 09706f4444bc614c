//! Page regression suite
//!
//! Parameterized over the configured page table: every routed page gets a
//! load check, a title check, and (when auth-gated) an access check.

use std::time::Duration;

use tracing::{error, info, warn};

use hub360_common::{PageUnderTest, PAGES_TO_TEST};

use crate::runner::{TestBody, TestCase, TestContext, TestFuture};

use super::ensure;

/// Settle time after navigation before inspecting the page.
const PAGE_SETTLE: Duration = Duration::from_secs(2);

pub fn cases() -> Vec<TestCase> {
    let mut cases = Vec::new();

    for page in PAGES_TO_TEST {
        cases.push(TestCase {
            name: format!("regression::page_loads[{}]", page.name),
            description: "Page loads without API errors",
            tags: &["regression"],
            body: TestBody::PerPage(page_loads_without_api_errors, page),
        });
    }

    for page in PAGES_TO_TEST {
        cases.push(TestCase {
            name: format!("regression::page_title[{}]", page.name),
            description: "Page has a non-empty title",
            tags: &["regression"],
            body: TestBody::PerPage(page_has_title, page),
        });
    }

    for page in PAGES_TO_TEST.iter().filter(|p| p.requires_auth) {
        cases.push(TestCase {
            name: format!("regression::requires_login[{}]", page.name),
            description: "Protected page bounces unauthenticated visitors",
            tags: &["regression", "smoke"],
            body: TestBody::PerPage(protected_page_requires_login, page),
        });
    }

    cases
}

fn page_loads_without_api_errors<'a>(
    ctx: &'a mut TestContext,
    page: &'static PageUnderTest,
) -> TestFuture<'a> {
    Box::pin(async move {
        if page.requires_auth {
            let user = ctx.config.valid_user.clone();
            ctx.login_as(&user).await?;
        }

        ctx.monitor.clear_errors(&ctx.session).await;
        ctx.goto(page.path).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let url = ctx.session.current_url().await?;
        ensure(url.contains(page.path), format!("failed to navigate to {}", page.name))?;

        let errors = ctx.monitor.get_errors(&ctx.session).await;
        if errors.is_empty() {
            info!("{} loaded successfully", page.name);
        } else {
            // Surfaced through the report, not a test failure.
            error!("{} - API errors detected:", page.name);
            for api_error in &errors {
                error!("    {}: {} - {}", api_error.url, api_error.status, api_error.error);
            }
        }
        Ok(())
    })
}

fn page_has_title<'a>(ctx: &'a mut TestContext, page: &'static PageUnderTest) -> TestFuture<'a> {
    Box::pin(async move {
        if page.requires_auth {
            let user = ctx.config.valid_user.clone();
            ctx.login_as(&user).await?;
        }

        ctx.goto(page.path).await?;

        let title = ctx.session.title().await?;
        ensure(!title.is_empty(), format!("{} has no title", page.name))?;
        info!("{} title: {}", page.name, title);
        Ok(())
    })
}

fn protected_page_requires_login<'a>(
    ctx: &'a mut TestContext,
    page: &'static PageUnderTest,
) -> TestFuture<'a> {
    Box::pin(async move {
        // Straight to the protected path, no login.
        ctx.goto(page.path).await?;
        tokio::time::sleep(PAGE_SETTLE).await;

        let url = ctx.session.current_url().await?;
        if url.contains("/login") || url.contains("/auth") {
            info!("{} correctly requires authentication", page.name);
        } else {
            warn!("{} may not be properly protected", page.name);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_case_per_page_and_check() {
        let cases = cases();
        assert_eq!(cases.len(), 12 + 12 + 10);
        assert!(cases.iter().any(|c| c.name == "regression::page_loads[Bank Accounts]"));
        assert!(cases.iter().any(|c| c.name == "regression::requires_login[Dashboard]"));
        // Public pages get no access check.
        assert!(!cases.iter().any(|c| c.name == "regression::requires_login[Login]"));
    }
}
