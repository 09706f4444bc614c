//! Dashboard suite
//!
//! Every case logs in first, mirroring the application's auth gate on
//! `/dashboard`.

use tracing::{info, warn};

use hub360_common::Error;

use crate::pages::DashboardPage;
use crate::runner::{TestCase, TestContext, TestFuture};

use super::{ensure, plain};

pub fn cases() -> Vec<TestCase> {
    vec![
        plain(
            "dashboard::loads_after_login",
            "Dashboard renders after a valid login",
            &["dashboard", "smoke"],
            loads_after_login,
        ),
        plain(
            "dashboard::profile_modal_probe",
            "Profile-completion modal state is reported",
            &["dashboard"],
            profile_modal_probe,
        ),
        plain(
            "dashboard::unemployed_checkbox",
            "Unemployed checkbox disables the employment fields",
            &["dashboard"],
            unemployed_checkbox,
        ),
        plain(
            "dashboard::stats_cards",
            "Statistics cards are present on the dashboard",
            &["dashboard"],
            stats_cards,
        ),
        plain(
            "dashboard::api_calls",
            "Dashboard reload produces no failing API calls",
            &["dashboard", "api_error"],
            api_calls,
        ),
    ]
}

fn loads_after_login<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        ensure(DashboardPage::new(&ctx.session).is_loaded().await, "dashboard did not load")?;
        Ok(())
    })
}

fn profile_modal_probe<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        if DashboardPage::new(&ctx.session).is_profile_modal_visible().await {
            info!("Profile completion modal is visible");
        } else {
            info!("User already has a profile (modal not shown)");
        }
        Ok(())
    })
}

fn unemployed_checkbox<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        let dashboard = DashboardPage::new(&ctx.session);
        if !dashboard.is_profile_modal_visible().await {
            return Err(Error::Skipped("profile modal not visible".to_string()));
        }

        dashboard.check_unemployed().await?;
        ensure(
            dashboard.is_job_title_disabled().await?,
            "job title field should be disabled when unemployed is checked",
        )?;
        Ok(())
    })
}

fn stats_cards<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        match DashboardPage::new(&ctx.session).total_income().await {
            Some(total) => info!("Total income displayed: {}", total),
            None => info!("Statistics cards present (data may be empty)"),
        }
        Ok(())
    })
}

fn api_calls<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        ctx.monitor.clear_errors(&ctx.session).await;

        // A reload wipes the page globals along with the rest of the page,
        // so the monitor goes straight back in before the app's API calls.
        ctx.session.refresh().await?;
        ctx.monitor.inject(&ctx.session).await;
        ctx.session
            .wait_for_url_contains("/dashboard", std::time::Duration::from_secs(10))
            .await;

        let errors = ctx.monitor.get_errors(&ctx.session).await;
        if !errors.is_empty() {
            warn!("API errors detected: {}", errors.len());
            for error in &errors {
                warn!("  - {}: {}", error.url, error.status);
            }
        } else {
            info!("No API errors detected");
        }
        Ok(())
    })
}
