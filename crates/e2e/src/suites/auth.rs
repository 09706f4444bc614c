//! Authentication suite

use tracing::{info, warn};

use crate::pages::{DashboardPage, LoginPage};
use crate::runner::{TestCase, TestContext, TestFuture};

use super::{ensure, plain};

pub fn cases() -> Vec<TestCase> {
    vec![
        plain(
            "auth::login_page_loads",
            "Login page renders its form and welcome text",
            &["auth", "smoke"],
            login_page_loads,
        ),
        plain(
            "auth::valid_login",
            "Valid credentials land on the dashboard",
            &["auth", "smoke"],
            valid_login,
        ),
        plain(
            "auth::invalid_login",
            "Invalid credentials surface an error alert",
            &["auth"],
            invalid_login,
        ),
        plain(
            "auth::empty_email",
            "Submitting without an email stays off the dashboard",
            &["auth"],
            empty_email,
        ),
        plain(
            "auth::empty_password",
            "Submitting without a password stays off the dashboard",
            &["auth"],
            empty_password,
        ),
        plain(
            "auth::register_link",
            "The register link navigates to the register page",
            &["auth"],
            register_link,
        ),
        plain(
            "auth::login_api_errors",
            "Failed logins are visible through the API monitor",
            &["auth", "api_error"],
            login_api_errors,
        ),
    ]
}

fn login_page_loads<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        ctx.goto(LoginPage::PATH).await?;
        let page = LoginPage::new(&ctx.session);

        ensure(page.is_loaded().await, "login page did not load properly")?;
        ensure(page.is_welcome_text_visible().await, "welcome text not visible")?;
        Ok(())
    })
}

fn valid_login<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.valid_user.clone();
        ctx.login_as(&user).await?;

        let dashboard = DashboardPage::new(&ctx.session);
        ensure(dashboard.is_loaded().await, "dashboard did not load after login")?;
        Ok(())
    })
}

fn invalid_login<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.invalid_user.clone();
        ctx.goto(LoginPage::PATH).await?;

        let page = LoginPage::new(&ctx.session);
        page.login(&user.email, &user.password).await?;

        ensure(page.is_error_displayed().await, "error message not displayed")?;
        let message = page.error_message_text().await;
        ensure(message.as_deref().is_some_and(|m| !m.is_empty()), "error message is empty")?;
        info!("Error message displayed: {}", message.unwrap_or_default());
        Ok(())
    })
}

fn empty_email<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        ctx.goto(LoginPage::PATH).await?;

        let page = LoginPage::new(&ctx.session);
        page.enter_password("SomePassword123").await?;
        page.click_login_button().await?;

        let url = ctx.session.current_url().await?;
        ensure(!url.contains("/dashboard"), "should not redirect with empty email")?;
        Ok(())
    })
}

fn empty_password<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        ctx.goto(LoginPage::PATH).await?;

        let page = LoginPage::new(&ctx.session);
        page.enter_email("test@example.com").await?;
        page.click_login_button().await?;

        let url = ctx.session.current_url().await?;
        ensure(!url.contains("/dashboard"), "should not redirect with empty password")?;
        Ok(())
    })
}

fn register_link<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        ctx.goto(LoginPage::PATH).await?;

        LoginPage::new(&ctx.session).click_register_link().await?;
        let redirected = ctx
            .session
            .wait_for_url_contains("/register", std::time::Duration::from_secs(10))
            .await;
        ensure(redirected, "did not redirect to register page")?;
        Ok(())
    })
}

fn login_api_errors<'a>(ctx: &'a mut TestContext) -> TestFuture<'a> {
    Box::pin(async move {
        let user = ctx.config.invalid_user.clone();
        ctx.goto(LoginPage::PATH).await?;

        // Start from clean buffers so only this login's calls are counted.
        ctx.monitor.clear_errors(&ctx.session).await;

        LoginPage::new(&ctx.session).login(&user.email, &user.password).await?;

        let errors = ctx.monitor.get_errors(&ctx.session).await;
        if !errors.is_empty() {
            warn!("API errors detected: {}", errors.len());
            for error in &errors {
                warn!("  - {}: {} - {}", error.url, error.status, error.error);
            }
        }
        Ok(())
    })
}
