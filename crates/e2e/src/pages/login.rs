//! Login page object

use std::time::Duration;

use tracing::info;

use hub360_common::Result;

use crate::session::{BrowserSession, Locator};

/// Login page wrapper.
pub struct LoginPage<'a> {
    session: &'a BrowserSession,
}

impl<'a> LoginPage<'a> {
    pub const PATH: &'static str = "/login";

    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }

    fn email_input() -> Locator {
        Locator::css(r#"input[name="email"], input[type="email"]"#)
    }

    fn password_input() -> Locator {
        Locator::css(r#"input[name="password"], input[type="password"]"#)
    }

    fn login_button() -> Locator {
        Locator::xpath(r#"//button[contains(text(), "Sign In") or contains(text(), "Login")]"#)
    }

    fn error_message() -> Locator {
        Locator::css(".MuiAlert-message, .error-message")
    }

    fn register_link() -> Locator {
        Locator::xpath(r#"//a[contains(text(), "Create Your Account") or contains(text(), "Register")]"#)
    }

    fn welcome_text() -> Locator {
        Locator::xpath(r#"//*[contains(text(), "Welcome Back")]"#)
    }

    pub async fn enter_email(&self, email: &str) -> Result<()> {
        self.session.send_keys(&Self::email_input(), email, true).await?;
        info!("Entered email: {}", email);
        Ok(())
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.session.send_keys(&Self::password_input(), password, true).await?;
        info!("Entered password");
        Ok(())
    }

    pub async fn click_login_button(&self) -> Result<()> {
        self.session.click(&Self::login_button()).await
    }

    /// Complete login flow: email, password, submit.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_login_button().await?;
        info!("Performed login with email: {}", email);
        Ok(())
    }

    /// Error alert text, if one is shown.
    pub async fn error_message_text(&self) -> Option<String> {
        self.session.text(&Self::error_message()).await.ok()
    }

    pub async fn is_error_displayed(&self) -> bool {
        self.session.is_visible(&Self::error_message(), Duration::from_secs(5)).await
    }

    pub async fn click_register_link(&self) -> Result<()> {
        self.session.click(&Self::register_link()).await
    }

    pub async fn is_welcome_text_visible(&self) -> bool {
        self.session.is_visible(&Self::welcome_text(), Duration::from_secs(5)).await
    }

    /// Whether the full login form is rendered.
    pub async fn is_loaded(&self) -> bool {
        let wait = Duration::from_secs(5);
        self.session.is_visible(&Self::email_input(), wait).await
            && self.session.is_visible(&Self::password_input(), wait).await
            && self.session.is_visible(&Self::login_button(), wait).await
    }
}
