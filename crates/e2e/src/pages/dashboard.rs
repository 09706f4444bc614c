//! Dashboard page object

use std::time::Duration;

use tracing::info;

use hub360_common::Result;

use crate::session::{BrowserSession, Locator};

/// Dashboard page wrapper.
pub struct DashboardPage<'a> {
    session: &'a BrowserSession,
}

impl<'a> DashboardPage<'a> {
    pub const PATH: &'static str = "/dashboard";

    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }

    fn welcome_message() -> Locator {
        Locator::xpath(r#"//*[contains(text(), "Welcome") or contains(text(), "Dashboard")]"#)
    }

    fn profile_modal() -> Locator {
        Locator::xpath(r#"//*[contains(text(), "Complete Your Profile")]"#)
    }

    fn unemployed_checkbox() -> Locator {
        Locator::xpath(
            r#"//input[@type="checkbox"]//following-sibling::span[contains(text(), "unemployed")]"#,
        )
    }

    fn job_title_input() -> Locator {
        Locator::css(r#"input[name="jobTitle"], input[label="Job Title"]"#)
    }

    fn company_input() -> Locator {
        Locator::css(r#"input[name="company"], input[label="Company"]"#)
    }

    fn save_profile_button() -> Locator {
        Locator::xpath(r#"//button[contains(text(), "Complete Profile") or contains(text(), "Save")]"#)
    }

    fn total_income_card() -> Locator {
        Locator::xpath(r#"//*[contains(text(), "Total Income")]"#)
    }

    /// Whether the dashboard finished rendering its banner.
    pub async fn is_loaded(&self) -> bool {
        self.session.is_visible(&Self::welcome_message(), Duration::from_secs(10)).await
    }

    pub async fn is_profile_modal_visible(&self) -> bool {
        self.session.is_visible(&Self::profile_modal(), Duration::from_secs(5)).await
    }

    pub async fn check_unemployed(&self) -> Result<()> {
        self.session.click(&Self::unemployed_checkbox()).await?;
        info!("Checked unemployed checkbox");
        Ok(())
    }

    pub async fn is_job_title_disabled(&self) -> Result<bool> {
        Ok(!self.session.is_enabled(&Self::job_title_input()).await?)
    }

    pub async fn fill_job_title(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::job_title_input(), value, true).await
    }

    pub async fn fill_company(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::company_input(), value, true).await
    }

    pub async fn save_profile(&self) -> Result<()> {
        self.session.click(&Self::save_profile_button()).await?;
        info!("Clicked save profile button");
        Ok(())
    }

    /// Total income card text, if the card rendered.
    pub async fn total_income(&self) -> Option<String> {
        self.session.text(&Self::total_income_card()).await.ok()
    }

    /// Click a sidebar entry by its visible label.
    pub async fn navigate_to(&self, section: &str) -> Result<()> {
        let locator = Locator::xpath(format!(r#"//span[contains(text(), "{}")]"#, section));
        self.session.click(&locator).await?;
        info!("Navigated to {}", section);
        Ok(())
    }
}
