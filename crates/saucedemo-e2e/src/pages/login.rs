//! Login page (`/`).

use crate::config::SuiteConfig;
use crate::page_object::{PageHandle, PageObject};
use crate::result::E2eResult;
use crate::wait::UrlPattern;
use tracing::{debug, instrument};

/// The store's login form.
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: PageHandle,
    url: String,
}

impl LoginPage {
    /// Username input
    pub const USERNAME_INPUT: &'static str = "#user-name";
    /// Password input
    pub const PASSWORD_INPUT: &'static str = "#password";
    /// Submit button
    pub const LOGIN_BUTTON: &'static str = "#login-button";
    /// Error banner shown after a refused submit
    pub const ERROR_MESSAGE: &'static str = "[data-test='error']";
    /// Close control on the error banner
    pub const ERROR_BUTTON: &'static str = ".error-button";

    /// Login page of the store configured in `config`
    #[must_use]
    pub fn new(page: PageHandle, config: &SuiteConfig) -> Self {
        Self::at(page, config.login_url())
    }

    /// Login page served at `url`
    #[must_use]
    pub fn at(page: PageHandle, url: impl Into<String>) -> Self {
        Self {
            page,
            url: url.into(),
        }
    }

    /// URL the login form is served at
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Navigate to the login page
    #[instrument(name = "Open login page", skip(self), fields(url = %self.url))]
    pub async fn open(&self) -> E2eResult<&Self> {
        self.navigate(&self.url).await?;
        Ok(self)
    }

    /// Replace the username field
    #[instrument(name = "Fill username", skip(self))]
    pub async fn fill_username(&self, username: &str) -> E2eResult<&Self> {
        self.page.locator(Self::USERNAME_INPUT).fill(username).await?;
        Ok(self)
    }

    /// Replace the password field
    #[instrument(name = "Fill password", skip_all)]
    pub async fn fill_password(&self, password: &str) -> E2eResult<&Self> {
        self.page.locator(Self::PASSWORD_INPUT).fill(password).await?;
        Ok(self)
    }

    /// Click the login button
    #[instrument(name = "Submit login form", skip(self))]
    pub async fn submit(&self) -> E2eResult<&Self> {
        self.page.locator(Self::LOGIN_BUTTON).click().await?;
        Ok(self)
    }

    /// Fill both fields and submit
    #[instrument(name = "Login", skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<&Self> {
        self.fill_username(username).await?;
        self.fill_password(password).await?;
        self.submit().await
    }

    /// Whether the error banner is visible right now
    pub async fn has_error(&self) -> E2eResult<bool> {
        self.page.locator(Self::ERROR_MESSAGE).is_visible().await
    }

    /// Text of the error banner.
    ///
    /// Waits for the banner; fails with `ElementNotFound` if none appears.
    #[instrument(name = "Read error message", skip(self))]
    pub async fn error_text(&self) -> E2eResult<String> {
        let text = self.page.locator(Self::ERROR_MESSAGE).inner_text().await?;
        debug!(%text, "error banner");
        Ok(text)
    }

    /// Close the error banner if one is showing
    #[instrument(name = "Dismiss error", skip(self))]
    pub async fn dismiss_error(&self) -> E2eResult<&Self> {
        if self.has_error().await? {
            self.page.locator(Self::ERROR_BUTTON).click().await?;
        }
        Ok(self)
    }

    /// Whether the tab shows exactly the login URL
    pub async fn is_current_page(&self) -> E2eResult<bool> {
        Ok(self.current_url().await? == self.url)
    }
}

impl PageObject for LoginPage {
    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn url_pattern(&self) -> UrlPattern {
        UrlPattern::Exact(self.url.clone())
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}
