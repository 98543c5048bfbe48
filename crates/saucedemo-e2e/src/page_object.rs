//! Page Object Model support.
//!
//! [`PageHandle`] is the shared capability every page wrapper holds: one live
//! tab plus the wait windows used against it. [`PageObject`] supplies the base
//! operations (navigate, read URL/title, screenshot) as provided methods, so a
//! concrete page only has to say which handle it wraps and what URL it lives at.
//!
//! # Example
//!
//! ```ignore
//! struct CartPage {
//!     page: PageHandle,
//! }
//!
//! impl PageObject for CartPage {
//!     fn page(&self) -> &PageHandle {
//!         &self.page
//!     }
//!
//!     fn url_pattern(&self) -> UrlPattern {
//!         UrlPattern::glob("**/cart.html")
//!     }
//! }
//! ```

use crate::config::SuiteConfig;
use crate::driver::BrowserDriver;
use crate::locator::{Locator, Selector};
use crate::result::{E2eError, E2eResult};
use crate::wait::{wait_for, UrlPattern, WaitOptions};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Handle to one live browser tab.
///
/// Cloning is cheap and every clone drives the same tab.
#[derive(Debug, Clone)]
pub struct PageHandle {
    driver: Arc<dyn BrowserDriver>,
    action: WaitOptions,
    navigation: WaitOptions,
}

impl PageHandle {
    /// Wrap a tab using the wait windows from `config`
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: &SuiteConfig) -> Self {
        Self::with_waits(
            driver,
            WaitOptions::for_actions(config),
            WaitOptions::for_navigation(config),
        )
    }

    /// Wrap a tab with explicit wait windows
    #[must_use]
    pub fn with_waits(
        driver: Arc<dyn BrowserDriver>,
        action: WaitOptions,
        navigation: WaitOptions,
    ) -> Self {
        Self {
            driver,
            action,
            navigation,
        }
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Wait window for element actions
    #[must_use]
    pub const fn action_wait(&self) -> WaitOptions {
        self.action
    }

    /// Wait window for navigation and URL conditions
    #[must_use]
    pub const fn navigation_wait(&self) -> WaitOptions {
        self.navigation
    }

    /// Bind a selector to this tab
    #[must_use]
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator<'_> {
        Locator::new(self, selector.into())
    }

    /// Navigate and wait for the load, bounded by the navigation window
    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!(url, "goto");
        let window = self.navigation.timeout();
        tokio::time::timeout(window, self.driver.goto(url))
            .await
            .map_err(|_| E2eError::Timeout {
                condition: format!("navigation to {url}"),
                ms: self.navigation.timeout_ms,
            })?
    }

    /// URL of the live document
    pub async fn url(&self) -> E2eResult<String> {
        self.driver.url().await
    }

    /// Title of the live document
    pub async fn title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Write a PNG of the viewport to `path`.
    ///
    /// The parent directory must already exist.
    pub async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        let png = self.driver.screenshot().await?;
        tokio::fs::write(path, png).await?;
        debug!(path = %path.display(), "screenshot written");
        Ok(())
    }

    /// Wait until the live URL matches `pattern`
    pub async fn wait_for_url(&self, pattern: &UrlPattern) -> E2eResult<()> {
        wait_for(
            move || async move { Ok(pattern.matches(&self.url().await?)) },
            self.navigation,
            &pattern.to_string(),
        )
        .await
    }

    /// Close the tab
    pub async fn close(&self) -> E2eResult<()> {
        self.driver.close().await
    }
}

/// Trait for page objects representing a page of the store.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The tab this page object drives
    fn page(&self) -> &PageHandle;

    /// URL pattern that identifies this page
    fn url_pattern(&self) -> UrlPattern;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Load `url` in the tab
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.page().goto(url).await
    }

    /// URL of the live document
    async fn current_url(&self) -> E2eResult<String> {
        self.page().url().await
    }

    /// Title of the live document
    async fn current_title(&self) -> E2eResult<String> {
        self.page().title().await
    }

    /// Write a PNG of the viewport to `path`
    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        self.page().screenshot(path).await
    }

    /// Wait until the live URL matches [`url_pattern`](Self::url_pattern)
    async fn wait_until_loaded(&self) -> E2eResult<()> {
        self.page().wait_for_url(&self.url_pattern()).await
    }
}
