//! Inventory page (`/inventory.html`), reached after a successful login.

use crate::config::SuiteConfig;
use crate::locator::Selector;
use crate::page_object::{PageHandle, PageObject};
use crate::result::E2eResult;
use crate::wait::UrlPattern;
use tracing::{debug, instrument};

/// Product listing shown to a logged-in user.
#[derive(Debug, Clone)]
pub struct InventoryPage {
    page: PageHandle,
    login_url: String,
}

impl InventoryPage {
    /// Path of the inventory page under the store root
    pub const PATH: &'static str = "inventory.html";
    /// Glob for the inventory URL
    pub const URL_GLOB: &'static str = "**/inventory.html";
    /// Product grid
    pub const INVENTORY_CONTAINER: &'static str = ".inventory_container";
    /// One product card
    pub const INVENTORY_ITEM: &'static str = ".inventory_item";
    /// Product title inside a card
    pub const ITEM_NAME: &'static str = ".inventory_item_name";
    /// Cart icon in the header
    pub const CART_LINK: &'static str = ".shopping_cart_link";
    /// Burger menu toggle
    pub const MENU_BUTTON: &'static str = "#react-burger-menu-btn";
    /// Logout entry in the burger menu
    pub const LOGOUT_LINK: &'static str = "#logout_sidebar_link";

    /// Inventory page of the store configured in `config`
    #[must_use]
    pub fn new(page: PageHandle, config: &SuiteConfig) -> Self {
        Self {
            page,
            login_url: config.login_url(),
        }
    }

    /// Wait until the tab shows the inventory URL.
    ///
    /// Uses the navigation window, which also covers slow logins.
    #[instrument(name = "Wait for inventory page", skip(self))]
    pub async fn wait_for_load(&self) -> E2eResult<&Self> {
        self.wait_until_loaded().await?;
        Ok(self)
    }

    /// Whether the URL contains `inventory.html`
    pub async fn is_current_page(&self) -> E2eResult<bool> {
        Ok(self.current_url().await?.contains(Self::PATH))
    }

    /// Whether the product grid is visible right now
    pub async fn is_container_visible(&self) -> E2eResult<bool> {
        self.page.locator(Self::INVENTORY_CONTAINER).is_visible().await
    }

    /// Number of product cards; zero off the inventory page
    #[instrument(name = "Count products", skip(self))]
    pub async fn product_count(&self) -> E2eResult<usize> {
        let count = self.page.locator(Self::INVENTORY_ITEM).count().await?;
        debug!(count, "products listed");
        Ok(count)
    }

    /// Product names in display order
    #[instrument(name = "Read product names", skip(self))]
    pub async fn product_names(&self) -> E2eResult<Vec<String>> {
        let names = self.page.locator(Self::ITEM_NAME).all_text_contents().await?;
        Ok(names.into_iter().map(|name| name.trim().to_string()).collect())
    }

    /// Whether a product whose name contains `name` is visible
    #[instrument(name = "Check product", skip(self))]
    pub async fn has_product(&self, name: &str) -> E2eResult<bool> {
        self.page
            .locator(Selector::css(Self::ITEM_NAME).with_text(name))
            .is_visible()
            .await
    }

    /// Whether the cart icon is visible right now
    pub async fn is_cart_link_visible(&self) -> E2eResult<bool> {
        self.page.locator(Self::CART_LINK).is_visible().await
    }

    /// Open the burger menu
    #[instrument(name = "Open menu", skip(self))]
    pub async fn open_menu(&self) -> E2eResult<&Self> {
        self.page.locator(Self::MENU_BUTTON).click().await?;
        Ok(self)
    }

    /// Log out through the burger menu and wait for the login page
    #[instrument(name = "Logout", skip(self))]
    pub async fn logout(&self) -> E2eResult<()> {
        self.open_menu().await?;
        self.page.locator(Self::LOGOUT_LINK).click().await?;
        self.page
            .wait_for_url(&UrlPattern::Exact(self.login_url.clone()))
            .await
    }
}

impl PageObject for InventoryPage {
    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn url_pattern(&self) -> UrlPattern {
        UrlPattern::glob(Self::URL_GLOB)
    }

    fn page_name(&self) -> &str {
        "InventoryPage"
    }
}
