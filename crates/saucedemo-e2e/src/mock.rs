//! In-process model of the Sauce Demo store.
//!
//! [`MockStore`] implements [`BrowserDriver`] by keeping the store's state
//! (current document, form fields, session, error banner, burger menu) in
//! memory and answering selector queries against a fixed element table. It
//! follows the live site closely enough that every page object and fixture
//! can be exercised without a browser:
//!
//! - credentials are validated username first, then password, then the lock
//! - `performance_glitch_user` reaches the inventory only after a delay
//! - the inventory deep link without a session lands on the login page with
//!   the "You can only access" banner
//! - the logout link exists in the DOM but is hidden until the menu opens
//!
//! [`MockBrowser`] hands out isolated stores, one per [`PageProvider::new_page`].

use crate::accounts::{Credentials, LoginFailure, PERFORMANCE_GLITCH_USER};
use crate::config::DEFAULT_BASE_URL;
use crate::driver::{BrowserDriver, PageProvider};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Products listed on the inventory page, in display order
pub const PRODUCTS: [(&str, &str); 6] = [
    ("Sauce Labs Backpack", "$29.99"),
    ("Sauce Labs Bike Light", "$9.99"),
    ("Sauce Labs Bolt T-Shirt", "$15.99"),
    ("Sauce Labs Fleece Jacket", "$49.99"),
    ("Sauce Labs Onesie", "$7.99"),
    ("Test.allTheThings() T-Shirt (Red)", "$15.99"),
];

const STORE_TITLE: &str = "Swag Labs";
const BLANK_URL: &str = "about:blank";
const INVENTORY_PATH: &str = "inventory.html";

// 1x1 transparent PNG
const PIXEL_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Behaviour knobs shared by every tab a [`MockBrowser`] opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSettings {
    /// Store root, with trailing slash
    pub base_url: String,
    /// Time `goto` takes before the document changes
    pub navigation_delay_ms: u64,
    /// Time between submit and the inventory for `performance_glitch_user`
    pub glitch_delay_ms: u64,
    /// Every navigation fails when set
    pub offline: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            navigation_delay_ms: 0,
            glitch_delay_ms: 300,
            offline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Blank,
    Login,
    Inventory,
    /// Another store page reached with a session
    StorePage,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Username,
    Password,
    LoginButton,
    ErrorBanner,
    ErrorDismiss,
    LoginLogo,
    AppLogo,
    InventoryContainer,
    InventoryItem(usize),
    ItemName(usize),
    ItemPrice(usize),
    CartLink,
    MenuButton,
    MenuClose,
    LogoutLink,
}

impl Node {
    /// Selectors that resolve to this node, with attribute quotes as `'`
    fn selectors(self) -> &'static [&'static str] {
        match self {
            Self::Username => &["#user-name", "[data-test='username']", "input#user-name"],
            Self::Password => &["#password", "[data-test='password']", "input#password"],
            Self::LoginButton => &["#login-button", "[data-test='login-button']"],
            Self::ErrorBanner => &["[data-test='error']", "h3[data-test='error']"],
            Self::ErrorDismiss => &[".error-button", "[data-test='error-button']"],
            Self::LoginLogo => &[".login_logo"],
            Self::AppLogo => &[".app_logo"],
            Self::InventoryContainer => &[
                ".inventory_container",
                "#inventory_container",
                "[data-test='inventory-container']",
            ],
            Self::InventoryItem(_) => &[".inventory_item", "[data-test='inventory-item']"],
            Self::ItemName(_) => &[".inventory_item_name", "[data-test='inventory-item-name']"],
            Self::ItemPrice(_) => &[".inventory_item_price", "[data-test='inventory-item-price']"],
            Self::CartLink => &[".shopping_cart_link", "[data-test='shopping-cart-link']"],
            Self::MenuButton => &["#react-burger-menu-btn"],
            Self::MenuClose => &["#react-burger-cross-btn"],
            Self::LogoutLink => &["#logout_sidebar_link", "[data-test='logout-sidebar-link']"],
        }
    }

    fn answers_to(self, css: &str) -> bool {
        let css = css.trim().replace('"', "'");
        self.selectors().iter().any(|s| *s == css)
    }
}

#[derive(Debug)]
struct PendingLogin {
    username: String,
    ready_at: Instant,
}

#[derive(Debug)]
struct StoreState {
    url: String,
    screen: Screen,
    username: String,
    password: String,
    error: Option<String>,
    session: Option<String>,
    menu_open: bool,
    pending: Option<PendingLogin>,
    closed: bool,
    history: Vec<String>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            url: BLANK_URL.to_string(),
            screen: Screen::Blank,
            username: String::new(),
            password: String::new(),
            error: None,
            session: None,
            menu_open: false,
            pending: None,
            closed: false,
            history: Vec::new(),
        }
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed {
            Err(E2eError::Page {
                message: "Target page has been closed".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Complete a delayed login whose deadline has passed
    fn settle(&mut self, base_url: &str) {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|pending| Instant::now() >= pending.ready_at);
        if ready {
            if let Some(pending) = self.pending.take() {
                self.enter_inventory(base_url, pending.username);
            }
        }
    }

    fn reset_document(&mut self) {
        self.username.clear();
        self.password.clear();
        self.error = None;
        self.menu_open = false;
        self.pending = None;
    }

    fn enter_inventory(&mut self, base_url: &str, username: String) {
        self.reset_document();
        self.session = Some(username);
        self.screen = Screen::Inventory;
        self.url = format!("{base_url}{INVENTORY_PATH}");
    }

    fn enter_login(&mut self, base_url: &str, error: Option<String>) {
        self.reset_document();
        self.screen = Screen::Login;
        self.url = base_url.to_string();
        self.error = error;
    }

    fn load(&mut self, base_url: &str, url: &str) {
        let Some(path) = url.strip_prefix(base_url) else {
            self.reset_document();
            self.screen = if url == BLANK_URL {
                Screen::Blank
            } else {
                Screen::External
            };
            self.url = url.to_string();
            return;
        };

        if path.is_empty() {
            self.enter_login(base_url, None);
        } else if self.session.is_none() {
            let message = if path == INVENTORY_PATH {
                LoginFailure::InventoryRequiresLogin.message().to_string()
            } else {
                format!("Epic sadface: You can only access '/{path}' when you are logged in.")
            };
            self.enter_login(base_url, Some(message));
        } else if path == INVENTORY_PATH {
            let username = self.session.clone().unwrap_or_default();
            self.enter_inventory(base_url, username);
        } else {
            self.reset_document();
            self.screen = Screen::StorePage;
            self.url = url.to_string();
        }
    }

    /// Elements present in the current document, in document order
    fn nodes(&self) -> Vec<Node> {
        match self.screen {
            Screen::Blank | Screen::External => Vec::new(),
            Screen::Login => {
                let mut nodes = vec![
                    Node::LoginLogo,
                    Node::Username,
                    Node::Password,
                    Node::LoginButton,
                ];
                if self.error.is_some() {
                    nodes.push(Node::ErrorBanner);
                    nodes.push(Node::ErrorDismiss);
                }
                nodes
            }
            Screen::Inventory => {
                let mut nodes = header_nodes();
                nodes.push(Node::InventoryContainer);
                for index in 0..PRODUCTS.len() {
                    nodes.push(Node::InventoryItem(index));
                    nodes.push(Node::ItemName(index));
                    nodes.push(Node::ItemPrice(index));
                }
                nodes
            }
            Screen::StorePage => header_nodes(),
        }
    }

    fn text_of(&self, node: Node) -> String {
        match node {
            Node::LoginButton => "Login".to_string(),
            Node::ErrorBanner => self.error.clone().unwrap_or_default(),
            Node::LoginLogo | Node::AppLogo => STORE_TITLE.to_string(),
            Node::InventoryContainer => PRODUCTS
                .iter()
                .map(|(name, price)| format!("{name}{price}"))
                .collect(),
            Node::InventoryItem(i) => format!("{}{}", PRODUCTS[i].0, PRODUCTS[i].1),
            Node::ItemName(i) => PRODUCTS[i].0.to_string(),
            Node::ItemPrice(i) => PRODUCTS[i].1.to_string(),
            Node::MenuButton => "Open Menu".to_string(),
            Node::MenuClose => "Close Menu".to_string(),
            Node::LogoutLink => "Logout".to_string(),
            Node::Username | Node::Password | Node::ErrorDismiss | Node::CartLink => String::new(),
        }
    }

    fn visible(&self, node: Node) -> bool {
        match node {
            Node::LogoutLink | Node::MenuClose => self.menu_open,
            _ => true,
        }
    }

    fn resolve(&self, selector: &Selector) -> Vec<Node> {
        self.nodes()
            .into_iter()
            .filter(|node| node.answers_to(selector.css_part()))
            .filter(|node| selector.matches_text(&self.text_of(*node)))
            .collect()
    }

    fn first(&self, selector: &Selector) -> E2eResult<Node> {
        self.resolve(selector)
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    fn submit(&mut self, settings: &MockSettings) {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        if let Some(failure) = LoginFailure::check(&credentials) {
            debug!(%failure, "mock login refused");
            self.error = Some(failure.message().to_string());
            return;
        }
        self.error = None;
        if credentials.username == PERFORMANCE_GLITCH_USER {
            self.pending = Some(PendingLogin {
                username: credentials.username,
                ready_at: Instant::now() + Duration::from_millis(settings.glitch_delay_ms),
            });
        } else {
            self.enter_inventory(&settings.base_url, credentials.username);
        }
    }

    fn render(&self) -> String {
        let title = match self.screen {
            Screen::Blank | Screen::External => "",
            _ => STORE_TITLE,
        };
        let mut body = String::new();
        for node in self.nodes() {
            let (tag, attrs) = match node {
                Node::Username => ("input", r#"id="user-name" data-test="username""#),
                Node::Password => (
                    "input",
                    r#"id="password" data-test="password" type="password""#,
                ),
                Node::LoginButton => ("input", r#"id="login-button" type="submit" value="Login""#),
                Node::ErrorBanner => ("h3", r#"data-test="error""#),
                Node::ErrorDismiss => ("button", r#"class="error-button""#),
                Node::LoginLogo => ("div", r#"class="login_logo""#),
                Node::AppLogo => ("div", r#"class="app_logo""#),
                Node::InventoryContainer => ("div", r#"class="inventory_container""#),
                Node::InventoryItem(_) => ("div", r#"class="inventory_item""#),
                Node::ItemName(_) => ("div", r#"class="inventory_item_name""#),
                Node::ItemPrice(_) => ("div", r#"class="inventory_item_price""#),
                Node::CartLink => ("a", r#"class="shopping_cart_link""#),
                Node::MenuButton => ("button", r#"id="react-burger-menu-btn""#),
                Node::MenuClose => ("button", r#"id="react-burger-cross-btn""#),
                Node::LogoutLink => ("a", r#"id="logout_sidebar_link""#),
            };
            let value = match node {
                Node::Username => format!(r#" value="{}""#, escape(&self.username)),
                Node::Password => format!(r#" value="{}""#, escape(&self.password)),
                _ => String::new(),
            };
            let hidden = if self.visible(node) { "" } else { r#" hidden="""# };
            let text = match node {
                Node::InventoryContainer | Node::InventoryItem(_) => String::new(),
                _ => escape(&self.text_of(node)),
            };
            body.push_str(&format!("<{tag} {attrs}{value}{hidden}>{text}</{tag}>\n"));
        }
        format!("<html><head><title>{title}</title></head><body>\n{body}</body></html>")
    }
}

fn header_nodes() -> Vec<Node> {
    vec![
        Node::MenuButton,
        Node::LogoutLink,
        Node::MenuClose,
        Node::AppLogo,
        Node::CartLink,
    ]
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One simulated browser tab showing the Sauce Demo store.
#[derive(Debug)]
pub struct MockStore {
    settings: MockSettings,
    state: Mutex<StoreState>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::with_settings(MockSettings::default())
    }
}

impl MockStore {
    /// Blank tab with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank tab with explicit settings
    #[must_use]
    pub fn with_settings(settings: MockSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(StoreState::new()),
        }
    }

    /// Serve the store under another root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.base_url = with_trailing_slash(base_url.into());
        self
    }

    /// Make every navigation take `ms`
    #[must_use]
    pub const fn with_navigation_delay_ms(mut self, ms: u64) -> Self {
        self.settings.navigation_delay_ms = ms;
        self
    }

    /// Delay before `performance_glitch_user` reaches the inventory
    #[must_use]
    pub const fn with_glitch_delay_ms(mut self, ms: u64) -> Self {
        self.settings.glitch_delay_ms = ms;
        self
    }

    /// Fail every navigation
    #[must_use]
    pub const fn offline(mut self) -> Self {
        self.settings.offline = true;
        self
    }

    /// Settings this tab runs with
    #[must_use]
    pub const fn settings(&self) -> &MockSettings {
        &self.settings
    }

    /// Driver calls received so far (`goto:<url>`, `fill:<selector>`, ...)
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if a driver method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(method))
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Username of the active session
    #[must_use]
    pub fn session_user(&self) -> Option<String> {
        let mut state = self.lock();
        state.settle(&self.settings.base_url);
        state.session.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock, reject closed tabs, and apply any due delayed login
    fn live(&self) -> E2eResult<MutexGuard<'_, StoreState>> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.settle(&self.settings.base_url);
        Ok(state)
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[async_trait]
impl BrowserDriver for MockStore {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        {
            let mut state = self.live()?;
            state.history.push(format!("goto:{url}"));
        }
        if self.settings.offline {
            return Err(E2eError::NavigationFailed {
                url: url.to_string(),
                message: "net::ERR_INTERNET_DISCONNECTED".to_string(),
            });
        }
        if self.settings.navigation_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.navigation_delay_ms)).await;
        }
        let mut state = self.live()?;
        state.load(&self.settings.base_url, url);
        debug!(url = %state.url, "mock navigation finished");
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.live()?.url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        let state = self.live()?;
        Ok(match state.screen {
            Screen::Blank | Screen::External => String::new(),
            _ => STORE_TITLE.to_string(),
        })
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let _state = self.live()?;
        Ok(PIXEL_PNG.to_vec())
    }

    async fn content(&self) -> E2eResult<String> {
        Ok(self.live()?.render())
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        Ok(self.live()?.resolve(selector).len())
    }

    async fn is_visible(&self, selector: &Selector) -> E2eResult<bool> {
        let state = self.live()?;
        Ok(state
            .resolve(selector)
            .iter()
            .any(|node| state.visible(*node)))
    }

    async fn fill(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        let mut state = self.live()?;
        state.history.push(format!("fill:{selector}"));
        let node = state.first(selector)?;
        match node {
            Node::Username => state.username = text.to_string(),
            Node::Password => state.password = text.to_string(),
            _ => {
                return Err(E2eError::Script {
                    message: format!("{selector} is not an <input>"),
                })
            }
        }
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        let mut state = self.live()?;
        state.history.push(format!("click:{selector}"));
        let node = state.first(selector)?;
        if !state.visible(node) {
            return Err(E2eError::Script {
                message: format!("{selector} is not visible"),
            });
        }
        match node {
            Node::LoginButton => state.submit(&self.settings),
            Node::ErrorDismiss => state.error = None,
            Node::MenuButton => state.menu_open = true,
            Node::MenuClose => state.menu_open = false,
            Node::LogoutLink => {
                state.session = None;
                state.enter_login(&self.settings.base_url, None);
            }
            _ => {}
        }
        Ok(())
    }

    async fn inner_text(&self, selector: &Selector) -> E2eResult<String> {
        let state = self.live()?;
        let node = state.first(selector)?;
        Ok(state.text_of(node))
    }

    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>> {
        let state = self.live()?;
        Ok(state
            .resolve(selector)
            .into_iter()
            .map(|node| state.text_of(node))
            .collect())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut state = self.lock();
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}

/// Page provider handing out isolated [`MockStore`] tabs
#[derive(Debug, Default)]
pub struct MockBrowser {
    settings: MockSettings,
    pages: Mutex<Vec<Arc<MockStore>>>,
    shut_down: AtomicBool,
}

impl MockBrowser {
    /// Browser whose tabs use default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Browser whose tabs use `settings`
    #[must_use]
    pub fn with_settings(settings: MockSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Every tab opened so far, oldest first
    #[must_use]
    pub fn pages(&self) -> Vec<Arc<MockStore>> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recently opened tab
    #[must_use]
    pub fn last_page(&self) -> Option<Arc<MockStore>> {
        self.pages().pop()
    }

    /// Whether [`PageProvider::shutdown`] ran
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for MockBrowser {
    async fn new_page(&self) -> E2eResult<Arc<dyn BrowserDriver>> {
        if self.is_shut_down() {
            return Err(E2eError::Page {
                message: "Browser has been closed".to_string(),
            });
        }
        let store = Arc::new(MockStore::with_settings(self.settings.clone()));
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&store));
        Ok(store)
    }

    async fn shutdown(&self) -> E2eResult<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        for page in self.pages() {
            page.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{LOCKED_OUT_USER, PASSWORD, STANDARD_USER};

    const BASE: &str = "https://www.saucedemo.com/";

    async fn login(store: &MockStore, username: &str, password: &str) {
        store.goto(BASE).await.unwrap();
        store.fill(&"#user-name".into(), username).await.unwrap();
        store.fill(&"#password".into(), password).await.unwrap();
        store.click(&"#login-button".into()).await.unwrap();
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_starts_blank() {
            let store = MockStore::new();
            assert_eq!(store.url().await.unwrap(), "about:blank");
            assert_eq!(store.title().await.unwrap(), "");
            assert_eq!(store.count(&"#user-name".into()).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_inventory_deep_link_requires_session() {
            let store = MockStore::new();
            store.goto("https://www.saucedemo.com/inventory.html").await.unwrap();
            assert_eq!(store.url().await.unwrap(), BASE);
            assert_eq!(
                store.inner_text(&"[data-test='error']".into()).await.unwrap(),
                LoginFailure::InventoryRequiresLogin.message()
            );
        }

        #[tokio::test]
        async fn test_custom_base_url() {
            let store = MockStore::new().with_base_url("http://localhost:3000");
            store.goto("http://localhost:3000/").await.unwrap();
            assert_eq!(store.title().await.unwrap(), "Swag Labs");
        }

        #[tokio::test]
        async fn test_closed_tab_rejects_calls() {
            let store = MockStore::new();
            store.close().await.unwrap();
            assert!(store.is_closed());
            assert!(matches!(
                store.goto(BASE).await.unwrap_err(),
                E2eError::Page { .. }
            ));
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_standard_login_reaches_inventory() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, PASSWORD).await;
            assert_eq!(store.url().await.unwrap(), "https://www.saucedemo.com/inventory.html");
            assert_eq!(store.count(&".inventory_item".into()).await.unwrap(), 6);
            assert_eq!(store.session_user().as_deref(), Some(STANDARD_USER));
        }

        #[tokio::test]
        async fn test_locked_out_banner_and_dismiss() {
            let store = MockStore::new();
            login(&store, LOCKED_OUT_USER, PASSWORD).await;
            let banner: Selector = "[data-test=\"error\"]".into();
            assert!(store.is_visible(&banner).await.unwrap());
            assert_eq!(
                store.inner_text(&banner).await.unwrap(),
                "Epic sadface: Sorry, this user has been locked out."
            );

            store.click(&".error-button".into()).await.unwrap();
            assert_eq!(store.count(&banner).await.unwrap(), 0);
            assert_eq!(store.url().await.unwrap(), BASE);
        }

        #[tokio::test]
        async fn test_glitch_user_login_is_delayed() {
            let store = MockStore::new().with_glitch_delay_ms(40);
            login(&store, PERFORMANCE_GLITCH_USER, PASSWORD).await;
            assert_eq!(store.url().await.unwrap(), BASE);

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(store.url().await.unwrap(), "https://www.saucedemo.com/inventory.html");
        }

        #[tokio::test]
        async fn test_failed_login_keeps_field_values() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, "wrong_password").await;
            let html = store.content().await.unwrap();
            assert!(html.contains(r#"value="standard_user""#));
            assert!(html.contains("do not match any user"));
        }
    }

    mod inventory_tests {
        use super::*;

        #[tokio::test]
        async fn test_names_in_display_order() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, PASSWORD).await;
            let names = store
                .all_text_contents(&".inventory_item_name".into())
                .await
                .unwrap();
            let expected: Vec<String> = PRODUCTS.iter().map(|(n, _)| (*n).to_string()).collect();
            assert_eq!(names, expected);
        }

        #[tokio::test]
        async fn test_text_filter() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, PASSWORD).await;
            let onesie = Selector::css(".inventory_item_name").with_text("sauce labs onesie");
            assert_eq!(store.count(&onesie).await.unwrap(), 1);
            let shirts = Selector::css(".inventory_item_name").with_text("T-Shirt");
            assert_eq!(store.count(&shirts).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_logout_link_hidden_until_menu_opens() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, PASSWORD).await;
            let logout: Selector = "#logout_sidebar_link".into();
            assert_eq!(store.count(&logout).await.unwrap(), 1);
            assert!(!store.is_visible(&logout).await.unwrap());
            assert!(store.click(&logout).await.is_err());

            store.click(&"#react-burger-menu-btn".into()).await.unwrap();
            store.click(&logout).await.unwrap();
            assert_eq!(store.url().await.unwrap(), BASE);
            assert_eq!(store.session_user(), None);
        }

        #[tokio::test]
        async fn test_unknown_selector_matches_nothing() {
            let store = MockStore::new();
            login(&store, STANDARD_USER, PASSWORD).await;
            assert_eq!(store.count(&".no-such-thing".into()).await.unwrap(), 0);
            assert!(!store.is_visible(&".no-such-thing".into()).await.unwrap());
        }
    }

    mod browser_tests {
        use super::*;

        #[tokio::test]
        async fn test_tabs_do_not_share_sessions() {
            let browser = MockBrowser::new();
            let first = browser.new_page().await.unwrap();
            let second = browser.new_page().await.unwrap();
            first.goto(BASE).await.unwrap();
            first.fill(&"#user-name".into(), STANDARD_USER).await.unwrap();
            first.fill(&"#password".into(), PASSWORD).await.unwrap();
            first.click(&"#login-button".into()).await.unwrap();

            second
                .goto("https://www.saucedemo.com/inventory.html")
                .await
                .unwrap();
            assert_eq!(second.url().await.unwrap(), BASE);
            assert_eq!(browser.pages().len(), 2);
        }
    }
}
