//! Driver seam between the page objects and the browser automation backend.
//!
//! The suite consumes a handful of primitives from the automation driver and
//! nothing else. Two backends implement them:
//!
//! - `ChromiumPage` (feature `browser`): a real tab driven over CDP by chromiumoxide
//! - [`MockStore`](crate::mock::MockStore): an in-process model of the store
//!
//! Page objects never see which one they are talking to.

use crate::locator::Selector;
use crate::result::E2eResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Primitive operations on one live browser tab.
///
/// Every method acts on the document currently loaded in the tab and answers
/// immediately; waiting is layered on top by [`Locator`](crate::locator::Locator)
/// and [`PageHandle`](crate::page_object::PageHandle).
#[async_trait]
pub trait BrowserDriver: Send + Sync + Debug {
    /// Navigate to URL and return once the driver reports the load finished
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// URL of the live document
    async fn url(&self) -> E2eResult<String>;

    /// Title of the live document
    async fn title(&self) -> E2eResult<String>;

    /// PNG capture of the viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Serialized DOM of the live document
    async fn content(&self) -> E2eResult<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> E2eResult<usize>;

    /// Whether any match is rendered and not hidden
    async fn is_visible(&self, selector: &Selector) -> E2eResult<bool>;

    /// Replace the value of the first matching input
    async fn fill(&self, selector: &Selector, text: &str) -> E2eResult<()>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> E2eResult<()>;

    /// Rendered text of the first match
    async fn inner_text(&self, selector: &Selector) -> E2eResult<String>;

    /// `textContent` of every match in document order
    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>>;

    /// Close the tab
    async fn close(&self) -> E2eResult<()>;
}

/// Source of fresh, isolated tabs; one per test.
#[async_trait]
pub trait PageProvider: Send + Sync + Debug {
    /// Open a new blank tab
    async fn new_page(&self) -> E2eResult<Arc<dyn BrowserDriver>>;

    /// Release the browser; no tabs can be opened afterwards
    async fn shutdown(&self) -> E2eResult<()>;
}
