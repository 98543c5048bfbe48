//! Locator abstraction for element selection and interaction.
//!
//! A [`Selector`] is plain data: a CSS selector plus an optional text filter.
//! A [`Locator`] binds a selector to a live [`PageHandle`] and re-resolves it
//! on every call; nothing about the matched elements is cached.
//!
//! Actions (`fill`, `click`, `inner_text`) auto-wait: they poll until the
//! element is actionable or the page's action timeout runs out. Queries
//! (`count`, `is_visible`, `all_text_contents`) answer immediately.

use std::fmt;

use crate::page_object::PageHandle;
use crate::result::{E2eError, E2eResult};
use crate::wait::wait_for;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "#login-button")
    Css(String),
    /// CSS selector narrowed to elements whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match (case-insensitive, whitespace-normalized)
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Narrow by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let css = match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        };
        Self::CssWithText {
            css,
            text: text.into(),
        }
    }

    /// The CSS part of the selector
    #[must_use]
    pub fn css_part(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// The text filter, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::Css(_) => None,
            Self::CssWithText { text, .. } => Some(text),
        }
    }

    /// Whether `candidate` passes the text filter.
    ///
    /// Mirrors the script side: whitespace runs collapse to one space, the
    /// result is trimmed, and the comparison is a case-insensitive substring.
    #[must_use]
    pub fn matches_text(&self, candidate: &str) -> bool {
        match self.text_filter() {
            None => true,
            Some(text) => normalize(candidate).contains(&normalize(text)),
        }
    }

    /// JavaScript expression evaluating to the array of matched elements
    #[must_use]
    pub fn to_all_query(&self) -> String {
        let css = js_literal(self.css_part());
        match self.text_filter() {
            None => format!("Array.from(document.querySelectorAll({css}))"),
            Some(text) => {
                let text = js_literal(&normalize(text));
                format!(
                    "Array.from(document.querySelectorAll({css})).filter(el => \
                     (el.textContent || '').replace(/\\s+/g, ' ').trim().toLowerCase() \
                     .includes({text}))"
                )
            }
        }
    }

    /// JavaScript expression evaluating to the first match or `undefined`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{}[0]", self.to_all_query())
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_all_query())
    }

    /// JavaScript expression evaluating to whether any match is visible
    #[must_use]
    pub fn to_visible_query(&self) -> String {
        format!(
            "{}.some(el => {{ const style = window.getComputedStyle(el); \
             const rect = el.getBoundingClientRect(); \
             return style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0; }})",
            self.to_all_query()
        )
    }

    /// JavaScript expression evaluating to `[innerText]` of the first match, or `[]`
    #[must_use]
    pub fn to_inner_text_query(&self) -> String {
        format!(
            "(() => {{ const el = {}; return el ? [el.innerText] : []; }})()",
            self.to_query()
        )
    }

    /// JavaScript expression evaluating to every match's `textContent`
    #[must_use]
    pub fn to_text_contents_query(&self) -> String {
        format!("{}.map(el => el.textContent || '')", self.to_all_query())
    }

    /// Script replacing an input's value; evaluates to `false` if nothing matched.
    ///
    /// Uses the native value setter and dispatches `input`/`change` so that
    /// framework-controlled inputs (React) observe the new value.
    #[must_use]
    pub fn to_fill_script(&self, value: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; el.focus(); \
             const proto = Object.getPrototypeOf(el); \
             const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
             if (desc && desc.set) {{ desc.set.call(el, {}); }} else {{ el.value = {}; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            self.to_query(),
            js_literal(value),
            js_literal(value)
        )
    }

    /// Script clicking the first match; evaluates to `false` if nothing matched
    #[must_use]
    pub fn to_click_script(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
            self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::CssWithText { css, text } => write!(f, "{css} >> has_text={text:?}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::css(css)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// JSON string encoding is a valid JavaScript string literal.
fn js_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

/// A selector bound to a live page.
#[derive(Debug, Clone)]
pub struct Locator<'p> {
    page: &'p PageHandle,
    selector: Selector,
}

impl<'p> Locator<'p> {
    pub(crate) const fn new(page: &'p PageHandle, selector: Selector) -> Self {
        Self { page, selector }
    }

    /// The selector this locator resolves
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Narrow by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            page: self.page,
            selector: self.selector.with_text(text),
        }
    }

    /// Number of matching elements right now
    pub async fn count(&self) -> E2eResult<usize> {
        self.page.driver().count(&self.selector).await
    }

    /// Whether any match is visible right now (no waiting)
    pub async fn is_visible(&self) -> E2eResult<bool> {
        self.page.driver().is_visible(&self.selector).await
    }

    /// `textContent` of every match, in document order
    pub async fn all_text_contents(&self) -> E2eResult<Vec<String>> {
        self.page.driver().all_text_contents(&self.selector).await
    }

    /// Wait until a match is visible.
    ///
    /// Fails with [`E2eError::ElementNotFound`] if nothing matches when the
    /// window closes, and with [`E2eError::Timeout`] if something matches
    /// but never becomes visible.
    pub async fn wait_for_visible(&self) -> E2eResult<()> {
        let options = self.page.action_wait();
        let outcome = wait_for(
            move || self.is_visible(),
            options,
            &format!("{} to be visible", self.selector),
        )
        .await;
        self.explain_missing(outcome).await
    }

    /// Wait until at least one element matches
    pub async fn wait_for_attached(&self) -> E2eResult<()> {
        let options = self.page.action_wait();
        let outcome = wait_for(
            move || async move { Ok(self.count().await? > 0) },
            options,
            &format!("{} to be attached", self.selector),
        )
        .await;
        self.explain_missing(outcome).await
    }

    /// Replace the content of the matched input
    pub async fn fill(&self, text: &str) -> E2eResult<()> {
        self.wait_for_visible().await?;
        self.page.driver().fill(&self.selector, text).await
    }

    /// Click the matched element
    pub async fn click(&self) -> E2eResult<()> {
        self.wait_for_visible().await?;
        self.page.driver().click(&self.selector).await
    }

    /// `innerText` of the first match, waiting for it to be attached
    pub async fn inner_text(&self) -> E2eResult<String> {
        self.wait_for_attached().await?;
        self.page.driver().inner_text(&self.selector).await
    }

    async fn explain_missing(&self, outcome: E2eResult<()>) -> E2eResult<()> {
        match outcome {
            Err(err) if err.is_timeout() => {
                if self.count().await? == 0 {
                    Err(E2eError::ElementNotFound {
                        selector: self.selector.to_string(),
                    })
                } else {
                    Err(err)
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let selector = Selector::css("#user-name");
            assert_eq!(selector.css_part(), "#user-name");
            assert!(selector.text_filter().is_none());
            assert_eq!(selector.to_string(), "#user-name");
        }

        #[test]
        fn test_with_text_replaces_filter() {
            let selector = Selector::css(".inventory_item_name")
                .with_text("Backpack")
                .with_text("Onesie");
            assert_eq!(selector.css_part(), ".inventory_item_name");
            assert_eq!(selector.text_filter(), Some("Onesie"));
        }

        #[test]
        fn test_matches_text_is_normalized_substring() {
            let selector = Selector::css(".inventory_item_name").with_text("labs  BACKPACK");
            assert!(selector.matches_text("Sauce Labs Backpack"));
            assert!(selector.matches_text("  Sauce\n Labs   Backpack "));
            assert!(!selector.matches_text("Sauce Labs Bike Light"));
        }

        #[test]
        fn test_plain_css_matches_any_text() {
            assert!(Selector::css("div").matches_text("anything"));
        }
    }

    mod script_tests {
        use super::*;

        #[test]
        fn test_count_query() {
            let selector = Selector::css(".inventory_item");
            assert_eq!(
                selector.to_count_query(),
                r#"Array.from(document.querySelectorAll(".inventory_item")).length"#
            );
        }

        #[test]
        fn test_attribute_selector_is_escaped() {
            let selector = Selector::css("[data-test='error']");
            assert!(selector
                .to_query()
                .contains(r#"document.querySelectorAll("[data-test='error']")"#));
        }

        #[test]
        fn test_text_filter_is_lowercased_in_script() {
            let query = Selector::css("a").with_text("Sauce Labs").to_all_query();
            assert!(query.contains(r#".includes("sauce labs")"#));
        }

        #[test]
        fn test_fill_script_escapes_value() {
            let script = Selector::css("#password").to_fill_script(r#"a"); alert("x"#);
            assert!(script.contains(r#""a\"); alert(\"x""#));
            assert!(script.contains("new Event('input'"));
        }

        #[test]
        fn test_visible_query_checks_every_match() {
            let query = Selector::css(".inventory_item_name")
                .with_text("T-Shirt")
                .to_visible_query();
            assert!(query.starts_with("Array.from(document.querySelectorAll("));
            assert!(query.contains(".some(el =>"));
            assert!(!query.contains("[0]"));
        }

        #[test]
        fn test_click_script_reports_missing() {
            let script = Selector::css("#login-button").to_click_script();
            assert!(script.contains("if (!el) return false"));
        }
    }
}
