//! Suite configuration.
//!
//! Defaults target the public Sauce Demo deployment with a headless browser.
//! Every field can be overridden from the environment so CI can point the
//! suite at a staging copy or show the browser for debugging.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Public Sauce Demo login URL
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Default wait window for element actions (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Default wait window for navigation and URL waits (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval for waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Environment keys read by [`SuiteConfig::from_env`]
pub mod env {
    /// Login URL of the store under test
    pub const BASE_URL: &str = "SAUCE_BASE_URL";
    /// `true`/`false`, show the browser window when `false`
    pub const HEADLESS: &str = "SAUCE_HEADLESS";
    /// Path to the chromium binary
    pub const CHROMIUM_PATH: &str = "CHROMIUM_PATH";
    /// Element action timeout in milliseconds
    pub const TIMEOUT_MS: &str = "SAUCE_TIMEOUT_MS";
    /// Navigation timeout in milliseconds
    pub const NAV_TIMEOUT_MS: &str = "SAUCE_NAV_TIMEOUT_MS";
    /// Directory for temporary trace archives
    pub const TRACE_DIR: &str = "SAUCE_TRACE_DIR";
    /// Directory for test records and attachments
    pub const REPORT_DIR: &str = "SAUCE_REPORT_DIR";
    /// Viewport width in pixels
    pub const VIEWPORT_WIDTH: &str = "SAUCE_VIEWPORT_WIDTH";
    /// Viewport height in pixels
    pub const VIEWPORT_HEIGHT: &str = "SAUCE_VIEWPORT_HEIGHT";
    /// `false` disables the chromium sandbox (containers)
    pub const SANDBOX: &str = "SAUCE_SANDBOX";
}

/// Configuration shared by the browser, the page handles and the fixtures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Login URL; also the exact URL the login page is expected at
    pub base_url: String,
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Wait window for fill/click/read actions
    pub action_timeout_ms: u64,
    /// Wait window for navigation and URL conditions
    pub navigation_timeout_ms: u64,
    /// Polling interval for waits
    pub poll_interval_ms: u64,
    /// Where trace archives are written before being attached
    pub trace_dir: PathBuf,
    /// Where the report sink stores records and attachments
    pub report_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            trace_dir: PathBuf::from("target/saucedemo-e2e/traces"),
            report_dir: PathBuf::from("target/saucedemo-e2e/results"),
        }
    }
}

impl SuiteConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Config`] when a numeric or boolean variable does not parse.
    pub fn from_env() -> E2eResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Config`] when a numeric or boolean value does not parse.
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(env::BASE_URL) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(env::HEADLESS) {
            config.headless = parse_bool(env::HEADLESS, &raw)?;
        }
        if let Some(path) = lookup(env::CHROMIUM_PATH) {
            config.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(env::SANDBOX) {
            config.sandbox = parse_bool(env::SANDBOX, &raw)?;
        }
        if let Some(raw) = lookup(env::TIMEOUT_MS) {
            config.action_timeout_ms = parse_number(env::TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(env::NAV_TIMEOUT_MS) {
            config.navigation_timeout_ms = parse_number(env::NAV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(env::VIEWPORT_WIDTH) {
            config.viewport_width = parse_number(env::VIEWPORT_WIDTH, &raw)?;
        }
        if let Some(raw) = lookup(env::VIEWPORT_HEIGHT) {
            config.viewport_height = parse_number(env::VIEWPORT_HEIGHT, &raw)?;
        }
        if let Some(dir) = lookup(env::TRACE_DIR) {
            config.trace_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(env::REPORT_DIR) {
            config.report_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Set the login URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the element action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout_ms: u64) -> Self {
        self.action_timeout_ms = timeout_ms;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the trace directory
    #[must_use]
    pub fn with_trace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trace_dir = dir.into();
        self
    }

    /// Set the report directory
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Login page URL: the base URL with a trailing slash
    #[must_use]
    pub fn login_url(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }

    /// URL of a page under the store root
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.login_url(), path.trim_start_matches('/'))
    }

    /// Element action timeout as a duration
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Navigation timeout as a duration
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

fn parse_bool(key: &str, raw: &str) -> E2eResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(E2eError::Config {
            key: key.to_string(),
            value: raw.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> E2eResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| E2eError::Config {
        key: key.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, "https://www.saucedemo.com/");
            assert!(config.headless);
            assert!(config.sandbox);
            assert_eq!(config.action_timeout(), Duration::from_secs(5));
            assert_eq!(config.navigation_timeout(), Duration::from_secs(30));
        }

        #[test]
        fn test_builder() {
            let config = SuiteConfig::new()
                .with_base_url("http://localhost:3000/")
                .with_headless(false)
                .with_no_sandbox()
                .with_viewport(800, 600)
                .with_action_timeout(100)
                .with_trace_dir("/tmp/traces");

            assert_eq!(config.base_url, "http://localhost:3000/");
            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.action_timeout_ms, 100);
            assert_eq!(config.trace_dir, PathBuf::from("/tmp/traces"));
        }

        #[test]
        fn test_page_urls() {
            let config = SuiteConfig::new().with_base_url("http://localhost:3000");
            assert_eq!(config.login_url(), "http://localhost:3000/");
            assert_eq!(
                config.page_url("/inventory.html"),
                "http://localhost:3000/inventory.html"
            );
            assert_eq!(
                SuiteConfig::default().page_url("inventory.html"),
                "https://www.saucedemo.com/inventory.html"
            );
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_empty_lookup_keeps_defaults() {
            let config = SuiteConfig::from_lookup(|_| None).unwrap();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_overrides() {
            let config = SuiteConfig::from_lookup(lookup_from(&[
                (env::BASE_URL, "http://staging/"),
                (env::HEADLESS, "false"),
                (env::TIMEOUT_MS, "1500"),
                (env::CHROMIUM_PATH, "/usr/bin/chromium"),
                (env::VIEWPORT_WIDTH, " 1024 "),
            ]))
            .unwrap();

            assert_eq!(config.base_url, "http://staging/");
            assert!(!config.headless);
            assert_eq!(config.action_timeout_ms, 1500);
            assert_eq!(
                config.chromium_path,
                Some(PathBuf::from("/usr/bin/chromium"))
            );
            assert_eq!(config.viewport_width, 1024);
        }

        #[test]
        fn test_bad_bool_rejected() {
            let err = SuiteConfig::from_lookup(lookup_from(&[(env::HEADLESS, "maybe")]))
                .unwrap_err();
            assert!(matches!(err, E2eError::Config { ref key, .. } if key == env::HEADLESS));
        }

        #[test]
        fn test_bad_number_rejected() {
            let err = SuiteConfig::from_lookup(lookup_from(&[(env::NAV_TIMEOUT_MS, "soon")]))
                .unwrap_err();
            assert!(err.to_string().contains("SAUCE_NAV_TIMEOUT_MS=soon"));
        }
    }
}
