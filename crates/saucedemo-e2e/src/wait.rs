//! Wait mechanisms.
//!
//! Every awaited condition in the suite goes through [`wait_for`]: poll a
//! fallible async predicate until it holds or the window closes. Nothing is
//! retried beyond that window.

use crate::config::SuiteConfig;
use crate::result::{E2eError, E2eResult};
use regex::Regex;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::trace;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: crate::config::DEFAULT_ACTION_TIMEOUT_MS,
            poll_interval_ms: crate::config::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Action wait window from the suite config
    #[must_use]
    pub const fn for_actions(config: &SuiteConfig) -> Self {
        Self {
            timeout_ms: config.action_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
        }
    }

    /// Navigation wait window from the suite config
    #[must_use]
    pub const fn for_navigation(config: &SuiteConfig) -> Self {
        Self {
            timeout_ms: config.navigation_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `condition` until it returns `Ok(true)` or the window closes.
///
/// A poll that errors is retried like a `false` (pages mid-navigation reject
/// script evaluation). If the window closes and the last poll errored, that
/// error is returned instead of the timeout.
pub async fn wait_for<F, Fut>(
    mut condition: F,
    options: WaitOptions,
    description: &str,
) -> E2eResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<bool>>,
{
    let start = Instant::now();

    loop {
        let last_error = match condition().await {
            Ok(true) => return Ok(()),
            Ok(false) => None,
            Err(err) => {
                trace!(%err, condition = description, "wait poll failed");
                Some(err)
            }
        };

        if start.elapsed() >= options.timeout() {
            return Err(last_error.unwrap_or_else(|| E2eError::Timeout {
                condition: description.to_string(),
                ms: options.timeout_ms,
            }));
        }

        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// URL pattern for page identity checks and URL waits
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Glob pattern (`**` crosses `/`, `*` does not)
    Glob(String),
}

impl UrlPattern {
    /// Glob pattern, e.g. `**/inventory.html`
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Glob(pattern) => Regex::new(&glob_to_regex(pattern))
                .map(|re| re.is_match(url))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "url == {p}"),
            Self::Contains(p) => write!(f, "url containing {p}"),
            Self::Glob(p) => write!(f, "url {p}"),
        }
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                let _ = chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
    }
    out.push('$');
    out
}
