//! Chromium backend over the Chrome DevTools Protocol.
//!
//! [`ChromiumBrowser`] owns one browser process and its CDP handler task and
//! hands out a fresh tab per test. [`ChromiumPage`] implements
//! [`BrowserDriver`] on one tab: element primitives are evaluated as small
//! scripts built by [`Selector`], clicks on plain CSS selectors go through
//! CDP input events.

use crate::config::SuiteConfig;
use crate::driver::{BrowserDriver, PageProvider};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Browser instance with real CDP connection
#[derive(Debug)]
pub struct ChromiumBrowser {
    inner: Arc<Mutex<CdpBrowser>>,
    handle: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch a browser configured by `config`
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::BrowserLaunch`] if the process cannot be started.
    #[instrument(skip_all, fields(headless = config.headless))]
    pub async fn launch(config: &SuiteConfig) -> E2eResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms));

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        // Without an explicit path, a build failure means executable detection failed.
        let cdp_config = builder.build().map_err(|message| {
            debug!(%message, "browser config rejected");
            if config.chromium_path.is_none() {
                E2eError::BrowserNotFound
            } else {
                E2eError::BrowserLaunch { message }
            }
        })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // The connection only makes progress while the handler is polled.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(%err, "cdp handler event failed");
                }
            }
        });

        info!("browser launched");
        Ok(Self {
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Close the browser and wait for the process to exit
    pub async fn close(&self) -> E2eResult<()> {
        let mut browser = self.inner.lock().await;
        browser.close().await.map_err(|e| E2eError::Page {
            message: e.to_string(),
        })?;
        let _ = browser.wait().await;
        self.handle.abort();
        info!("browser closed");
        Ok(())
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
impl PageProvider for ChromiumBrowser {
    async fn new_page(&self) -> E2eResult<Arc<dyn BrowserDriver>> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::Page {
                message: e.to_string(),
            })?;
        Ok(Arc::new(ChromiumPage { page }))
    }

    async fn shutdown(&self) -> E2eResult<()> {
        self.close().await
    }
}

/// One Chromium tab
#[derive(Debug)]
pub struct ChromiumPage {
    page: CdpPage,
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, expression: String) -> E2eResult<T> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| E2eError::Script {
                message: e.to_string(),
            })?;
        result.into_value().map_err(|e| E2eError::Script {
            message: e.to_string(),
        })
    }

    fn missing(selector: &Selector) -> E2eError {
        E2eError::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}

#[async_trait]
impl BrowserDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        let url = self.page.url().await.map_err(|e| E2eError::Page {
            message: e.to_string(),
        })?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> E2eResult<String> {
        let title = self.page.get_title().await.map_err(|e| E2eError::Page {
            message: e.to_string(),
        })?;
        Ok(title.unwrap_or_default())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn content(&self) -> E2eResult<String> {
        self.page.content().await.map_err(|e| E2eError::Page {
            message: e.to_string(),
        })
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        self.eval(selector.to_count_query()).await
    }

    async fn is_visible(&self, selector: &Selector) -> E2eResult<bool> {
        self.eval(selector.to_visible_query()).await
    }

    async fn fill(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        let filled: bool = self.eval(selector.to_fill_script(text)).await?;
        if filled {
            Ok(())
        } else {
            Err(Self::missing(selector))
        }
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        match selector {
            Selector::Css(css) => {
                let element = self
                    .page
                    .find_element(css.as_str())
                    .await
                    .map_err(|_| Self::missing(selector))?;
                element.click().await.map_err(|e| E2eError::Script {
                    message: e.to_string(),
                })?;
                Ok(())
            }
            Selector::CssWithText { .. } => {
                let clicked: bool = self.eval(selector.to_click_script()).await?;
                if clicked {
                    Ok(())
                } else {
                    Err(Self::missing(selector))
                }
            }
        }
    }

    async fn inner_text(&self, selector: &Selector) -> E2eResult<String> {
        let text: Vec<String> = self.eval(selector.to_inner_text_query()).await?;
        text.into_iter().next().ok_or_else(|| Self::missing(selector))
    }

    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>> {
        self.eval(selector.to_text_contents_query()).await
    }

    async fn close(&self) -> E2eResult<()> {
        self.page.clone().close().await.map_err(|e| E2eError::Page {
            message: e.to_string(),
        })
    }
}
