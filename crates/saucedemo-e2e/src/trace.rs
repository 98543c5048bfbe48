//! Execution traces.
//!
//! A [`TraceRecorder`] wraps a tab's driver in a recording decorator. Every
//! driver call becomes a [`TraceEvent`]; calls that change the page (goto,
//! fill, click) also capture a screenshot and a DOM snapshot. The recorder is
//! either written out as a zip archive with [`TraceRecorder::stop_to`] or
//! dropped with [`TraceRecorder::discard`].
//!
//! Archive layout:
//!
//! ```text
//! trace.json              manifest: id, test, timestamps, events
//! screenshots/0001.png    capture after event 1
//! snapshots/0001.html     DOM after event 1
//! sources/<file>          test sources
//! ```

use crate::driver::BrowserDriver;
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the manifest inside the archive
pub const MANIFEST_NAME: &str = "trace.json";

/// What a recorder captures besides the action log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceOptions {
    /// Screenshot after each page-changing action
    pub screenshots: bool,
    /// DOM snapshot after each page-changing action
    pub snapshots: bool,
    /// Include registered source files
    pub sources: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            screenshots: true,
            snapshots: true,
            sources: true,
        }
    }
}

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 1-based position in the log
    pub index: usize,
    /// Driver method name
    pub action: String,
    /// Selector acted on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Argument value (URL for goto, text for fill; redacted for passwords)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// When the call started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the call
    pub duration_ms: u64,
    /// Error message if the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Archive path of the screenshot taken after the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Archive path of the DOM snapshot taken after the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

/// Manifest written as `trace.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceManifest {
    /// Unique id of this trace
    pub trace_id: Uuid,
    /// Test the trace belongs to
    pub test: String,
    /// Recorder start
    pub started_at: DateTime<Utc>,
    /// Recorder stop
    pub finished_at: DateTime<Utc>,
    /// Options in effect
    pub options: TraceOptions,
    /// Recorded events
    pub events: Vec<TraceEvent>,
    /// Archive paths of included sources
    pub sources: Vec<String>,
}

#[derive(Debug)]
struct TraceLog {
    events: Vec<TraceEvent>,
    screenshots: Vec<(String, Vec<u8>)>,
    snapshots: Vec<(String, String)>,
    sources: Vec<(String, String)>,
    finished: bool,
}

/// Records driver activity for one test.
///
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    trace_id: Uuid,
    test: String,
    started_at: DateTime<Utc>,
    options: TraceOptions,
    log: Arc<Mutex<TraceLog>>,
}

impl TraceRecorder {
    /// Start recording for `test`
    #[must_use]
    pub fn start(test: impl Into<String>, options: TraceOptions) -> Self {
        let recorder = Self {
            trace_id: Uuid::new_v4(),
            test: test.into(),
            started_at: Utc::now(),
            options,
            log: Arc::new(Mutex::new(TraceLog {
                events: Vec::new(),
                screenshots: Vec::new(),
                snapshots: Vec::new(),
                sources: Vec::new(),
                finished: false,
            })),
        };
        debug!(test = %recorder.test, trace_id = %recorder.trace_id, "trace started");
        recorder
    }

    /// Unique id of this trace
    #[must_use]
    pub const fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    /// Test name the trace was started for
    #[must_use]
    pub fn test(&self) -> &str {
        &self.test
    }

    /// Wrap `driver` so that every call is recorded here
    #[must_use]
    pub fn wrap(&self, driver: Arc<dyn BrowserDriver>) -> Arc<dyn BrowserDriver> {
        Arc::new(TracingDriver {
            inner: driver,
            recorder: self.clone(),
        })
    }

    /// Include a source file under `sources/<name>`
    pub fn add_source(&self, name: &str, contents: impl Into<String>) {
        if !self.options.sources {
            return;
        }
        let file = Path::new(name)
            .file_name()
            .map_or_else(|| name.to_string(), |f| f.to_string_lossy().into_owned());
        let mut log = self.lock();
        if !log.finished {
            log.sources.push((format!("sources/{file}"), contents.into()));
        }
    }

    /// Events recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.lock().events.clone()
    }

    /// Whether the recorder was stopped or discarded
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    /// Stop recording and write the archive to `path`.
    ///
    /// Parent directories are created. Later calls on any clone record nothing.
    pub fn stop_to(&self, path: &Path) -> E2eResult<PathBuf> {
        let mut log = self.lock();
        if log.finished {
            return Err(E2eError::Trace {
                message: format!("trace for {} already stopped", self.test),
            });
        }
        log.finished = true;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let manifest = TraceManifest {
            trace_id: self.trace_id,
            test: self.test.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            options: self.options,
            events: log.events.clone(),
            sources: log.sources.iter().map(|(name, _)| name.clone()).collect(),
        };

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(File::create(path)?);
        zip.start_file(MANIFEST_NAME, options)?;
        zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;
        for (name, png) in &log.screenshots {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(png)?;
        }
        for (name, html) in &log.snapshots {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(html.as_bytes())?;
        }
        for (name, text) in &log.sources {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(text.as_bytes())?;
        }
        zip.finish()?;

        debug!(
            test = %self.test,
            path = %path.display(),
            events = log.events.len(),
            "trace written"
        );
        Ok(path.to_path_buf())
    }

    /// Stop recording and drop everything captured
    pub fn discard(&self) {
        let mut log = self.lock();
        log.finished = true;
        log.events.clear();
        log.screenshots.clear();
        log.snapshots.clear();
        log.sources.clear();
        debug!(test = %self.test, "trace discarded");
    }

    fn lock(&self) -> MutexGuard<'_, TraceLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, mut event: TraceEvent, capture: Option<(Option<Vec<u8>>, Option<String>)>) {
        let mut log = self.lock();
        if log.finished {
            return;
        }
        event.index = log.events.len() + 1;
        if let Some((png, html)) = capture {
            if let Some(png) = png {
                let name = format!("screenshots/{:04}.png", event.index);
                event.screenshot = Some(name.clone());
                log.screenshots.push((name, png));
            }
            if let Some(html) = html {
                let name = format!("snapshots/{:04}.html", event.index);
                event.snapshot = Some(name.clone());
                log.snapshots.push((name, html));
            }
        }
        log.events.push(event);
    }
}

/// Driver decorator that reports every call to a [`TraceRecorder`]
#[derive(Debug)]
struct TracingDriver {
    inner: Arc<dyn BrowserDriver>,
    recorder: TraceRecorder,
}

impl TracingDriver {
    async fn record<T>(
        &self,
        action: &str,
        selector: Option<&Selector>,
        value: Option<&str>,
        changes_page: bool,
        outcome: impl std::future::Future<Output = E2eResult<T>> + Send,
    ) -> E2eResult<T> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let result = outcome.await;
        let duration_ms = clock.elapsed().as_millis() as u64;

        let capture = if changes_page && !self.recorder.is_finished() {
            Some(self.capture().await)
        } else {
            None
        };

        let event = TraceEvent {
            index: 0,
            action: action.to_string(),
            selector: selector.map(ToString::to_string),
            value: value.map(|v| redact(selector, v)),
            started_at,
            duration_ms,
            error: result.as_ref().err().map(ToString::to_string),
            screenshot: None,
            snapshot: None,
        };
        self.recorder.push(event, capture);
        result
    }

    async fn capture(&self) -> (Option<Vec<u8>>, Option<String>) {
        let options = self.recorder.options;
        let png = if options.screenshots {
            self.inner
                .screenshot()
                .await
                .map_err(|err| warn!(%err, "trace screenshot failed"))
                .ok()
        } else {
            None
        };
        let html = if options.snapshots {
            self.inner
                .content()
                .await
                .map_err(|err| warn!(%err, "trace snapshot failed"))
                .ok()
        } else {
            None
        };
        (png, html)
    }
}

fn redact(selector: Option<&Selector>, value: &str) -> String {
    match selector {
        Some(s) if s.css_part().contains("password") => "*".repeat(value.chars().count()),
        _ => value.to_string(),
    }
}

#[async_trait]
impl BrowserDriver for TracingDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record("goto", None, Some(url), true, self.inner.goto(url))
            .await
    }

    async fn url(&self) -> E2eResult<String> {
        self.inner.url().await
    }

    async fn title(&self) -> E2eResult<String> {
        self.inner.title().await
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.record("screenshot", None, None, false, self.inner.screenshot())
            .await
    }

    async fn content(&self) -> E2eResult<String> {
        self.inner.content().await
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        self.inner.count(selector).await
    }

    async fn is_visible(&self, selector: &Selector) -> E2eResult<bool> {
        self.inner.is_visible(selector).await
    }

    async fn fill(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        self.record(
            "fill",
            Some(selector),
            Some(text),
            true,
            self.inner.fill(selector, text),
        )
        .await
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        self.record("click", Some(selector), None, true, self.inner.click(selector))
            .await
    }

    async fn inner_text(&self, selector: &Selector) -> E2eResult<String> {
        self.record(
            "inner_text",
            Some(selector),
            None,
            false,
            self.inner.inner_text(selector),
        )
        .await
    }

    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>> {
        self.record(
            "all_text_contents",
            Some(selector),
            None,
            false,
            self.inner.all_text_contents(selector),
        )
        .await
    }

    async fn close(&self) -> E2eResult<()> {
        self.inner.close().await
    }
}
