//! Test fixtures: per-test page provisioning, tracing and teardown.
//!
//! [`run_traced`] is the lifecycle every test goes through:
//!
//! 1. open a fresh tab from the harness's [`PageProvider`]
//! 2. start a [`TraceRecorder`] on it
//! 3. run the test body with a [`PageFixture`]
//! 4. on failure (returned `Err` or panic) write `trace_<test>.zip`, attach it
//!    to the report and delete the local copy; on success discard the trace
//! 5. close the tab and record the outcome
//!
//! Panics are re-raised after teardown so the test harness still reports them.
//! A passing body whose teardown fails is an error.
//!
//! ```ignore
//! #[tokio::test]
//! async fn test_valid_login() -> E2eResult<()> {
//!     let harness = Harness::launch(SuiteConfig::from_env()?).await?;
//!     run_traced(&harness, TestCase::new("test_valid_login"), |fx| async move {
//!         let inventory = fx.authenticated_page().await?;
//!         assert_eq!(inventory.product_count().await?, 6);
//!         Ok(())
//!     })
//!     .await
//! }
//! ```

use crate::accounts::Credentials;
use crate::case::TestCase;
use crate::config::SuiteConfig;
use crate::driver::PageProvider;
use crate::page_object::PageHandle;
use crate::pages::{InventoryPage, LoginPage};
use crate::reporter::{ReportSink, TestRecord, TestStatus, ZIP_MIME};
use crate::result::{E2eError, E2eResult};
use crate::trace::{TraceOptions, TraceRecorder};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Attachment name of the trace archive in the report
pub const TRACE_ATTACHMENT_NAME: &str = "Trace: view with a trace viewer";

/// Everything a test run needs besides the test itself
#[derive(Debug, Clone)]
pub struct Harness {
    provider: Arc<dyn PageProvider>,
    reporter: Arc<dyn ReportSink>,
    config: SuiteConfig,
    trace_options: TraceOptions,
}

impl Harness {
    /// Assemble a harness from its parts
    #[must_use]
    pub fn new(
        provider: Arc<dyn PageProvider>,
        reporter: Arc<dyn ReportSink>,
        config: SuiteConfig,
    ) -> Self {
        Self {
            provider,
            reporter,
            config,
            trace_options: TraceOptions::default(),
        }
    }

    /// Launch Chromium and report into `config.report_dir`
    #[cfg(feature = "browser")]
    pub async fn launch(config: SuiteConfig) -> E2eResult<Self> {
        let browser = crate::browser::ChromiumBrowser::launch(&config).await?;
        let reporter = crate::reporter::ArtifactReporter::new(config.report_dir.clone());
        Ok(Self::new(Arc::new(browser), Arc::new(reporter), config))
    }

    /// Override what traces capture
    #[must_use]
    pub const fn with_trace_options(mut self, options: TraceOptions) -> Self {
        self.trace_options = options;
        self
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Where outcomes and attachments go
    #[must_use]
    pub fn reporter(&self) -> &dyn ReportSink {
        self.reporter.as_ref()
    }

    /// Where tabs come from
    #[must_use]
    pub fn provider(&self) -> &dyn PageProvider {
        self.provider.as_ref()
    }

    /// Close the browser behind this harness
    pub async fn shutdown(&self) -> E2eResult<()> {
        self.provider.shutdown().await
    }

    /// Run `body` under [`run_traced`]
    pub async fn run<F, Fut>(&self, case: TestCase, body: F) -> E2eResult<()>
    where
        F: FnOnce(PageFixture) -> Fut,
        Fut: Future<Output = E2eResult<()>>,
    {
        run_traced(self, case, body).await
    }
}

/// What a test body receives: its own tab plus page-object constructors.
#[derive(Debug, Clone)]
pub struct PageFixture {
    page: PageHandle,
    config: SuiteConfig,
}

impl PageFixture {
    /// Fixture over an existing handle
    #[must_use]
    pub fn new(page: PageHandle, config: SuiteConfig) -> Self {
        Self { page, config }
    }

    /// The test's tab
    #[must_use]
    pub const fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Login page object bound to this tab
    #[must_use]
    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(self.page.clone(), &self.config)
    }

    /// Inventory page object bound to this tab
    #[must_use]
    pub fn inventory_page(&self) -> InventoryPage {
        InventoryPage::new(self.page.clone(), &self.config)
    }

    /// Log in as `standard_user` and wait for the inventory
    pub async fn authenticated_page(&self) -> E2eResult<InventoryPage> {
        self.authenticated_as(&Credentials::standard()).await
    }

    /// Log in with `credentials` and wait for the inventory
    #[instrument(name = "Authenticate", skip_all, fields(username = %credentials.username))]
    pub async fn authenticated_as(&self, credentials: &Credentials) -> E2eResult<InventoryPage> {
        let login = self.login_page();
        login
            .open()
            .await?
            .login(&credentials.username, &credentials.password)
            .await?;
        let inventory = self.inventory_page();
        inventory.wait_for_load().await?;
        Ok(inventory)
    }
}

enum Outcome {
    Passed,
    Errored(E2eError),
    Panicked(Box<dyn Any + Send>),
}

/// Run one test body with a fresh traced tab.
///
/// Returns the body's own result. When the body passed, a failure to close
/// the tab or record the outcome is returned as [`E2eError::Fixture`];
/// otherwise teardown problems are only logged.
#[instrument(name = "test", skip_all, fields(test = %case.name))]
pub async fn run_traced<F, Fut>(harness: &Harness, case: TestCase, body: F) -> E2eResult<()>
where
    F: FnOnce(PageFixture) -> Fut,
    Fut: Future<Output = E2eResult<()>>,
{
    let config = harness.config.clone();
    let recorder = TraceRecorder::start(case.name.clone(), harness.trace_options);
    if let Some(source) = &case.source {
        add_source(&recorder, source).await;
    }

    let started = Instant::now();
    let driver = match harness.provider.new_page().await {
        Ok(driver) => driver,
        Err(err) => {
            recorder.discard();
            report(
                harness,
                TestRecord::failed(case, TestStatus::Broken, started.elapsed(), err.to_string()),
            );
            return Err(err);
        }
    };
    let page = PageHandle::new(recorder.wrap(driver), &config);
    let fixture = PageFixture::new(page.clone(), config.clone());

    info!("test started");
    let outcome = match AssertUnwindSafe(body(fixture)).catch_unwind().await {
        Ok(Ok(())) => Outcome::Passed,
        Ok(Err(err)) => Outcome::Errored(err),
        Err(panic) => Outcome::Panicked(panic),
    };
    let duration = started.elapsed();

    let mut record = match &outcome {
        Outcome::Passed => {
            recorder.discard();
            TestRecord::passed(case.clone(), duration)
        }
        Outcome::Errored(err) => {
            attach_trace(harness, &recorder, &case);
            TestRecord::failed(case.clone(), TestStatus::for_error(err), duration, err.to_string())
        }
        Outcome::Panicked(panic) => {
            attach_trace(harness, &recorder, &case);
            let message = panic_message(panic.as_ref());
            TestRecord::failed(case.clone(), TestStatus::Failed, duration, message)
        }
    };

    let closed = page.close().await;
    if let Err(err) = &closed {
        warn!(%err, "closing page failed");
    }

    record.finished_at = chrono::Utc::now();
    info!(status = ?record.status, duration_ms = duration.as_millis() as u64, "test finished");
    let recorded = harness.reporter.record(record);
    if let Err(err) = &recorded {
        warn!(%err, "recording test outcome failed");
    }

    match outcome {
        Outcome::Passed => closed.and(recorded).map_err(|err| E2eError::Fixture {
            message: format!("teardown of {} failed: {err}", case.name),
        }),
        Outcome::Errored(err) => Err(err),
        Outcome::Panicked(panic) => std::panic::resume_unwind(panic),
    }
}

/// Write the trace, hand it to the reporter, then delete the local file
fn attach_trace(harness: &Harness, recorder: &TraceRecorder, case: &TestCase) {
    let path = harness.config.trace_dir.join(case.trace_file_name());
    let written = match recorder.stop_to(&path) {
        Ok(written) => written,
        Err(err) => {
            warn!(%err, path = %path.display(), "writing trace failed");
            return;
        }
    };
    match harness
        .reporter
        .attach(&case.name, TRACE_ATTACHMENT_NAME, &written, ZIP_MIME)
    {
        Ok(attachment) => debug!(stored = %attachment.path.display(), "trace attached"),
        Err(err) => warn!(%err, "attaching trace failed"),
    }
    if let Err(err) = std::fs::remove_file(&written) {
        warn!(%err, path = %written.display(), "removing local trace failed");
    }
}

fn report(harness: &Harness, record: TestRecord) {
    if let Err(err) = harness.reporter.record(record) {
        warn!(%err, "recording test outcome failed");
    }
}

async fn add_source(recorder: &TraceRecorder, source: &str) {
    let Some(path) = locate_source(Path::new(source)) else {
        debug!(source, "test source not found");
        return;
    };
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => recorder.add_source(source, text),
        Err(err) => debug!(%err, source, "reading test source failed"),
    }
}

/// `file!()` paths are workspace-relative while tests run in the crate directory
fn locate_source(source: &Path) -> Option<PathBuf> {
    if source.is_absolute() || source.exists() {
        return Some(source.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(source))
        .find(|candidate| candidate.exists())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}
