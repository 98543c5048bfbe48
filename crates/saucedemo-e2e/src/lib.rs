//! saucedemo-e2e: Page Object end-to-end suite for the Sauce Demo store
//!
//! Page objects wrap a live browser tab and expose the store's operations
//! (open the login page, log in, read the error banner, list products).
//! Test cases run through a fixture that gives every test its own tab,
//! records a trace, and attaches that trace to the report when the test fails.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Test case    │──►│ run_traced   │──►│ LoginPage /  │──►│ PageHandle   │
//! │ (tests/*.rs) │   │ PageFixture  │   │ InventoryPage│   │ Locator      │
//! └──────────────┘   └──────┬───────┘   └──────────────┘   └──────┬───────┘
//!                           │                                     │
//!                    ┌──────▼───────┐                      ┌──────▼───────┐
//!                    │ ReportSink   │                      │ TraceRecorder│
//!                    │ (attachments)│                      │ BrowserDriver│
//!                    └──────────────┘                      └──────┬───────┘
//!                                                   ┌─────────────┴────────┐
//!                                             ChromiumPage (CDP)      MockStore
//! ```
//!
//! The `browser` feature (default) enables the chromiumoxide backend. The
//! [`mock`] backend needs no browser and is what the unit tests run on.

#![warn(missing_docs)]

pub mod accounts;
#[cfg(feature = "browser")]
mod browser;
mod case;
pub mod config;
mod driver;
mod fixture;
mod locator;
pub mod logging;
pub mod mock;
mod page_object;
pub mod pages;
mod reporter;
mod result;
pub mod trace;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage};
pub use case::{Severity, TestCase};
pub use config::SuiteConfig;
pub use driver::{BrowserDriver, PageProvider};
pub use fixture::{run_traced, Harness, PageFixture, TRACE_ATTACHMENT_NAME};
pub use locator::{Locator, Selector};
pub use page_object::{PageHandle, PageObject};
pub use pages::{InventoryPage, LoginPage};
pub use reporter::{
    ArtifactReporter, Attachment, ReportSink, TestRecord, TestStatus, ZIP_MIME,
};
pub use result::{E2eError, E2eResult};
pub use trace::{TraceOptions, TraceRecorder};
pub use wait::{wait_for, UrlPattern, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::accounts::{Credentials, LoginFailure};
    pub use super::*;
}
