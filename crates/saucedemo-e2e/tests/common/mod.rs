//! Scenarios shared by the mock-backed and live test binaries.
//!
//! Each scenario is an async fn over a [`PageFixture`] so the same body runs
//! against [`MockBrowser`] in `login.rs`/`inventory.rs` and against Chromium
//! in `live.rs`.

#![allow(dead_code, clippy::unwrap_used)]

use saucedemo_e2e::accounts::{
    LoginFailure, LOCKED_OUT_USER, PASSWORD, PERFORMANCE_GLITCH_USER, STANDARD_USER,
};
use saucedemo_e2e::mock::{MockBrowser, MockSettings};
use saucedemo_e2e::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

/// Delay the mock applies to `performance_glitch_user`, longer than the action window
pub const GLITCH_DELAY_MS: u64 = 600;

/// Mock-backed harness plus handles for inspecting it afterwards
pub struct MockSuite {
    pub harness: Harness,
    pub browser: Arc<MockBrowser>,
    pub reporter: Arc<ArtifactReporter>,
    _dir: TempDir,
}

pub fn mock_suite() -> MockSuite {
    logging::init();
    let dir = tempfile::tempdir().unwrap();
    let config = SuiteConfig::default()
        .with_action_timeout(300)
        .with_navigation_timeout(3_000)
        .with_poll_interval(10)
        .with_trace_dir(dir.path().join("traces"))
        .with_report_dir(dir.path().join("results"));
    let browser = Arc::new(MockBrowser::with_settings(MockSettings {
        glitch_delay_ms: GLITCH_DELAY_MS,
        ..MockSettings::default()
    }));
    let reporter = Arc::new(ArtifactReporter::new(config.report_dir.clone()));
    let harness = Harness::new(browser.clone(), reporter.clone(), config);
    MockSuite {
        harness,
        browser,
        reporter,
        _dir: dir,
    }
}

/// Turn a condition into an assertion error
pub fn ensure(condition: bool, message: impl Into<String>) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message))
    }
}

/// Login-feature case; pass `file!()` as `source` so traces carry the caller
pub fn login_case(name: &str, story: &str, severity: Severity, source: &str) -> TestCase {
    TestCase::new(name)
        .feature("Login")
        .story(story)
        .severity(severity)
        .tag("smoke")
        .tag("login")
        .source(source)
}

/// Inventory-feature case; pass `file!()` as `source`
pub fn inventory_case(name: &str, story: &str, source: &str) -> TestCase {
    TestCase::new(name)
        .feature("Inventory")
        .story(story)
        .severity(Severity::Normal)
        .tag("inventory")
        .source(source)
}

async fn assert_inventory_loaded(fx: &PageFixture) -> E2eResult<()> {
    let inventory = fx.inventory_page();
    inventory.wait_for_load().await?;

    ensure(inventory.is_current_page().await?, "not on the inventory page")?;
    ensure(
        inventory.current_url().await?.contains("inventory.html"),
        "url does not contain inventory.html",
    )?;
    ensure(
        inventory.is_container_visible().await?,
        "inventory container hidden",
    )?;
    let count = inventory.product_count().await?;
    ensure(count == 6, format!("Expected 6 products, found {count}"))
}

async fn assert_refused(
    fx: &PageFixture,
    username: &str,
    password: &str,
    failure: LoginFailure,
) -> E2eResult<()> {
    let login = fx.login_page();
    login.open().await?;
    ensure(login.is_current_page().await?, "login page did not open")?;

    login.login(username, password).await?;

    ensure(login.has_error().await?, "no error banner")?;
    let actual = login.error_text().await?;
    ensure(
        actual == failure.message(),
        format!("Expected error message: '{}', but got: '{actual}'", failure.message()),
    )?;
    ensure(login.is_current_page().await?, "left the login page")?;
    ensure(
        !fx.inventory_page().is_current_page().await?,
        "refused login reached the inventory",
    )
}

pub async fn successful_login_standard_user(fx: PageFixture) -> E2eResult<()> {
    let login = fx.login_page();
    login.open().await?;
    ensure(login.is_current_page().await?, "login page did not open")?;

    login.login(STANDARD_USER, PASSWORD).await?;
    assert_inventory_loaded(&fx).await?;
    ensure(
        !login.is_current_page().await?,
        "still on the login page after a valid login",
    )
}

pub async fn login_with_invalid_password(fx: PageFixture) -> E2eResult<()> {
    assert_refused(&fx, STANDARD_USER, "wrong_password", LoginFailure::Mismatch).await
}

pub async fn login_locked_out_user(fx: PageFixture) -> E2eResult<()> {
    assert_refused(&fx, LOCKED_OUT_USER, PASSWORD, LoginFailure::LockedOut).await
}

pub async fn login_with_empty_fields(fx: PageFixture) -> E2eResult<()> {
    assert_refused(&fx, "", "", LoginFailure::UsernameRequired).await
}

pub async fn login_with_performance_glitch_user(fx: PageFixture) -> E2eResult<()> {
    let login = fx.login_page();
    login.open().await?;
    ensure(login.is_current_page().await?, "login page did not open")?;

    login.login(PERFORMANCE_GLITCH_USER, PASSWORD).await?;
    assert_inventory_loaded(&fx).await
}

pub async fn dismiss_error_is_idempotent(fx: PageFixture) -> E2eResult<()> {
    let login = fx.login_page();
    login.open().await?.login(STANDARD_USER, "wrong_password").await?;
    ensure(login.has_error().await?, "no error banner")?;

    login.dismiss_error().await?;
    ensure(!login.has_error().await?, "banner still shown after dismiss")?;
    login.dismiss_error().await?;
    ensure(!login.has_error().await?, "second dismiss changed state")?;
    ensure(login.is_current_page().await?, "dismiss left the login page")
}

pub async fn product_names_match_listing(fx: PageFixture) -> E2eResult<()> {
    let inventory = fx.authenticated_page().await?;
    let names = inventory.product_names().await?;
    let count = inventory.product_count().await?;

    ensure(!names.is_empty(), "no product names")?;
    ensure(
        names.len() == count,
        format!("{} names for {count} products", names.len()),
    )?;
    for name in &names {
        ensure(inventory.has_product(name).await?, format!("{name} not visible"))?;
    }
    ensure(
        names.first().map(String::as_str) == Some("Sauce Labs Backpack"),
        format!("unexpected first product {:?}", names.first()),
    )
}

pub async fn logout_returns_to_login(fx: PageFixture) -> E2eResult<()> {
    let inventory = fx.authenticated_page().await?;
    ensure(inventory.is_cart_link_visible().await?, "cart link hidden")?;

    inventory.logout().await?;
    ensure(fx.login_page().is_current_page().await?, "logout did not reach login")?;
    ensure(!inventory.is_current_page().await?, "still on the inventory page")
}

pub async fn inventory_requires_login(fx: PageFixture) -> E2eResult<()> {
    let inventory = fx.inventory_page();
    inventory
        .navigate(&fx.config().page_url(InventoryPage::PATH))
        .await?;

    let login = fx.login_page();
    ensure(login.is_current_page().await?, "deep link was not redirected")?;
    ensure(
        login.error_text().await? == LoginFailure::InventoryRequiresLogin.message(),
        "missing deep-link banner",
    )?;
    ensure(inventory.product_count().await? == 0, "products listed without a session")
}
