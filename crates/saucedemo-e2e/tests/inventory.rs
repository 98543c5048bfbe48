//! Inventory scenarios against the in-process store.

mod common;

use common::{inventory_case, mock_suite};
use saucedemo_e2e::prelude::*;

#[tokio::test]
async fn test_product_names_match_listing() -> E2eResult<()> {
    let suite = mock_suite();
    let case = inventory_case(
        "test_product_names_match_listing",
        "Product Listing",
        file!(),
    );
    suite
        .harness
        .run(case, common::product_names_match_listing)
        .await
}

#[tokio::test]
async fn test_logout_returns_to_login() -> E2eResult<()> {
    let suite = mock_suite();
    let case = inventory_case("test_logout_returns_to_login", "Logout", file!());
    suite.harness.run(case, common::logout_returns_to_login).await
}

#[tokio::test]
async fn test_inventory_requires_login() -> E2eResult<()> {
    let suite = mock_suite();
    let case = inventory_case("test_inventory_requires_login", "Access Control", file!());
    suite.harness.run(case, common::inventory_requires_login).await
}

#[tokio::test]
async fn test_authenticated_page_fixture() -> E2eResult<()> {
    let suite = mock_suite();
    let case = inventory_case(
        "test_authenticated_page_fixture",
        "Session Setup",
        file!(),
    );
    suite
        .harness
        .run(case, |fx| async move {
            let inventory = fx.authenticated_page().await?;
            common::ensure(inventory.is_current_page().await?, "not logged in")?;
            common::ensure(inventory.has_product("Onesie").await?, "onesie missing")?;
            common::ensure(
                !inventory.has_product("Sauce Labs Toaster").await?,
                "unexpected product",
            )
        })
        .await?;
    assert_eq!(suite.browser.pages().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_screenshot_of_inventory() -> E2eResult<()> {
    let suite = mock_suite();
    let shots = tempfile::tempdir().unwrap();
    let path = shots.path().join("inventory.png");
    let target = path.clone();
    let case = inventory_case("test_screenshot_of_inventory", "Evidence", file!());
    suite
        .harness
        .run(case, |fx| async move {
            let inventory = fx.authenticated_page().await?;
            inventory.screenshot(&target).await
        })
        .await?;
    let png = std::fs::read(&path).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    Ok(())
}
