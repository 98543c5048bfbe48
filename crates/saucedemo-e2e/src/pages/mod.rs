//! Page objects for the Sauce Demo store.

mod inventory;
mod login;

pub use inventory::InventoryPage;
pub use login::LoginPage;

#[cfg(test)]
pub(crate) fn mock_handle(store: std::sync::Arc<crate::mock::MockStore>) -> crate::PageHandle {
    let config = crate::SuiteConfig::default()
        .with_action_timeout(150)
        .with_navigation_timeout(500)
        .with_poll_interval(5);
    crate::PageHandle::new(store, &config)
}
