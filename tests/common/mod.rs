//! Shared fixtures for integration tests.

#![allow(dead_code)]

use lapak::{CatalogItem, CatalogStore, LaunchContext, PollConfig};
use std::time::Duration;

/// The demo catalog from the storefront: two groups at 25 000 IDR each.
pub fn demo_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("A", "Group A").with_price(25_000),
        CatalogItem::new("B", "Group B").with_price(25_000),
    ]
}

/// Store loaded with the demo catalog and the given ids selected.
pub fn store_with_selection(ids: &[&str]) -> CatalogStore {
    let mut store = CatalogStore::new();
    store.load(demo_catalog()).expect("demo catalog is valid");
    for id in ids {
        store.toggle(id);
    }
    store
}

/// Launch context with a resolvable test user.
pub fn test_launch() -> LaunchContext {
    LaunchContext::new().with_host_user(123456789)
}

/// Tight polling so tests finish in milliseconds, not minutes.
pub fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig::new()
        .interval(Duration::from_millis(15))
        .max_attempts(max_attempts)
}
