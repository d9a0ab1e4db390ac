//! Catalog snapshot and selection state.
//!
//! The store owns the immutable list of purchasable groups for the session
//! and the user's current selection. Selection ids always refer to the
//! current snapshot; reloading the catalog drops ids that no longer exist
//! so nothing is ever priced against a stale item.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Catalog configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An item arrived without an id
    #[error("Catalog item #{index} has an empty id")]
    MissingId { index: usize },

    /// Two items share the same id
    #[error("Duplicate catalog item id: {0}")]
    DuplicateId(String),

    /// Config endpoint returned a non-success status
    #[error("Catalog config request failed with status: {0}")]
    Http(reqwest::StatusCode),

    /// Transport-level failure reaching the config endpoint
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Config endpoint returned something that is not a catalog config
    #[error("Malformed catalog config: {0}")]
    Malformed(String),
}

/// A purchasable group/tier offered in the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Per-item price in the smallest currency unit; items without one
    /// are charged the uniform configured price.
    #[serde(default)]
    pub price: Option<i64>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: None,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }
}

/// Catalog configuration as served by the backend (`GET /api/config`).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Uniform price per group (IDR); `None` falls back to the built-in default.
    #[serde(rename = "price_idr")]
    pub uniform_price: Option<i64>,
    #[serde(default)]
    pub groups: Vec<CatalogItem>,
}

/// Owns the catalog snapshot and the selection set.
///
/// Constructed once at startup and passed by reference to consumers; there
/// is no ambient global catalog state.
#[derive(Debug, Default)]
pub struct CatalogStore {
    items: Vec<CatalogItem>,
    selected: Vec<String>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog snapshot.
    ///
    /// Rejects malformed input (empty or duplicate ids). On rejection the
    /// store is left with an EMPTY catalog, not a partially-valid one, so
    /// the caller can render an explicit empty state. Selection ids that
    /// do not exist in the new snapshot are dropped.
    pub fn load(&mut self, items: Vec<CatalogItem>) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            if item.id.is_empty() {
                self.items.clear();
                self.selected.clear();
                return Err(ConfigError::MissingId { index });
            }
            if !seen.insert(item.id.as_str()) {
                let id = item.id.clone();
                self.items.clear();
                self.selected.clear();
                return Err(ConfigError::DuplicateId(id));
            }
        }

        self.items = items;
        // Drop selection entries the new snapshot no longer carries.
        let ids: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();
        self.selected.retain(|id| ids.contains(id.as_str()));
        Ok(())
    }

    /// Flips membership of `id` in the selection set.
    ///
    /// Ids not present in the catalog are ignored, matching the forgiving
    /// behavior of the original client.
    pub fn toggle(&mut self, id: &str) {
        if self.get(id).is_none() {
            log::debug!("toggle ignored for unknown catalog id '{}'", id);
            return;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.to_string());
        }
    }

    /// Empties the selection set.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Current selection in insertion order.
    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// True when no catalog is loaded (the explicit empty state).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetches the catalog configuration from the backend.
///
/// Called once at startup; on failure the caller keeps an empty
/// `CatalogStore` and shows the empty state instead of crashing.
pub async fn fetch_catalog_config(client: &reqwest::Client, base_url: &str) -> Result<CatalogConfig, ConfigError> {
    let url = format!("{}/api/config", base_url.trim_end_matches('/'));
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(ConfigError::Http(response.status()));
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Malformed(e.to_string()))
}
