//! Selection totals.
//!
//! All amounts are non-negative integers in the smallest currency unit
//! (IDR rupiah). Summation is pure integer arithmetic; `i64` leaves ample
//! headroom for any realistic catalog.

use std::collections::HashMap;

use crate::catalog::CatalogConfig;
use crate::core::config;

/// Derives a monetary total from a selection and a price table.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    uniform_price: i64,
    per_item: HashMap<String, i64>,
}

impl PricingEngine {
    /// Engine with a uniform price and no per-item overrides.
    pub fn new(uniform_price: i64) -> Self {
        Self {
            uniform_price,
            per_item: HashMap::new(),
        }
    }

    /// Builds the price table from a fetched catalog config.
    ///
    /// Items carrying an explicit price become overrides; everything else
    /// is charged the config's uniform price, falling back to the built-in
    /// default when the config omits one.
    pub fn from_config(cfg: &CatalogConfig) -> Self {
        let uniform_price = cfg
            .uniform_price
            .unwrap_or(config::pricing::DEFAULT_UNIFORM_PRICE);
        let per_item = cfg
            .groups
            .iter()
            .filter_map(|item| item.price.map(|p| (item.id.clone(), p)))
            .collect();
        Self {
            uniform_price,
            per_item,
        }
    }

    #[must_use]
    pub fn with_item_price(mut self, id: impl Into<String>, price: i64) -> Self {
        self.per_item.insert(id.into(), price);
        self
    }

    pub fn uniform_price(&self) -> i64 {
        self.uniform_price
    }

    /// Price of one item: the per-item override if present, else the
    /// uniform price. Total by construction since the uniform price
    /// always exists.
    pub fn price_of(&self, id: &str) -> i64 {
        self.per_item.get(id).copied().unwrap_or(self.uniform_price)
    }

    /// Sum of `price_of` over the selection; exactly 0 for an empty one.
    pub fn total<'a, I>(&self, ids: I) -> i64
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter().map(|id| self.price_of(id)).sum()
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(config::pricing::DEFAULT_UNIFORM_PRICE)
    }
}
