//! Lapak - checkout core for a Telegram Mini App storefront
//!
//! This library provides the non-presentational half of the storefront:
//! catalog + selection state, price totals, identity resolution from the
//! launch context, invoice creation against the payment backend, and the
//! payment-status polling loop that closes the Mini App once an invoice
//! is paid.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, and logging
//! - `catalog`: item list + selection set, remote catalog config
//! - `pricing`: selection totals
//! - `identity`: acting-user resolution from launch-time context
//! - `invoice`: HTTP boundary to the payment backend
//! - `checkout`: the checkout state machine and polling task
//! - `host`: embedding-host integration seam

pub mod catalog;
pub mod checkout;
pub mod core;
pub mod host;
pub mod identity;
pub mod invoice;
pub mod pricing;

// Re-export commonly used types for convenience
pub use catalog::{fetch_catalog_config, CatalogConfig, CatalogItem, CatalogStore, ConfigError};
pub use checkout::{CheckoutController, CheckoutError, CheckoutEvent, CheckoutPhase, PollConfig};
pub use core::{config, AppError, AppResult};
pub use host::{HostBridge, NoopHost};
pub use identity::{LaunchContext, UserId};
pub use invoice::{Invoice, InvoiceApi, InvoiceClient, InvoiceError, InvoiceStatus};
pub use pricing::PricingEngine;
