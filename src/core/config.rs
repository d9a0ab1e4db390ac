use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the storefront client
/// Base URL of the payment backend
/// Read from BACKEND_BASE_URL environment variable
/// The original deployment sets this to the public FastAPI host; local
/// development defaults to the dev server below
pub static BACKEND_BASE_URL: Lazy<String> =
    Lazy::new(|| env::var("BACKEND_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Pricing configuration
pub mod pricing {
    /// Fallback uniform price per catalog item, in the smallest currency
    /// unit (IDR rupiah). Used when the catalog config carries no
    /// `price_idr` and an item has no per-item price.
    pub const DEFAULT_UNIFORM_PRICE: i64 = 25_000;
}

/// Payment-status polling configuration
pub mod poll {
    use super::Duration;

    /// Interval between status checks (in seconds)
    pub const INTERVAL_SECS: u64 = 4;

    /// Maximum number of status checks before the wait is abandoned.
    /// 150 ticks at 4s is ten minutes of waiting, which covers every
    /// observed QRIS payment delay with slack.
    pub const MAX_ATTEMPTS: u32 = 150;

    /// Poll interval duration
    pub fn interval() -> Duration {
        Duration::from_secs(INTERVAL_SECS)
    }
}

/// HTTP client configuration
pub mod http {
    use super::Duration;

    /// Timeout for backend requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;

    /// Request timeout duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_matches_const() {
        assert_eq!(poll::interval(), Duration::from_secs(poll::INTERVAL_SECS));
    }

    #[test]
    fn test_poll_budget_covers_several_minutes() {
        let total = poll::INTERVAL_SECS * poll::MAX_ATTEMPTS as u64;
        assert!(total >= 300, "poll budget should cover at least five minutes");
    }

    #[test]
    fn test_request_timeout_shorter_than_poll_budget() {
        assert!(http::request_timeout() < poll::interval() * poll::MAX_ATTEMPTS);
    }
}
