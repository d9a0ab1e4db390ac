use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the crate are convertible to this enum for consistent
/// handling at the embedding layer. Uses `thiserror` for automatic error
/// conversion and display formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Catalog configuration errors
    #[error("Catalog error: {0}")]
    Config(#[from] crate::catalog::ConfigError),

    /// Invoice backend errors
    #[error("Invoice error: {0}")]
    Invoice(#[from] crate::invoice::InvoiceError),

    /// Checkout flow errors
    #[error("Checkout error: {0}")]
    Checkout(#[from] crate::checkout::CheckoutError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
