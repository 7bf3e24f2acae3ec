#![allow(clippy::result_large_err)]

use super::AppConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::net::SocketAddr;
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &AppConfig) -> Result<(), AppError> {
        for relay in &config.fetcher.relays {
            if relay.as_str().trim().is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "fetcher.relays cannot contain empty templates",
                ));
            }
            // A sample render must produce an absolute http(s) URL.
            let sample = relay.render("https://example.com/");
            let parsed = Url::parse(&sample).map_err(|e| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    format!("invalid relay template {}: {}", relay, e),
                )
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    format!("relay template {} must use http or https", relay),
                ));
            }
        }

        if config.metadata.path_segment.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "metadata.path_segment cannot be empty",
            ));
        }

        config.server.bind.parse::<SocketAddr>().map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid server.bind address {}: {}", config.server.bind, e),
            )
        })?;

        Ok(())
    }
}
