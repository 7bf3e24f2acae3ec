#![allow(clippy::result_large_err)]

use super::AppConfig;
use crate::core::error::AppError;
use crate::core::fetcher::RelayTemplate;
use crate::core::types::{ErrorCategory, OutputFormat};
use std::env;
use std::path::Path;

/// File name looked up in a working directory.
pub const CONFIG_FILE_NAME: &str = "scsource.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from a directory (dir/scsource.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_dir(dir: &Path) -> Result<AppConfig, AppError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load(&config_path)
    }

    /// Load config from a specific file path, then apply env overrides.
    pub fn load(path: &Path) -> Result<AppConfig, AppError> {
        let mut config = Self::load_from_file(path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<AppConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-PARSE-001")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut AppConfig) {
        // Fetcher overrides
        if let Ok(relays) = env::var("SCSOURCE_RELAYS") {
            let parsed: Vec<RelayTemplate> = relays
                .split(',')
                .map(str::trim)
                .filter(|relay| !relay.is_empty())
                .map(RelayTemplate::new)
                .collect();
            if !parsed.is_empty() {
                config.fetcher.relays = parsed;
            }
        }

        if let Ok(direct_first) = env::var("SCSOURCE_DIRECT_FIRST") {
            if let Ok(direct_first) = direct_first.parse::<bool>() {
                config.fetcher.direct_first = direct_first;
            }
        }

        if let Ok(timeout) = env::var("SCSOURCE_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                config.fetcher.timeout_seconds = Some(timeout);
            }
        }

        // Normalizer overrides
        if let Ok(retain) = env::var("SCSOURCE_RETAIN_DOWNLOAD_PAYLOAD") {
            if let Ok(retain) = retain.parse::<bool>() {
                config.normalizer.retain_download_payload = retain;
            }
        }

        // Output overrides
        if let Ok(format) = env::var("SCSOURCE_DEFAULT_FORMAT") {
            if let Ok(format) = format.parse::<OutputFormat>() {
                config.output.default_format = format;
            }
        }

        // Server overrides
        if let Ok(bind) = env::var("SCSOURCE_BIND") {
            config.server.bind = bind;
        }

        if let Ok(enable_cors) = env::var("SCSOURCE_ENABLE_CORS") {
            if let Ok(enable_cors) = enable_cors.parse::<bool>() {
                config.server.enable_cors = enable_cors;
            }
        }

        if let Ok(origins) = env::var("SCSOURCE_ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
    }
}
