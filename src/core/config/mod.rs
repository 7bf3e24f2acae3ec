use crate::core::fetcher::RelayTemplate;
use crate::core::types::OutputFormat;
use serde::{Deserialize, Serialize};

/// Main configuration loaded from scsource.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Relay fetcher configuration
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Hosted-link metadata endpoint configuration
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Normalization behavior
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Export defaults
    #[serde(default)]
    pub output: OutputConfig,

    /// Extraction service configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Relay fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetcherConfig {
    /// Relay URL templates, tried in order
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayTemplate>,

    /// Attempt a direct request before the relays
    #[serde(default)]
    pub direct_first: bool,

    /// Transport timeout; unset keeps the HTTP client default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// Hosted-link metadata endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataConfig {
    /// Path marker identifying a hosted link
    #[serde(default = "default_path_segment")]
    pub path_segment: String,

    /// Replacement producing the record-lookup endpoint
    #[serde(default = "default_records_segment")]
    pub records_segment: String,
}

/// Normalization behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizerConfig {
    /// Keep the downloaded plist text as the raw payload of hosted-link results
    #[serde(default = "default_retain_download_payload")]
    pub retain_download_payload: bool,

    /// Characters kept in the preview of undecodable input
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: OutputFormat,
}

/// Extraction service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Add a CORS layer to responses
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed origins; `*` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

// Default functions
fn default_relays() -> Vec<RelayTemplate> {
    [
        "https://corsproxy.io/?{target}",
        "https://cors-proxy.htmldriven.com/?url={target}",
        "https://api.allorigins.win/raw?url={target}",
        "https://thingproxy.freeboard.io/fetch/{target}",
    ]
    .iter()
    .map(|relay| RelayTemplate::new(*relay))
    .collect()
}

fn default_path_segment() -> String {
    "icloud.com/shortcuts/".to_string()
}

fn default_records_segment() -> String {
    "icloud.com/shortcuts/api/records/".to_string()
}

fn default_retain_download_payload() -> bool {
    true
}

fn default_preview_chars() -> usize {
    100
}

fn default_bind() -> String {
    "0.0.0.0:3333".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            relays: default_relays(),
            direct_first: false,
            timeout_seconds: None,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig {
            path_segment: default_path_segment(),
            records_segment: default_records_segment(),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            retain_download_payload: default_retain_download_payload(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            enable_cors: default_enable_cors(),
            allowed_origins: default_allowed_origins(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
