//! Ordered relay probing for remote documents.
//!
//! Relays are a priority list: each one is tried once, in order, and the first
//! success wins. There is no retry within a relay and no parallel racing.

#![allow(clippy::result_large_err)]

use crate::core::config::FetcherConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Placeholder replaced by the encoded target inside a relay template.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// A relay endpoint URL template accepting one URL-encoded argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayTemplate(String);

impl RelayTemplate {
    pub fn new<T: Into<String>>(template: T) -> Self {
        RelayTemplate(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the proxied URL for `target`. Templates without a placeholder get
    /// the encoded target appended.
    pub fn render(&self, target: &str) -> String {
        let encoded = encode_component(target);
        if self.0.contains(TARGET_PLACEHOLDER) {
            self.0.replace(TARGET_PLACEHOLDER, &encoded)
        } else {
            format!("{}{}", self.0, encoded)
        }
    }
}

impl fmt::Display for RelayTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelayTemplate {
    fn from(value: &str) -> Self {
        RelayTemplate::new(value)
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// Which path produced (or failed to produce) a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FetchRoute {
    Direct,
    Relay { index: usize, template: RelayTemplate },
}

impl FetchRoute {
    pub fn relay_index(&self) -> Option<usize> {
        match self {
            FetchRoute::Direct => None,
            FetchRoute::Relay { index, .. } => Some(*index),
        }
    }
}

impl fmt::Display for FetchRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchRoute::Direct => f.write_str("direct"),
            FetchRoute::Relay { template, .. } => write!(f, "relay {}", template),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("returned status {status}")]
    Status { status: u16 },
    #[error("error: {0}")]
    Network(String),
    #[error("response body unreadable: {0}")]
    Body(String),
}

/// One failed attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayAttempt {
    pub route: FetchRoute,
    pub url: String,
    pub error: FetchError,
}

impl fmt::Display for RelayAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.route, self.error)
    }
}

/// Successful response and the route that produced it.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub body: String,
    pub status: u16,
    pub url: String,
    pub route: FetchRoute,
}

/// Every route was exhausted without a success status.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub target: String,
    pub attempts: Vec<RelayAttempt>,
}

impl FetchFailure {
    /// Error text of the most recent attempt.
    pub fn last_error(&self) -> Option<String> {
        self.attempts.last().map(ToString::to_string)
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_error() {
            Some(last) => write!(
                f,
                "all {} relay attempts failed for {}; last error: {}",
                self.attempts.len(),
                self.target,
                last
            ),
            None => write!(f, "no relay endpoints configured for {}", self.target),
        }
    }
}

impl std::error::Error for FetchFailure {}

/// HTTP client that walks the relay list in priority order.
#[derive(Debug, Clone)]
pub struct RelayFetcher {
    client: reqwest::Client,
    direct_first: bool,
}

impl RelayFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| {
            AppError::with_source(
                ErrorCategory::InternalError,
                "failed to build HTTP client",
                Box::new(e),
            )
            .with_code("FETCH-CLIENT-001")
        })?;
        Ok(RelayFetcher {
            client,
            direct_first: config.direct_first,
        })
    }

    /// Use a preconfigured client (tests and embedders).
    pub fn with_client(client: reqwest::Client, direct_first: bool) -> Self {
        RelayFetcher {
            client,
            direct_first,
        }
    }

    /// Resolve `target` through the relays, stopping at the first success.
    pub async fn fetch(
        &self,
        target: &str,
        relays: &[RelayTemplate],
    ) -> Result<FetchSuccess, FetchFailure> {
        let mut attempts = Vec::new();

        if self.direct_first {
            match self.attempt(target.to_string(), FetchRoute::Direct).await {
                Ok(success) => return Ok(success),
                Err(attempt) => attempts.push(attempt),
            }
        }

        for (index, relay) in relays.iter().enumerate() {
            let route = FetchRoute::Relay {
                index,
                template: relay.clone(),
            };
            debug!("trying relay {} for {}", relay, target);
            match self.attempt(relay.render(target), route).await {
                Ok(success) => {
                    info!("resolved {} via {}", target, success.route);
                    return Ok(success);
                }
                Err(attempt) => {
                    warn!("{}", attempt);
                    attempts.push(attempt);
                }
            }
        }

        Err(FetchFailure {
            target: target.to_string(),
            attempts,
        })
    }

    async fn attempt(&self, url: String, route: FetchRoute) -> Result<FetchSuccess, RelayAttempt> {
        let failed = |url: String, route: FetchRoute, error: FetchError| RelayAttempt {
            route,
            url,
            error,
        };

        let response = match self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(failed(url, route, FetchError::Network(e.to_string()))),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(failed(
                url,
                route,
                FetchError::Status {
                    status: status.as_u16(),
                },
            ));
        }

        match response.text().await {
            Ok(body) => Ok(FetchSuccess {
                body,
                status: status.as_u16(),
                url,
                route,
            }),
            Err(e) => Err(failed(url, route, FetchError::Body(e.to_string()))),
        }
    }
}

/// Order relays so the one at `preferred` is tried first, keeping the rest in place.
pub fn prioritize(relays: &[RelayTemplate], preferred: Option<usize>) -> Vec<RelayTemplate> {
    match preferred {
        Some(index) if index < relays.len() => {
            let mut ordered = Vec::with_capacity(relays.len());
            ordered.push(relays[index].clone());
            ordered.extend(
                relays
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, relay)| relay.clone()),
            );
            ordered
        }
        _ => relays.to_vec(),
    }
}
