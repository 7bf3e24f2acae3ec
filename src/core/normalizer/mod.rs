//! Classify-and-normalize entry point.
//!
//! `Normalizer::normalize` is total: every failure along the way is folded into
//! the result's diagnostic, and only the hosted-link path touches the network.

#![allow(clippy::result_large_err)]

pub mod shape;

use crate::core::classifier::{Classification, Classifier};
use crate::core::codec;
use crate::core::config::{AppConfig, NormalizerConfig};
use crate::core::entities::NormalizedResult;
use crate::core::error::AppError;
use crate::core::fetcher::{prioritize, RelayFetcher, RelayTemplate};
use serde_json::Value;
use shape::HostedDownload;
use tracing::{debug, info, instrument, warn};

pub struct Normalizer {
    classifier: Classifier,
    fetcher: RelayFetcher,
    relays: Vec<RelayTemplate>,
    settings: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Normalizer {
            classifier: Classifier::new(&config.metadata)?,
            fetcher: RelayFetcher::new(&config.fetcher)?,
            relays: config.fetcher.relays.clone(),
            settings: config.normalizer.clone(),
        })
    }

    #[instrument(skip_all, fields(input_len = input.len()))]
    pub async fn normalize(&self, input: &str) -> NormalizedResult {
        let trimmed = input.trim();
        let classification = self.classifier.classify(trimmed);
        debug!("classified input as {}", classification.kind());

        match classification {
            Classification::HostedLink { identifier } => {
                self.normalize_hosted(trimmed, &identifier).await
            }
            Classification::MarkupDocument => match codec::decode(trimmed) {
                Ok(tree) => shape::from_markup(input, tree),
                Err(e) => {
                    warn!("markup document failed to decode: {}", e);
                    shape::markup_decode_failed(trimmed, &e, self.settings.preview_chars)
                }
            },
            Classification::StructuredData(tree) => shape::from_structured(input, tree),
            Classification::Unrecognized => {
                shape::unrecognized(trimmed, self.settings.preview_chars)
            }
        }
    }

    async fn normalize_hosted(&self, link: &str, identifier: &str) -> NormalizedResult {
        let endpoint = self.classifier.metadata_endpoint(link);
        info!("fetching hosted record {} from {}", identifier, endpoint);

        let record = match self.fetcher.fetch(&endpoint, &self.relays).await {
            Ok(success) => success,
            Err(failure) => {
                warn!("hosted record fetch failed: {}", failure);
                return shape::hosted_fetch_failed(identifier, &failure);
            }
        };

        let fields = match serde_json::from_str::<Value>(&record.body) {
            Ok(mut body) => match body.get_mut("fields") {
                Some(fields) if fields.is_object() => fields.take(),
                _ => return shape::hosted_schema_miss(identifier, "missing fields"),
            },
            Err(e) => {
                return shape::hosted_schema_miss(
                    identifier,
                    format!("missing fields: record response is not JSON ({})", e),
                )
            }
        };

        let download_url = match fields
            .pointer("/shortcut/value/downloadURL")
            .and_then(Value::as_str)
        {
            Some(url) => url.to_string(),
            None => {
                debug!("record {} has no download reference", identifier);
                return shape::from_hosted_fields(identifier, fields);
            }
        };

        let suggested_name = fields
            .pointer("/name/value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("shortcut_{}", identifier));

        let ordered = prioritize(&self.relays, record.route.relay_index());
        let download = match self.fetcher.fetch(&download_url, &ordered).await {
            Ok(success) => success,
            Err(failure) => {
                warn!("shortcut download failed: {}", failure);
                return shape::hosted_download_failed(
                    identifier,
                    &suggested_name,
                    fields,
                    &failure,
                );
            }
        };

        if codec::is_binary(&download.body) {
            warn!("shortcut {} is a binary property list", identifier);
            return shape::hosted_binary(identifier, &suggested_name, fields);
        }

        let decoded = match codec::decode(&download.body) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("shortcut {} failed to decode: {}", identifier, e);
                return shape::hosted_decode_failed(identifier, &suggested_name, fields, &e);
            }
        };

        let payload = self
            .settings
            .retain_download_payload
            .then_some(download.body);

        shape::from_hosted_download(HostedDownload {
            identifier,
            suggested_name: &suggested_name,
            fields,
            download_url: &download_url,
            route: &download.route,
            decoded,
            payload,
        })
    }
}
