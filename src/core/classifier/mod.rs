//! Input classification: hosted link, plist markup, JSON, or nothing known.
//!
//! Order matters. Documents of either encoding may embed link-like strings, so
//! the hosted-link check only wins when an identifier can actually be extracted.

#![allow(clippy::result_large_err)]

use crate::core::config::MetadataConfig;
use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, SourceKind};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Markers that must both appear in a plist markup document.
pub const XML_PROLOG_MARKER: &str = "<?xml";
pub const PLIST_DOCTYPE_MARKER: &str = "<!DOCTYPE plist";

static DEFAULT_IDENTIFIER_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Outcome of classifying one input string.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    HostedLink { identifier: String },
    MarkupDocument,
    /// Carries the already-decoded JSON so callers do not parse twice.
    StructuredData(Value),
    Unrecognized,
}

impl Classification {
    pub fn kind(&self) -> SourceKind {
        match self {
            Classification::HostedLink { .. } => SourceKind::HostedLink,
            Classification::MarkupDocument => SourceKind::MarkupDocument,
            Classification::StructuredData(_) => SourceKind::StructuredDataDocument,
            Classification::Unrecognized => SourceKind::Unrecognized,
        }
    }
}

/// Extract the identifier from an `icloud.com/shortcuts/<id>` link.
pub fn extract_identifier(url: &str) -> Option<String> {
    let pattern = DEFAULT_IDENTIFIER_PATTERN.get_or_init(|| {
        Regex::new(r"icloud\.com/shortcuts/([a-zA-Z0-9]+)").expect("static pattern compiles")
    });
    capture_identifier(pattern, url)
}

/// Returns `true` when the input carries the plist markup preamble.
pub fn is_markup_document(input: &str) -> bool {
    input.contains(XML_PROLOG_MARKER) && input.contains(PLIST_DOCTYPE_MARKER)
}

fn capture_identifier(pattern: &Regex, url: &str) -> Option<String> {
    pattern
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Classifier bound to a hosted-link path layout.
#[derive(Debug, Clone)]
pub struct Classifier {
    path_segment: String,
    records_segment: String,
    identifier_pattern: Regex,
}

impl Classifier {
    pub fn new(config: &MetadataConfig) -> Result<Self, AppError> {
        // an empty segment is contained in every input
        if config.path_segment.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "metadata.path_segment must not be empty",
            )
            .with_suggestion("Set it to the hosted link prefix, e.g. icloud.com/shortcuts/"));
        }
        let pattern = format!("{}([a-zA-Z0-9]+)", regex::escape(&config.path_segment));
        let identifier_pattern = Regex::new(&pattern).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "metadata.path_segment {} does not form a valid pattern: {}",
                    config.path_segment, e
                ),
            )
        })?;
        Ok(Classifier {
            path_segment: config.path_segment.clone(),
            records_segment: config.records_segment.clone(),
            identifier_pattern,
        })
    }

    /// Classify trimmed input; the first matching rule wins.
    pub fn classify(&self, input: &str) -> Classification {
        let input = input.trim();

        if self.is_hosted_link(input) {
            if let Some(identifier) = self.extract_identifier(input) {
                return Classification::HostedLink { identifier };
            }
        }

        if is_markup_document(input) {
            return Classification::MarkupDocument;
        }

        match serde_json::from_str::<Value>(input) {
            Ok(value) => Classification::StructuredData(value),
            Err(_) => Classification::Unrecognized,
        }
    }

    pub fn is_hosted_link(&self, input: &str) -> bool {
        input.contains(&self.path_segment)
    }

    pub fn extract_identifier(&self, url: &str) -> Option<String> {
        capture_identifier(&self.identifier_pattern, url)
    }

    /// Rewrite a hosted link into its record-lookup endpoint.
    pub fn metadata_endpoint(&self, link: &str) -> String {
        link.trim().replacen(&self.path_segment, &self.records_segment, 1)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(&MetadataConfig::default()).expect("default path segment compiles")
    }
}
