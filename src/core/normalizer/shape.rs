//! Result builders, one family per source path.

use crate::core::codec::CodecError;
use crate::core::entities::{
    Diagnostic, NormalizedResult, Step, VersionTag, ACTIONS_KEY, CLIENT_VERSION_KEY, ICON_KEY,
    MINIMUM_VERSION_KEY, MINIMUM_VERSION_STRING_KEY, NAME_KEY,
};
use crate::core::fetcher::{FetchFailure, FetchRoute};
use crate::core::types::{ErrorCategory, SourceKind};
use serde_json::{json, Map, Value};

pub const MANUAL_PASTE_SUGGESTION: &str = "The hosted record could not be retrieved, usually because of cross-origin restrictions. Copy the shortcut source and paste it instead.";
pub const BINARY_SUGGESTION: &str = "Convert the shortcut with native plist tooling (for example `plutil -convert xml1`) or paste its XML source instead.";

/// First `limit` characters of the input followed by an ellipsis.
pub fn preview(input: &str, limit: usize) -> String {
    let head: String = input.chars().take(limit).collect();
    format!("{}...", head)
}

/// Copy the well-known metadata keys and the action list out of a document.
fn apply_metadata(result: &mut NormalizedResult, document: &Map<String, Value>) {
    result.name = document
        .get(NAME_KEY)
        .and_then(Value::as_str)
        .map(str::to_string);
    result.minimum_version = VersionTag::from_value(document.get(MINIMUM_VERSION_STRING_KEY))
        .or_else(|| VersionTag::from_value(document.get(MINIMUM_VERSION_KEY)));
    result.client_version = VersionTag::from_value(document.get(CLIENT_VERSION_KEY));
    result.icon = document.get(ICON_KEY).cloned();
    result.steps = Step::from_actions(document.get(ACTIONS_KEY));
}

fn pass_through(kind: SourceKind, input: &str, tree: Value) -> NormalizedResult {
    let mut result = NormalizedResult::empty(kind);
    if let Value::Object(document) = tree {
        apply_metadata(&mut result, &document);
        result.document = Some(document);
    }
    result.raw_payload = Some(input.to_string());
    result
}

pub fn from_markup(input: &str, tree: Value) -> NormalizedResult {
    pass_through(SourceKind::MarkupDocument, input, tree)
}

pub fn markup_decode_failed(input: &str, error: &CodecError, preview_chars: usize) -> NormalizedResult {
    let mut result = NormalizedResult::empty(SourceKind::MarkupDocument);
    result.preview = Some(preview(input, preview_chars));
    result.with_diagnostic(Diagnostic::new(
        ErrorCategory::DecodeFailure,
        error.to_string(),
    ))
}

pub fn from_structured(input: &str, tree: Value) -> NormalizedResult {
    pass_through(SourceKind::StructuredDataDocument, input, tree)
}

pub fn unrecognized(input: &str, preview_chars: usize) -> NormalizedResult {
    let mut result = NormalizedResult::empty(SourceKind::Unrecognized);
    result.preview = Some(preview(input, preview_chars));
    result.with_diagnostic(Diagnostic::new(
        ErrorCategory::ClassificationMiss,
        "unrecognized format: input is neither a valid JSON nor a property list document",
    ))
}

fn hosted(identifier: &str) -> NormalizedResult {
    let mut result = NormalizedResult::empty(SourceKind::HostedLink);
    result.identifier = Some(identifier.to_string());
    result
}

pub fn hosted_fetch_failed(identifier: &str, failure: &FetchFailure) -> NormalizedResult {
    hosted(identifier).with_diagnostic(
        Diagnostic::new(
            ErrorCategory::NetworkFailure,
            format!("failed to fetch hosted record: {}", failure),
        )
        .with_suggestion(MANUAL_PASTE_SUGGESTION),
    )
}

pub fn hosted_schema_miss<T: Into<String>>(identifier: &str, message: T) -> NormalizedResult {
    hosted(identifier).with_diagnostic(Diagnostic::new(ErrorCategory::SchemaMiss, message))
}

/// Record without a download reference: take whatever is embedded in `fields`.
pub fn from_hosted_fields(identifier: &str, fields: Value) -> NormalizedResult {
    let mut result = hosted(identifier);
    result.name = fields
        .pointer("/name/value")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(embedded) = fields.pointer("/shortcut/fields").and_then(Value::as_object) {
        let name = result.name.take();
        apply_metadata(&mut result, embedded);
        result.name = name.or(result.name.take());
        result.document = Some(embedded.clone());
    }
    result.auxiliary = Some(json!({ "fields": fields }));
    result
}

fn hosted_with_fields(identifier: &str, name: &str, fields: Value) -> NormalizedResult {
    let mut result = hosted(identifier);
    result.name = Some(name.to_string());
    result.auxiliary = Some(json!({ "fields": fields }));
    result
}

pub fn hosted_download_failed(
    identifier: &str,
    name: &str,
    fields: Value,
    failure: &FetchFailure,
) -> NormalizedResult {
    hosted_with_fields(identifier, name, fields).with_diagnostic(
        Diagnostic::new(
            ErrorCategory::NetworkFailure,
            format!("failed to download shortcut file: {}", failure),
        )
        .with_suggestion(MANUAL_PASTE_SUGGESTION),
    )
}

pub fn hosted_binary(identifier: &str, name: &str, fields: Value) -> NormalizedResult {
    hosted_with_fields(identifier, name, fields).with_diagnostic(
        Diagnostic::new(
            ErrorCategory::UnsupportedEncoding,
            "binary property lists are not supported",
        )
        .with_suggestion(BINARY_SUGGESTION),
    )
}

pub fn hosted_decode_failed(
    identifier: &str,
    name: &str,
    fields: Value,
    error: &CodecError,
) -> NormalizedResult {
    hosted_with_fields(identifier, name, fields).with_diagnostic(Diagnostic::new(
        ErrorCategory::DecodeFailure,
        format!("failed to parse shortcut file: {}", error),
    ))
}

/// Inputs of a fully decoded hosted download.
pub struct HostedDownload<'a> {
    pub identifier: &'a str,
    pub suggested_name: &'a str,
    pub fields: Value,
    pub download_url: &'a str,
    pub route: &'a FetchRoute,
    pub decoded: Value,
    pub payload: Option<String>,
}

pub fn from_hosted_download(download: HostedDownload<'_>) -> NormalizedResult {
    let mut result = hosted(download.identifier);
    if let Some(document) = download.decoded.as_object() {
        apply_metadata(&mut result, document);
        result.document = Some(document.clone());
    }
    if result.name.is_none() {
        result.name = Some(download.suggested_name.to_string());
    }
    result.raw_payload = download.payload;
    result.auxiliary = Some(json!({
        "fields": download.fields,
        "downloadURL": download.download_url,
        "relay": download.route,
        "decoded": download.decoded,
    }));
    result
}
