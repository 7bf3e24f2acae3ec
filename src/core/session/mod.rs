//! Presentation session: the last input, its result, and how it is shown.
//!
//! A `SessionState` has a single owner. The core only ever sees the input
//! string and hands back a fresh result; the session may annotate that result
//! with a default encoding tag and nothing else.

#![allow(clippy::result_large_err)]

use crate::core::classifier::is_markup_document;
use crate::core::codec;
use crate::core::entities::NormalizedResult;
use crate::core::error::AppError;
use crate::core::normalizer::Normalizer;
use crate::core::types::{DisplayMode, ErrorCategory, OutputFormat};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use tracing::debug;

/// Step identifiers shown in a summary.
pub const SUMMARY_STEP_LIMIT: usize = 5;
/// Base name used when a result carries no usable name.
pub const FALLBACK_FILE_STEM: &str = "shortcut";

/// Compact description of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub name: Option<String>,
    pub step_count: usize,
    pub step_identifiers: Vec<String>,
}

/// A rendered export ready to be written or served.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    input: String,
    result: Option<NormalizedResult>,
    display_mode: DisplayMode,
    output_format: OutputFormat,
    render_error: Option<String>,
}

impl SessionState {
    pub fn new(output_format: OutputFormat) -> Self {
        SessionState {
            output_format,
            ..SessionState::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input<T: Into<String>>(&mut self, input: T) {
        self.input = input.into();
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        self.result.as_ref()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn render_error(&self) -> Option<&str> {
        self.render_error.as_deref()
    }

    /// Normalize the current input and keep the result.
    pub async fn submit(&mut self, normalizer: &Normalizer) -> Result<&NormalizedResult, AppError> {
        if self.input.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "input is empty; provide a hosted link or a document source",
            ));
        }

        self.render_error = None;
        let mut result = normalizer.normalize(&self.input).await;
        annotate_default_format(&mut result, self.output_format);
        debug!(
            "session result: kind={} steps={} degraded={}",
            result.source_kind,
            result.steps.len(),
            result.is_degraded()
        );
        Ok(&*self.result.insert(result))
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    /// Render the current result in the active display mode.
    ///
    /// A failure is remembered in `render_error` so callers can fall back to a
    /// plain message instead of aborting.
    pub fn render(&mut self) -> Option<String> {
        let result = self.result.as_ref()?;
        let rendered = match self.display_mode {
            DisplayMode::Json => serde_json::to_string_pretty(result)
                .map_err(|e| format!("failed to render result: {}", e)),
            DisplayMode::Details => Ok(render_details(result)),
        };
        match rendered {
            Ok(text) => Some(text),
            Err(message) => {
                self.render_error = Some(message);
                None
            }
        }
    }

    /// Text placed on the clipboard: the export in the result's format.
    pub fn copy_text(&self) -> Result<String, AppError> {
        let result = self.require_result()?;
        export(result, self.effective_format(result))
    }

    pub fn download(&self) -> Result<ExportFile, AppError> {
        let result = self.require_result()?;
        export_file(result, self.effective_format(result))
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.result.as_ref().map(summarize)
    }

    /// Clear input, result and render state; the chosen format survives.
    pub fn reset(&mut self) {
        self.input.clear();
        self.result = None;
        self.render_error = None;
        self.display_mode = DisplayMode::default();
    }

    fn effective_format(&self, result: &NormalizedResult) -> OutputFormat {
        result.format.unwrap_or(self.output_format)
    }

    fn require_result(&self) -> Result<&NormalizedResult, AppError> {
        self.result.as_ref().ok_or_else(|| {
            AppError::new(ErrorCategory::ValidationError, "no result to export")
                .with_suggestion("Submit an input first")
        })
    }
}

/// Tag the result with `format` unless it already carries one.
pub fn annotate_default_format(result: &mut NormalizedResult, format: OutputFormat) {
    if result.format.is_none() {
        result.format = Some(format);
    }
}

pub fn summarize(result: &NormalizedResult) -> SessionSummary {
    SessionSummary {
        name: result.name.clone(),
        step_count: result.steps.len(),
        step_identifiers: result
            .step_identifiers()
            .take(SUMMARY_STEP_LIMIT)
            .map(str::to_string)
            .collect(),
    }
}

/// Human-readable rendering of a result.
pub fn render_details(result: &NormalizedResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", result.name.as_deref().unwrap_or("(unnamed)"));
    let _ = writeln!(out, "Source: {}", result.source_kind);
    if let Some(identifier) = &result.identifier {
        let _ = writeln!(out, "Identifier: {}", identifier);
    }
    if let Some(version) = &result.minimum_version {
        let _ = writeln!(out, "Minimum version: {}", version);
    }
    if let Some(version) = &result.client_version {
        let _ = writeln!(out, "Client version: {}", version);
    }
    let _ = writeln!(out, "Steps: {}", result.steps.len());
    for (position, step) in result.steps.iter().enumerate() {
        let label = if step.identifier.is_empty() {
            "(unidentified)"
        } else {
            step.identifier.as_str()
        };
        let _ = writeln!(out, "  {}. {}", position + 1, label);
    }
    if let Some(diagnostic) = &result.diagnostic {
        let _ = writeln!(out, "Diagnostic: {}", diagnostic);
        if let Some(suggestion) = &diagnostic.suggestion {
            let _ = writeln!(out, "Suggestion: {}", suggestion);
        }
    }
    if let Some(preview) = &result.preview {
        let _ = writeln!(out, "Preview: {}", preview);
    }
    out
}

/// Serialize a result for export.
///
/// The raw payload wins whenever it is already in the requested encoding. Otherwise the
/// decoded document is re-encoded, and without a document the result itself is exported.
pub fn export(result: &NormalizedResult, format: OutputFormat) -> Result<String, AppError> {
    if let Some(raw) = result.raw_payload.as_deref() {
        if payload_matches(raw, format) {
            return Ok(raw.to_string());
        }
    }

    let tree = match &result.document {
        Some(document) => Value::Object(document.clone()),
        None => serde_json::to_value(result).map_err(|e| {
            AppError::with_source(
                ErrorCategory::SerializationError,
                "failed to serialize result",
                Box::new(e),
            )
        })?,
    };

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&tree).map_err(|e| {
            AppError::with_source(
                ErrorCategory::SerializationError,
                "failed to encode JSON export",
                Box::new(e),
            )
        }),
        OutputFormat::Xml => codec::encode(&tree).map_err(|e| {
            AppError::with_source(
                ErrorCategory::SerializationError,
                "failed to encode property list export",
                Box::new(e),
            )
        }),
    }
}

pub fn export_file(result: &NormalizedResult, format: OutputFormat) -> Result<ExportFile, AppError> {
    Ok(ExportFile {
        file_name: export_file_name(result.name.as_deref(), format),
        content_type: format.content_type(),
        content: export(result, format)?,
    })
}

fn payload_matches(raw: &str, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Xml => is_markup_document(raw),
        OutputFormat::Json => serde_json::from_str::<Value>(raw).is_ok(),
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        sanitized
    }
}

pub fn export_file_name(name: Option<&str>, format: OutputFormat) -> String {
    let stem = name
        .map(sanitize_file_name)
        .unwrap_or_else(|| FALLBACK_FILE_STEM.to_string());
    format!("{}.{}", stem, format.extension())
}
