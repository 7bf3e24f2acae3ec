//! Failures of the ambient layers: config, session export, service startup.
//!
//! Normalization itself never returns an `AppError`; degraded inputs are
//! reported through `Diagnostic` on the result instead.

use crate::core::entities::Diagnostic;
use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};

/// An operation-level failure with a stable code such as `CONFIG-PARSE-001`.
///
/// Without an explicit code the category prefix is combined with a short
/// random suffix, e.g. `VALIDATE-1F3A9C02`.
#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        AppError {
            category,
            code: format!("{}-{}", category.code_prefix(), suffix[..8].to_uppercase()),
            message: message.into(),
            suggestion: None,
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.category.severity()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

/// Sink for failures and degraded-result diagnostics shown to a CLI user.
pub trait ErrorReporter {
    fn report_error(&self, error: &AppError);
    fn report_diagnostic(&self, diagnostic: &Diagnostic);
}

/// Writes reports to stderr, labelled by severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorReporter;

impl ErrorReporter for DefaultErrorReporter {
    fn report_error(&self, error: &AppError) {
        eprintln!("[{}] {}: {}", error.severity(), error.code, error.message);
        if let Some(ref suggestion) = error.suggestion {
            eprintln!("  Suggestion: {}", suggestion);
        }
        if let Some(ref source) = error.source {
            eprintln!("  Caused by: {}", source);
        }
    }

    fn report_diagnostic(&self, diagnostic: &Diagnostic) {
        eprintln!("[{}] {}", diagnostic.category.severity(), diagnostic);
        if let Some(ref suggestion) = diagnostic.suggestion {
            eprintln!("  Suggestion: {}", suggestion);
        }
    }
}
