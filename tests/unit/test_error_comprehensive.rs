use shortcut_source::core::entities::Diagnostic;
use shortcut_source::core::error::{AppError, DefaultErrorReporter, ErrorReporter};
use shortcut_source::core::types::{ErrorCategory, ErrorSeverity};

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        (ErrorCategory::ClassificationMiss, "CLASSIFY-"),
        (ErrorCategory::NetworkFailure, "FETCH-"),
        (ErrorCategory::SchemaMiss, "RECORD-"),
        (ErrorCategory::DecodeFailure, "DECODE-"),
        (ErrorCategory::UnsupportedEncoding, "DECODE-"),
        (ErrorCategory::ValidationError, "VALIDATE-"),
        (ErrorCategory::SerializationError, "EXPORT-"),
        (ErrorCategory::IoError, "IO-"),
        (ErrorCategory::InternalError, "INTERNAL-"),
    ];

    for (category, prefix) in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert!(error.code.starts_with(prefix), "code {}", error.code);
        assert!(error.suggestion.is_none());
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::ClassificationMiss, ErrorSeverity::Warning),
        (ErrorCategory::NetworkFailure, ErrorSeverity::Error),
        (ErrorCategory::SchemaMiss, ErrorSeverity::Warning),
        (ErrorCategory::DecodeFailure, ErrorSeverity::Error),
        (ErrorCategory::UnsupportedEncoding, ErrorSeverity::Warning),
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::SerializationError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::InternalError, ErrorSeverity::Error),
    ];

    for (category, expected_severity) in test_cases {
        let error = AppError::new(category, "test");
        assert_eq!(error.severity(), expected_severity);
    }
}

#[test]
fn test_error_display() {
    let error = AppError::new(ErrorCategory::ValidationError, "invalid relay")
        .with_code("CONFIG-RELAY-001");

    let display = format!("{}", error);
    assert_eq!(display, "[CONFIG-RELAY-001] ValidationError: invalid relay");
}

#[test]
fn test_error_builder_chain() {
    let error = AppError::new(ErrorCategory::IoError, "cannot write export")
        .with_suggestion("Check that the output directory is writable")
        .with_code("IO-EXPORT-001");

    assert_eq!(error.code, "IO-EXPORT-001");
    assert_eq!(
        error.suggestion.as_deref(),
        Some("Check that the output directory is writable")
    );
}

#[test]
fn test_error_with_source_renders_cause() {
    let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.plist");
    let error = AppError::with_source(
        ErrorCategory::IoError,
        "failed to read input",
        Box::new(cause),
    );

    assert!(error.source.is_some());
    assert!(format!("{}", error).contains("Caused by: missing.plist"));
}

#[test]
fn test_generated_codes_are_unique() {
    let first = AppError::new(ErrorCategory::InternalError, "a");
    let second = AppError::new(ErrorCategory::InternalError, "b");
    assert_ne!(first.code, second.code);
}

#[test]
fn test_diagnostic_display_and_suggestion() {
    let diagnostic = Diagnostic::new(
        ErrorCategory::UnsupportedEncoding,
        "binary property lists are not supported",
    )
    .with_suggestion("Export the shortcut as XML");

    assert_eq!(
        diagnostic.to_string(),
        "UnsupportedEncoding: binary property lists are not supported"
    );
    assert_eq!(
        diagnostic.suggestion.as_deref(),
        Some("Export the shortcut as XML")
    );
}

#[test]
fn test_diagnostic_serializes_without_empty_suggestion() {
    let diagnostic = Diagnostic::new(ErrorCategory::SchemaMiss, "missing fields");
    let value = serde_json::to_value(&diagnostic).unwrap();

    assert_eq!(value["category"], "SchemaMiss");
    assert!(value.get("suggestion").is_none());
}

#[test]
fn test_default_reporter_does_not_panic() {
    let reporter = DefaultErrorReporter;
    let error = AppError::new(ErrorCategory::NetworkFailure, "all relays failed")
        .with_suggestion("Paste the shortcut file contents instead");

    reporter.report_error(&error);
    reporter.report_diagnostic(
        &Diagnostic::new(ErrorCategory::SchemaMiss, "missing fields").with_suggestion("retry"),
    );
}
