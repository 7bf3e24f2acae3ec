use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding detected for a raw input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    HostedLink,
    MarkupDocument,
    StructuredDataDocument,
    Unrecognized,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::HostedLink => "hosted-link",
            SourceKind::MarkupDocument => "markup-document",
            SourceKind::StructuredDataDocument => "structured-data-document",
            SourceKind::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

/// Why an operation failed or a result degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    ClassificationMiss,
    NetworkFailure,
    SchemaMiss,
    DecodeFailure,
    UnsupportedEncoding,
    ValidationError,
    SerializationError,
    IoError,
    InternalError,
}

impl ErrorCategory {
    /// Degraded-input categories are warnings; the rest abort the operation.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            ErrorCategory::ClassificationMiss
            | ErrorCategory::SchemaMiss
            | ErrorCategory::UnsupportedEncoding => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Leading segment of error codes raised under this category.
    pub fn code_prefix(self) -> &'static str {
        match self {
            ErrorCategory::ClassificationMiss => "CLASSIFY",
            ErrorCategory::NetworkFailure => "FETCH",
            ErrorCategory::SchemaMiss => "RECORD",
            ErrorCategory::DecodeFailure | ErrorCategory::UnsupportedEncoding => "DECODE",
            ErrorCategory::ValidationError => "VALIDATE",
            ErrorCategory::SerializationError => "EXPORT",
            ErrorCategory::IoError => "IO",
            ErrorCategory::InternalError => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Error => f.write_str("ERROR"),
            ErrorSeverity::Warning => f.write_str("WARNING"),
        }
    }
}

/// Encoding used when exporting a normalized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Xml => "application/xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(format!(
                "invalid output format '{}'; supported values are json, xml",
                value
            )),
        }
    }
}

/// How the presentation layer renders a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Json,
    Details,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Json => DisplayMode::Details,
            DisplayMode::Details => DisplayMode::Json,
        }
    }
}
