use crate::core::types::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Input value meaning "read from standard input".
pub const STDIN_MARKER: &str = "-";

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Hosted link, document source, or `-` to read standard input
    #[arg(value_name = "INPUT", required_unless_present = "file", conflicts_with = "file")]
    pub input: Option<String>,

    /// Read the document source from a file instead
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Export encoding used for --output and the result's format tag (default from config)
    #[arg(long, value_enum, value_name = "FORMAT", help_heading = "Output Options")]
    pub format: Option<OutputFormat>,

    /// What to print on stdout
    #[arg(
        long,
        value_enum,
        default_value = "json",
        value_name = "VIEW",
        help_heading = "Output Options"
    )]
    pub view: ViewMode,

    /// Write the export to this file, or into this directory under a generated name
    #[arg(long, value_name = "PATH", help_heading = "Output Options")]
    pub output: Option<PathBuf>,

    /// Path to custom config file (default: ./scsource.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Try a direct request before the relay endpoints
    #[arg(long, help_heading = "Configuration")]
    pub direct: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address (default from config: 0.0.0.0:3333)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Path to custom config file (default: ./scsource.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Disable CORS headers regardless of configuration
    #[arg(long, help_heading = "Configuration")]
    pub no_cors: bool,
}

#[derive(Clone, Copy, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Full normalized result as pretty JSON
    Json,
    /// Human-readable name, versions, and step list
    Details,
    /// Name, step count, and the first few step identifiers as JSON
    Summary,
}
