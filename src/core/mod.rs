pub mod classifier;
pub mod codec;
pub mod config;
pub mod entities;
pub mod error;
pub mod fetcher;
pub mod normalizer;
pub mod session;
pub mod types;

pub use classifier::{Classification, Classifier};
pub use config::{AppConfig, ConfigLoader, ConfigValidator};
pub use entities::{Diagnostic, NormalizedResult, Step, VersionTag};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use fetcher::{FetchFailure, FetchRoute, FetchSuccess, RelayFetcher, RelayTemplate};
pub use normalizer::Normalizer;
pub use session::{ExportFile, SessionState, SessionSummary};
pub use types::*;
