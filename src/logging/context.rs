use crate::cli::Command;
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// One-shot CLI runs such as `scsource parse`; stdout carries the result.
    LocalDev,
    /// Long-running extraction service.
    Service,
    /// Console logging suppressed entirely (`SCSOURCE_QUIET=1`).
    Quiet,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Quiet)
    }
}

/// Derive the active execution context from a parsed CLI command plus overrides.
pub fn detect_context(command: &Command) -> ExecutionContext {
    if quiet_override_enabled() {
        return ExecutionContext::Quiet;
    }

    match command {
        Command::Parse(_) => ExecutionContext::LocalDev,
        Command::Serve(_) => ExecutionContext::Service,
    }
}

fn quiet_override_enabled() -> bool {
    env::var("SCSOURCE_QUIET")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
