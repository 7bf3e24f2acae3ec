//! Normalized result shape handed to the presentation layer.

use crate::core::types::{ErrorCategory, OutputFormat, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Top-level key holding the ordered action list.
pub const ACTIONS_KEY: &str = "WFWorkflowActions";
pub const NAME_KEY: &str = "WFWorkflowName";
pub const CLIENT_VERSION_KEY: &str = "WFWorkflowClientVersion";
pub const MINIMUM_VERSION_STRING_KEY: &str = "WFWorkflowMinimumClientVersionString";
pub const MINIMUM_VERSION_KEY: &str = "WFWorkflowMinimumClientVersion";
pub const ICON_KEY: &str = "WFWorkflowIcon";
pub const ACTION_IDENTIFIER_KEY: &str = "WFWorkflowActionIdentifier";
pub const ACTION_PARAMETERS_KEY: &str = "WFWorkflowActionParameters";

/// One declared step of a workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Dotted identifier naming the step kind, e.g. `is.workflow.actions.comment`.
    pub identifier: String,
    /// Untyped parameter payload; never validated.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Step {
    /// Build a step from one entry of an action list.
    ///
    /// Entries that are not objects keep their position with an empty identifier
    /// so that step order always mirrors the source.
    pub fn from_action(action: &Value) -> Self {
        let identifier = action
            .get(ACTION_IDENTIFIER_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parameters = action
            .get(ACTION_PARAMETERS_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Step {
            identifier,
            parameters,
        }
    }

    /// Convert an action list into steps, preserving declared order.
    pub fn from_actions(actions: Option<&Value>) -> Vec<Step> {
        actions
            .and_then(Value::as_array)
            .map(|list| list.iter().map(Step::from_action).collect())
            .unwrap_or_default()
    }
}

/// Version metadata as declared by the source: either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionTag {
    Text(String),
    Number(Number),
}

impl VersionTag {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::String(text) => Some(VersionTag::Text(text.clone())),
            Value::Number(number) => Some(VersionTag::Number(number.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTag::Text(text) => f.write_str(text),
            VersionTag::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Why normalization degraded, with an optional hint for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        Diagnostic {
            category,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Unified output of one classify-and-normalize call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub source_kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<VersionTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<VersionTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Decoded top-level keys in source order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl NormalizedResult {
    pub fn empty(source_kind: SourceKind) -> Self {
        NormalizedResult {
            source_kind,
            identifier: None,
            name: None,
            minimum_version: None,
            client_version: None,
            icon: None,
            steps: Vec::new(),
            document: None,
            raw_payload: None,
            preview: None,
            diagnostic: None,
            auxiliary: None,
            format: None,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn step_identifiers(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.identifier.as_str())
    }
}
