//! Unified compiler issue type used across all phases.
//!
//! Every stage collects issues instead of failing fast, so a `CompilerError` is a
//! value carried in result structs rather than something returned through `Err`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Parse,
    Analyze,
    Readiness,
    Codegen,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Analyze => write!(f, "Analyze"),
            Phase::Readiness => write!(f, "Readiness"),
            Phase::Codegen => write!(f, "Codegen"),
        }
    }
}

/// Machine-readable issue taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// Malformed graph: dangling edges, residual cycles, unknown action type.
    Structural,
    /// Unresolved, forward or self reference.
    Reference,
    /// Incompatible, non-convertible types.
    Type,
    /// Missing required parameter.
    Completeness,
    /// Parameter-level reference cycle.
    DependencyCycle,
    /// Literal rejected by the parameter validator.
    Validation,
    /// Warning-only finding.
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub kind: IssueKind,
    pub message: String,
    pub action_id: Option<String>,
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.action_id, &self.parameter) {
            (Some(id), Some(param)) => write!(
                f,
                "[{}:{}] {} (action '{}', parameter '{}')",
                self.phase, self.code, self.message, id, param
            ),
            (Some(id), None) => write!(
                f,
                "[{}:{}] {} (action '{}')",
                self.phase, self.code, self.message, id
            ),
            _ => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    fn new(code: &str, phase: Phase, kind: IssueKind, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase,
            kind,
            message: message.into(),
            action_id: None,
            parameter: None,
            suggestions: Vec::new(),
        }
    }

    pub fn parse(code: &str, message: impl Into<String>, action_id: Option<String>) -> Self {
        let mut e = Self::new(code, Phase::Parse, IssueKind::Structural, message);
        e.action_id = action_id;
        e
    }

    pub fn analyze(code: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(code, Phase::Analyze, kind, message)
    }

    pub fn readiness(code: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(code, Phase::Readiness, kind, message)
    }

    pub fn codegen(code: &str, message: impl Into<String>, action_id: Option<String>) -> Self {
        let mut e = Self::new(code, Phase::Codegen, IssueKind::Structural, message);
        e.action_id = action_id;
        e
    }

    pub fn at(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    pub fn on_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_kind(mut self, kind: IssueKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Failure fetching metadata for one action type from the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LookupError {
    #[error("action type '{action_type}' is not registered")]
    NotFound { action_type: String },

    #[error("registry unavailable while fetching '{action_type}': {reason}")]
    Unavailable { action_type: String, reason: String },

    #[error("metadata for '{action_type}' is invalid: {reason}")]
    InvalidMetadata { action_type: String, reason: String },
}

/// Failure decoding a configuration, template library or request document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn json(what: &'static str, source: serde_json::Error) -> Self {
        ConfigError::Json { what, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_action_and_parameter() {
        let e = CompilerError::readiness("R001", IssueKind::Completeness, "Missing value")
            .at("swap-1")
            .on_parameter("amountIn");
        assert_eq!(
            e.to_string(),
            "[Readiness:R001] Missing value (action 'swap-1', parameter 'amountIn')"
        );
    }

    #[test]
    fn display_without_action() {
        let e = CompilerError::parse("P005", "Workflow has no actions", None);
        assert_eq!(e.to_string(), "[Parse:P005] Workflow has no actions");
    }

    #[test]
    fn lookup_error_messages() {
        let e = LookupError::NotFound {
            action_type: "bridge".into(),
        };
        assert_eq!(e.to_string(), "action type 'bridge' is not registered");
    }
}
