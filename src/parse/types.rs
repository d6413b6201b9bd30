//! Graph input types supplied by the editor.
//!
//! These are the serde targets for the workflow JSON sent by the canvas. Parameter
//! values arrive untyped (`serde_json::Value`) and are classified into
//! [`ParameterValue`] once, during analysis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current parameter values keyed by action id, then parameter name.
///
/// Entries here override the raw value stored on the action's own bindings.
pub type ParameterValues = HashMap<String, HashMap<String, Value>>;

// =============================================================================
// GRAPH NODES AND EDGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    pub id: String,
    pub action_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterBinding>,
    /// Downstream action ids (control flow).
    #[serde(default)]
    pub next: Vec<String>,
}

impl ActionNode {
    pub fn new(id: impl Into<String>, action_type: impl Into<String>) -> Self {
        ActionNode {
            id: id.into(),
            action_type: action_type.into(),
            label: None,
            parameters: Vec::new(),
            next: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, binding: ParameterBinding) -> Self {
        self.parameters.push(binding);
        self
    }

    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next.push(next.into());
        self
    }

    pub fn binding(&self, name: &str) -> Option<&ParameterBinding> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBinding {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub required: bool,
}

impl ParameterBinding {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>, value: Value) -> Self {
        ParameterBinding {
            name: name.into(),
            param_type: param_type.into(),
            value,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

impl ActionEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        ActionEdge {
            id: None,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}->{}", self.source, self.target),
        }
    }
}

// =============================================================================
// PARAMETER VALUES
// =============================================================================

/// A reference to another action's declared output: `"<actionId>.<outputName>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputReference {
    pub action_id: String,
    pub output_name: String,
}

impl std::fmt::Display for OutputReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.action_id, self.output_name)
    }
}

/// Classified parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParameterValue {
    Unset,
    Literal { value: Value },
    Reference(OutputReference),
}

impl ParameterValue {
    /// Classify a raw editor value.
    ///
    /// A string of the form `<token>.<token>` is a reference only when the first
    /// token names an action in the workflow; `"10.5"` stays a literal.
    pub fn classify(raw: Option<&Value>, is_action: impl Fn(&str) -> bool) -> Self {
        let Some(raw) = raw else {
            return ParameterValue::Unset;
        };
        match raw {
            Value::Null => ParameterValue::Unset,
            Value::String(s) if s.trim().is_empty() => ParameterValue::Unset,
            Value::String(s) => match split_reference(s.trim()) {
                Some((action_id, output_name)) if is_action(action_id) => {
                    ParameterValue::Reference(OutputReference {
                        action_id: action_id.to_string(),
                        output_name: output_name.to_string(),
                    })
                }
                _ => ParameterValue::Literal { value: raw.clone() },
            },
            other => ParameterValue::Literal {
                value: other.clone(),
            },
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ParameterValue::Unset)
    }

    pub fn as_reference(&self) -> Option<&OutputReference> {
        match self {
            ParameterValue::Reference(r) => Some(r),
            _ => None,
        }
    }
}

/// Text form of a literal value: strings unquoted, everything else as JSON.
pub fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn split_reference(s: &str) -> Option<(&str, &str)> {
    let (head, tail) = s.split_once('.')?;
    if is_token(head) && is_token(tail) {
        Some((head, tail))
    } else {
        None
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
