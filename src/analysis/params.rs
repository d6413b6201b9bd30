//! Per-action parameter view merging registry declarations, bindings and the
//! current editor values.

use serde_json::Value;

use crate::parse::{ActionNode, ParameterValue, ParameterValues};
use crate::registry::{ActionMetadata, ParameterSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter<'a> {
    pub name: &'a str,
    pub declared_type: &'a str,
    pub required: bool,
    pub spec: Option<&'a ParameterSpec>,
    pub value: ParameterValue,
}

impl ResolvedParameter<'_> {
    /// The literal, if the value is one.
    pub fn literal(&self) -> Option<&Value> {
        match &self.value {
            ParameterValue::Literal { value } => Some(value),
            _ => None,
        }
    }
}

/// Parameters of `action`: registry declarations first (in declaration order),
/// then bindings the registry does not declare, then values with neither
/// (sorted by name).
///
/// The registry's declared type and required flag take precedence over the
/// binding's; a value in `values` takes precedence over the binding's raw value.
pub fn resolve_parameters<'a>(
    action: &'a ActionNode,
    metadata: Option<&'a ActionMetadata>,
    values: &'a ParameterValues,
    is_action: impl Fn(&str) -> bool,
) -> Vec<ResolvedParameter<'a>> {
    let overrides = values.get(&action.id);
    let raw_for = |name: &str| -> Option<&'a Value> {
        overrides
            .and_then(|o| o.get(name))
            .or_else(|| action.binding(name).map(|b| &b.value))
    };

    let mut resolved = Vec::new();

    if let Some(metadata) = metadata {
        for spec in &metadata.parameters {
            let binding = action.binding(&spec.name);
            resolved.push(ResolvedParameter {
                name: &spec.name,
                declared_type: &spec.param_type,
                required: spec.required || binding.is_some_and(|b| b.required),
                spec: Some(spec),
                value: ParameterValue::classify(raw_for(&spec.name), &is_action),
            });
        }
    }

    let declared = |name: &str| metadata.is_some_and(|m| m.parameter(name).is_some());

    for binding in &action.parameters {
        if declared(&binding.name) || resolved.iter().any(|r| r.name == binding.name) {
            continue;
        }
        resolved.push(ResolvedParameter {
            name: &binding.name,
            declared_type: &binding.param_type,
            required: binding.required,
            spec: None,
            value: ParameterValue::classify(raw_for(&binding.name), &is_action),
        });
    }

    if let Some(overrides) = overrides {
        let mut extra: Vec<(&'a String, &'a Value)> = overrides
            .iter()
            .filter(|(name, _)| !declared(name) && action.binding(name).is_none())
            .collect();
        extra.sort_by(|a, b| a.0.cmp(b.0));
        for (name, raw) in extra {
            resolved.push(ResolvedParameter {
                name,
                declared_type: "",
                required: false,
                spec: None,
                value: ParameterValue::classify(Some(raw), &is_action),
            });
        }
    }

    resolved
}
