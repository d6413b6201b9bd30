#![allow(dead_code)]

use std::collections::HashMap;

use cadence_compiler::parse::{ActionNode, ParameterBinding, ParameterValues};
use cadence_compiler::registry::{ActionMetadata, MetadataIndex, ParameterSpec};
use serde_json::Value;

// =============================================================================
// Action builders
// =============================================================================

/// Action with one typed binding per `(name, type, value)`.
pub fn action(id: &str, action_type: &str, bindings: &[(&str, &str, Value)]) -> ActionNode {
    bindings
        .iter()
        .fold(ActionNode::new(id, action_type), |node, (name, ty, value)| {
            node.with_parameter(ParameterBinding::new(*name, *ty, value.clone()))
        })
}

/// Metadata producing a single output.
pub fn producer(id: &str, output: &str, output_type: &str) -> ActionMetadata {
    ActionMetadata::new(id, id).with_output(output, output_type)
}

/// Metadata with a single required input.
pub fn consumer(id: &str, parameter: &str, parameter_type: &str) -> ActionMetadata {
    ActionMetadata::new(id, id).with_parameter(ParameterSpec::required(parameter, parameter_type))
}

pub fn index(metadata: impl IntoIterator<Item = ActionMetadata>) -> MetadataIndex {
    MetadataIndex::from_metadata(metadata)
}

pub fn catalog() -> MetadataIndex {
    MetadataIndex::from_metadata(cadence_compiler::registry::catalog::builtin_metadata())
}

pub fn no_values() -> ParameterValues {
    HashMap::new()
}

pub fn values(entries: &[(&str, &str, Value)]) -> ParameterValues {
    let mut values = ParameterValues::new();
    for (action_id, name, value) in entries {
        values
            .entry(action_id.to_string())
            .or_default()
            .insert(name.to_string(), value.clone());
    }
    values
}
