//! Structural validation of a parsed workflow against the registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, LookupError};
use crate::parse::ParsedWorkflow;
use crate::registry::MetadataIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub valid: bool,
    pub errors: Vec<CompilerError>,
}

/// Run all structural rules. Parse errors are carried over first.
pub fn validate(workflow: &ParsedWorkflow, metadata: &MetadataIndex) -> StructuralReport {
    let mut errors = workflow.errors.clone();

    p006_known_action_types(workflow, metadata, &mut errors);
    p008_unique_parameter_names(workflow, &mut errors);

    StructuralReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn p006_known_action_types(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    errors: &mut Vec<CompilerError>,
) {
    for action in &workflow.actions {
        match metadata.lookup(&action.action_type) {
            Some(Ok(_)) => {}
            Some(Err(e)) if !matches!(e, LookupError::NotFound { .. }) => {
                errors.push(CompilerError::parse(
                    "P007",
                    format!(
                        "Metadata unavailable for action type '{}': {}",
                        action.action_type, e
                    ),
                    Some(action.id.clone()),
                ))
            }
            _ => errors.push(CompilerError::parse(
                "P006",
                format!(
                    "Action '{}' has unknown action type '{}'",
                    action.id, action.action_type
                ),
                Some(action.id.clone()),
            )),
        }
    }
}

fn p008_unique_parameter_names(workflow: &ParsedWorkflow, errors: &mut Vec<CompilerError>) {
    for action in &workflow.actions {
        let mut seen = HashSet::new();
        for binding in &action.parameters {
            if !seen.insert(binding.name.as_str()) {
                errors.push(
                    CompilerError::parse(
                        "P008",
                        format!(
                            "Parameter '{}' is bound more than once on action '{}'",
                            binding.name, action.id
                        ),
                        Some(action.id.clone()),
                    )
                    .on_parameter(binding.name.clone()),
                );
            }
        }
    }
}
