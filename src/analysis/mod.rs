//! Data-flow analysis: how upstream outputs feed downstream parameters.
//!
//! The analysis is a pure function of the parsed workflow, the resolved
//! metadata and the current parameter values. It never mutates its inputs and
//! returns a fresh `DataFlowAnalysis` on every call.

pub mod compat;
pub mod cycles;
pub mod params;
pub mod suggest;

pub use compat::check_compatible;
pub use params::{ResolvedParameter, resolve_parameters};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::parse::{ParameterValue, ParameterValues, ParsedWorkflow};
use crate::registry::MetadataIndex;

// =============================================================================
// RESULT TYPES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlowAnalysis {
    /// One entry per action, in execution order.
    pub dependencies: Vec<ActionDependencies>,
    pub connections: Vec<ParameterConnection>,
    pub type_mismatches: Vec<TypeMismatch>,
    pub unresolved_references: Vec<UnresolvedReference>,
    pub circular_dependencies: Vec<DependencyCycle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDependencies {
    pub action_id: String,
    /// Actions referenced by this action's parameters, first reference first.
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConnection {
    pub source_action_id: String,
    pub source_output: String,
    pub target_action_id: String,
    pub target_parameter: String,
    pub source_type: String,
    pub target_type: String,
    pub is_type_compatible: bool,
    /// 0–1; type contribution × proximity factor.
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMismatch {
    pub source_action_id: String,
    pub source_output: String,
    pub target_action_id: String,
    pub target_parameter: String,
    pub source_type: String,
    pub target_type: String,
    pub suggestion: String,
    pub can_convert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnresolvedReason {
    UnknownOutput,
    ForwardReference,
    SelfReference,
    MetadataUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    pub action_id: String,
    pub parameter: String,
    /// The reference as written: `"<actionId>.<outputName>"`.
    pub reference: String,
    pub reason: UnresolvedReason,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCycle {
    pub actions: Vec<String>,
    pub suggestion: String,
}

impl DataFlowAnalysis {
    pub fn connection_for(&self, action_id: &str, parameter: &str) -> Option<&ParameterConnection> {
        self.connections
            .iter()
            .find(|c| c.target_action_id == action_id && c.target_parameter == parameter)
    }

    pub fn dependencies_of(&self, action_id: &str) -> &[String] {
        self.dependencies
            .iter()
            .find(|d| d.action_id == action_id)
            .map(|d| d.depends_on.as_slice())
            .unwrap_or(&[])
    }

    /// No unresolved references and no non-convertible mismatches.
    pub fn is_data_flow_valid(&self) -> bool {
        self.unresolved_references.is_empty() && self.type_mismatches.iter().all(|m| m.can_convert)
    }
}

// =============================================================================
// ANALYZER
// =============================================================================

const CYCLE_SUGGESTION: &str =
    "break the cycle by supplying a literal value for one parameter in the cycle";

pub fn analyze_data_flow(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
) -> DataFlowAnalysis {
    analyze_data_flow_with(workflow, metadata, values, &AnalysisConfig::default())
}

pub fn analyze_data_flow_with(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
    config: &AnalysisConfig,
) -> DataFlowAnalysis {
    let positions = workflow.positions();
    let mut analysis = DataFlowAnalysis::default();

    // Parameter-level graph, independent of control flow. Node index equals the
    // action's position in the execution order; edges point from the
    // referencing action to the referenced one.
    let mut references: DiGraph<&str, ()> = DiGraph::new();
    for id in &workflow.execution_order {
        references.add_node(id.as_str());
    }

    for action in workflow.ordered_actions() {
        let Some(&target_idx) = positions.get(action.id.as_str()) else {
            continue;
        };
        let action_metadata = metadata.get(&action.action_type);
        let params = resolve_parameters(action, action_metadata, values, |id| {
            positions.contains_key(id)
        });

        let mut depends_on: Vec<String> = Vec::new();
        for param in &params {
            let ParameterValue::Reference(reference) = &param.value else {
                continue;
            };
            let Some(&source_idx) = positions.get(reference.action_id.as_str()) else {
                continue;
            };
            if !depends_on.contains(&reference.action_id) {
                depends_on.push(reference.action_id.clone());
            }
            references.update_edge(NodeIndex::new(target_idx), NodeIndex::new(source_idx), ());

            let unresolved = |reason: UnresolvedReason, message: String, suggestions: Vec<String>| {
                UnresolvedReference {
                    action_id: action.id.clone(),
                    parameter: param.name.to_string(),
                    reference: reference.to_string(),
                    reason,
                    message,
                    suggestions,
                }
            };

            if source_idx >= target_idx {
                let (reason, message) = if source_idx == target_idx {
                    (
                        UnresolvedReason::SelfReference,
                        format!("'{}' is a self reference", reference),
                    )
                } else {
                    (
                        UnresolvedReason::ForwardReference,
                        format!(
                            "'{}' is a forward reference: '{}' runs after '{}'",
                            reference, reference.action_id, action.id
                        ),
                    )
                };
                analysis
                    .unresolved_references
                    .push(unresolved(reason, message, Vec::new()));
                continue;
            }

            let source_metadata = workflow
                .action(&reference.action_id)
                .and_then(|a| metadata.get(&a.action_type));
            let Some(source_metadata) = source_metadata else {
                analysis.unresolved_references.push(unresolved(
                    UnresolvedReason::MetadataUnavailable,
                    format!(
                        "Outputs of '{}' are unknown because its metadata is unavailable",
                        reference.action_id
                    ),
                    Vec::new(),
                ));
                continue;
            };

            let Some(output) = source_metadata.output(&reference.output_name) else {
                let suggestions = suggest::suggest_outputs(
                    &source_metadata.outputs,
                    &reference.output_name,
                    param.declared_type,
                    config.max_suggestions,
                );
                analysis.unresolved_references.push(unresolved(
                    UnresolvedReason::UnknownOutput,
                    format!(
                        "Action '{}' has no output named '{}'",
                        reference.action_id, reference.output_name
                    ),
                    suggestions,
                ));
                continue;
            };

            let compatibility = compat::assess(&output.output_type, param.declared_type);
            let proximity = proximity_factor(target_idx - source_idx, config);

            analysis.connections.push(ParameterConnection {
                source_action_id: reference.action_id.clone(),
                source_output: reference.output_name.clone(),
                target_action_id: action.id.clone(),
                target_parameter: param.name.to_string(),
                source_type: output.output_type.clone(),
                target_type: param.declared_type.to_string(),
                is_type_compatible: compatibility.compatible,
                strength: compatibility.score * proximity,
            });

            if !compatibility.compatible {
                analysis.type_mismatches.push(TypeMismatch {
                    source_action_id: reference.action_id.clone(),
                    source_output: reference.output_name.clone(),
                    target_action_id: action.id.clone(),
                    target_parameter: param.name.to_string(),
                    source_type: output.output_type.clone(),
                    target_type: param.declared_type.to_string(),
                    suggestion: compatibility.suggestion.unwrap_or_default(),
                    can_convert: compatibility.can_convert,
                });
            }
        }

        analysis.dependencies.push(ActionDependencies {
            action_id: action.id.clone(),
            depends_on,
        });
    }

    analysis.circular_dependencies = cycles::find_cycles(&references)
        .into_iter()
        .map(|cycle| DependencyCycle {
            actions: cycle.into_iter().map(|n| references[n].to_string()).collect(),
            suggestion: CYCLE_SUGGESTION.to_string(),
        })
        .collect();

    log::debug!(
        "data flow: {} connections, {} mismatches, {} unresolved, {} cycles",
        analysis.connections.len(),
        analysis.type_mismatches.len(),
        analysis.unresolved_references.len(),
        analysis.circular_dependencies.len()
    );

    analysis
}

/// 1.0 for adjacent actions, minus `proximity_decay` per intervening action,
/// never below `proximity_floor`.
pub fn proximity_factor(distance: usize, config: &AnalysisConfig) -> f64 {
    let intervening = distance.saturating_sub(1) as f64;
    (1.0 - config.proximity_decay * intervening).max(config.proximity_floor)
}
