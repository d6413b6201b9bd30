//! Execution readiness: aggregates structural validation, per-parameter
//! validation and data-flow analysis into a single verdict.
//!
//! Never fails. Every problem, including a malformed graph, becomes a blocking
//! error or a warning on the returned `ExecutionReadiness`.

pub mod cost;
pub mod validator;

pub use cost::{CostEstimate, estimate_cost};
pub use validator::{
    CadenceParameterValidator, ParameterCheck, ParameterInput, ParameterReport,
    ParameterValidator, collect_checks,
};

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::analysis::{
    DataFlowAnalysis, UnresolvedReason, analyze_data_flow_with, resolve_parameters,
};
use crate::config::PipelineConfig;
use crate::error::{CompilerError, IssueKind};
use crate::parse::{ParameterValue, ParameterValues, ParsedWorkflow};
use crate::registry::MetadataIndex;
use crate::validate::{StructuralReport, validate};

const CHECK_WEIGHT: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReadiness {
    pub can_execute: bool,
    pub checks: ReadinessChecks,
    /// 0–100.
    pub readiness_score: u8,
    pub configured_required: usize,
    pub total_required: usize,
    pub message: String,
    pub blocking_errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerError>,
    pub estimated_gas_cost: u64,
    pub estimated_execution_time_ms: u64,
    pub required_capabilities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessChecks {
    pub parameters_configured: bool,
    pub data_flow_valid: bool,
    pub no_circular_dependencies: bool,
    pub all_actions_valid: bool,
}

pub fn validate_for_execution(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
) -> ExecutionReadiness {
    validate_for_execution_with(
        workflow,
        metadata,
        values,
        &CadenceParameterValidator,
        &PipelineConfig::default(),
    )
}

pub fn validate_for_execution_with(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
    validator: &dyn ParameterValidator,
    config: &PipelineConfig,
) -> ExecutionReadiness {
    let structure = validate(workflow, metadata);
    let analysis = analyze_data_flow_with(workflow, metadata, values, &config.analysis);
    assess_readiness(workflow, metadata, values, &structure, &analysis, validator, config)
}

/// Build the verdict from already computed structural and data-flow results.
pub fn assess_readiness(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
    structure: &StructuralReport,
    analysis: &DataFlowAnalysis,
    validator: &dyn ParameterValidator,
    config: &PipelineConfig,
) -> ExecutionReadiness {
    let mut blocking = structure.errors.clone();
    let mut warnings = Vec::new();

    // Completeness + literal collection
    let positions = workflow.positions();
    let mut total_required = 0usize;
    let mut configured_required = 0usize;
    let mut inputs = Vec::new();

    for action in workflow.ordered_actions() {
        let params = resolve_parameters(
            action,
            metadata.get(&action.action_type),
            values,
            |id| positions.contains_key(id),
        );
        for param in params {
            let configured = match &param.value {
                ParameterValue::Unset => false,
                ParameterValue::Literal { .. } => true,
                ParameterValue::Reference(_) => {
                    analysis.connection_for(&action.id, param.name).is_some()
                }
            };
            if param.required {
                total_required += 1;
                if configured {
                    configured_required += 1;
                } else if param.value.is_unset() {
                    blocking.push(
                        CompilerError::readiness(
                            "R001",
                            IssueKind::Completeness,
                            format!(
                                "Required parameter '{}' of action '{}' has no value",
                                param.name, action.id
                            ),
                        )
                        .at(action.id.clone())
                        .on_parameter(param.name),
                    );
                }
            }
            if let Some(value) = param.literal() {
                inputs.push((
                    action.id.as_str(),
                    param.name,
                    param.declared_type,
                    param.spec,
                    value.clone(),
                ));
            }
        }
    }

    let report = collect_checks(
        validator,
        inputs.iter().map(|(action_id, name, declared_type, spec, value)| ParameterInput {
            action_id,
            name,
            declared_type,
            min: spec.and_then(|s| s.min),
            max: spec.and_then(|s| s.max),
            value,
        }),
    );
    let all_actions_valid = report.values().all(|c| c.errors.is_empty());
    for ((action_id, name), check) in &report {
        for message in &check.errors {
            blocking.push(
                CompilerError::readiness("R002", IssueKind::Validation, message.clone())
                    .at(action_id.clone())
                    .on_parameter(name.clone()),
            );
        }
        for message in &check.warnings {
            warnings.push(
                CompilerError::readiness("W003", IssueKind::Validation, message.clone())
                    .at(action_id.clone())
                    .on_parameter(name.clone()),
            );
        }
    }

    collect_data_flow_issues(analysis, config, &mut blocking, &mut warnings);
    collect_conflicts(workflow, metadata, &mut warnings);

    let checks = ReadinessChecks {
        parameters_configured: configured_required == total_required,
        data_flow_valid: analysis.is_data_flow_valid(),
        no_circular_dependencies: analysis.circular_dependencies.is_empty(),
        all_actions_valid,
    };
    let completion = if total_required == 0 {
        1.0
    } else {
        configured_required as f64 / total_required as f64
    };
    let score = CHECK_WEIGHT * completion
        + [
            checks.data_flow_valid,
            checks.no_circular_dependencies,
            checks.all_actions_valid,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as f64
            * CHECK_WEIGHT;

    let cost = estimate_cost(workflow, metadata, analysis.connections.len(), &config.cost);
    let required_capabilities: BTreeSet<String> = workflow
        .actions
        .iter()
        .filter_map(|a| metadata.get(&a.action_type))
        .flat_map(|m| m.required_capabilities.iter().cloned())
        .collect();

    let can_execute = blocking.is_empty();
    let message = if workflow.is_empty() {
        "Workflow has no actions; nothing to execute".to_string()
    } else if can_execute && warnings.is_empty() {
        "Ready to execute".to_string()
    } else if can_execute {
        format!("Ready to execute with {} warning(s)", warnings.len())
    } else {
        format!(
            "{} blocking issue(s) must be resolved before execution",
            blocking.len()
        )
    };

    log::debug!(
        "readiness: score {:.0}, {} blocking, {} warnings",
        score,
        blocking.len(),
        warnings.len()
    );

    ExecutionReadiness {
        can_execute,
        checks,
        readiness_score: score.round().clamp(0.0, 100.0) as u8,
        configured_required,
        total_required,
        message,
        blocking_errors: blocking,
        warnings,
        estimated_gas_cost: cost.gas,
        estimated_execution_time_ms: cost.time_ms,
        required_capabilities: required_capabilities.into_iter().collect(),
    }
}

fn collect_data_flow_issues(
    analysis: &DataFlowAnalysis,
    config: &PipelineConfig,
    blocking: &mut Vec<CompilerError>,
    warnings: &mut Vec<CompilerError>,
) {
    for unresolved in &analysis.unresolved_references {
        let code = match unresolved.reason {
            UnresolvedReason::UnknownOutput => "D001",
            UnresolvedReason::ForwardReference | UnresolvedReason::SelfReference => "D002",
            UnresolvedReason::MetadataUnavailable => "D005",
        };
        blocking.push(
            CompilerError::readiness(code, IssueKind::Reference, unresolved.message.clone())
                .at(unresolved.action_id.clone())
                .on_parameter(unresolved.parameter.clone())
                .with_suggestions(unresolved.suggestions.clone()),
        );
    }

    for mismatch in &analysis.type_mismatches {
        let message = format!(
            "'{}.{}' ({}) does not match parameter '{}' ({})",
            mismatch.source_action_id,
            mismatch.source_output,
            mismatch.source_type,
            mismatch.target_parameter,
            mismatch.target_type
        );
        let issue = CompilerError::readiness(
            if mismatch.can_convert { "W001" } else { "D003" },
            IssueKind::Type,
            message,
        )
        .at(mismatch.target_action_id.clone())
        .on_parameter(mismatch.target_parameter.clone())
        .with_suggestions(vec![mismatch.suggestion.clone()]);
        if mismatch.can_convert {
            warnings.push(issue);
        } else {
            blocking.push(issue);
        }
    }

    for connection in &analysis.connections {
        if connection.is_type_compatible
            && connection.strength < config.analysis.weak_connection_threshold
        {
            warnings.push(
                CompilerError::readiness(
                    "W002",
                    IssueKind::Advisory,
                    format!(
                        "Weak connection from '{}.{}' (strength {:.2})",
                        connection.source_action_id, connection.source_output, connection.strength
                    ),
                )
                .at(connection.target_action_id.clone())
                .on_parameter(connection.target_parameter.clone()),
            );
        }
    }

    for cycle in &analysis.circular_dependencies {
        let mut path = cycle.actions.clone();
        if let Some(first) = cycle.actions.first() {
            path.push(first.clone());
        }
        let mut issue = CompilerError::readiness(
            "D004",
            IssueKind::DependencyCycle,
            format!("Circular dependency: {}", path.join(" -> ")),
        )
        .with_suggestions(vec![cycle.suggestion.clone()]);
        issue.action_id = cycle.actions.first().cloned();
        blocking.push(issue);
    }
}

fn collect_conflicts(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    warnings: &mut Vec<CompilerError>,
) {
    let mut reported = HashSet::new();
    let actions: Vec<_> = workflow.ordered_actions().collect();
    for (i, a) in actions.iter().enumerate() {
        for b in &actions[i + 1..] {
            let conflicts = |x: &str, y: &str| {
                metadata
                    .get(x)
                    .is_some_and(|m| m.conflicts_with.iter().any(|c| c == y))
            };
            if !(conflicts(&a.action_type, &b.action_type)
                || conflicts(&b.action_type, &a.action_type))
            {
                continue;
            }
            let key = if a.action_type <= b.action_type {
                (a.action_type.clone(), b.action_type.clone())
            } else {
                (b.action_type.clone(), a.action_type.clone())
            };
            if !reported.insert(key) {
                continue;
            }
            warnings.push(
                CompilerError::readiness(
                    "W004",
                    IssueKind::Advisory,
                    format!(
                        "Action '{}' ({}) conflicts with '{}' ({})",
                        a.id, a.action_type, b.id, b.action_type
                    ),
                )
                .at(b.id.clone()),
            );
        }
    }
}
