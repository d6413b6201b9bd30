//! Full pipeline: parse → metadata → validate → analyze → readiness → codegen.
//!
//! `compile` awaits the registry once per distinct action type and then runs the
//! synchronous stages through `compile_with_metadata`.

use serde::{Deserialize, Serialize};

use crate::analysis::{DataFlowAnalysis, analyze_data_flow_with};
use crate::codegen::{CadenceGenerationResult, CadenceGenerator, TemplateLibrary};
use crate::config::PipelineConfig;
use crate::parse::{ActionEdge, ActionNode, ParameterValues, ParsedWorkflow, parse};
use crate::readiness::{CadenceParameterValidator, ExecutionReadiness, assess_readiness};
use crate::registry::{ActionRegistry, MetadataIndex, resolve_metadata};
use crate::validate::{StructuralReport, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationReport {
    pub workflow: ParsedWorkflow,
    pub structure: StructuralReport,
    pub analysis: DataFlowAnalysis,
    pub readiness: ExecutionReadiness,
    pub generation: CadenceGenerationResult,
}

pub async fn compile<R>(
    registry: &R,
    nodes: &[ActionNode],
    edges: &[ActionEdge],
    values: &ParameterValues,
    config: &PipelineConfig,
) -> CompilationReport
where
    R: ActionRegistry + ?Sized,
{
    let workflow = parse(nodes, edges);
    let metadata = resolve_metadata(registry, &workflow).await;
    run_stages(workflow, &metadata, values, config, TemplateLibrary::builtin())
}

/// Run every stage against already resolved metadata.
pub fn compile_with_metadata(
    metadata: &MetadataIndex,
    nodes: &[ActionNode],
    edges: &[ActionEdge],
    values: &ParameterValues,
    config: &PipelineConfig,
    templates: TemplateLibrary,
) -> CompilationReport {
    run_stages(parse(nodes, edges), metadata, values, config, templates)
}

fn run_stages(
    workflow: ParsedWorkflow,
    metadata: &MetadataIndex,
    values: &ParameterValues,
    config: &PipelineConfig,
    templates: TemplateLibrary,
) -> CompilationReport {
    let structure = validate(&workflow, metadata);
    let analysis = analyze_data_flow_with(&workflow, metadata, values, &config.analysis);
    let readiness = assess_readiness(
        &workflow,
        metadata,
        values,
        &structure,
        &analysis,
        &CadenceParameterValidator,
        config,
    );

    // Actions whose metadata could not be fetched get a stub, not their template.
    let generator = CadenceGenerator::new(templates)
        .excluding(metadata.failed_types().map(|(action_type, _)| action_type.to_string()));
    let generation =
        generator.generate_transaction_with_details(&workflow.with_values(values), &config.generation);

    log::debug!(
        "compiled workflow: can_execute={}, score={}, fallback_used={}",
        readiness.can_execute,
        readiness.readiness_score,
        generation.fallback_used
    );

    CompilationReport {
        workflow,
        structure,
        analysis,
        readiness,
        generation,
    }
}
