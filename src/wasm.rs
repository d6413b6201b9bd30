//! WASM entry points for browser use.
//!
//! Every function takes a `CompileRequest` JSON string and returns a JS object.
//! Registry lookups happen on the JS side; the resolved metadata arrives in the
//! request, so these entry points stay synchronous.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::codegen::{CadenceGenerator, TemplateLibrary};
use crate::config::PipelineConfig;
use crate::error::CompilerError;
use crate::parse::{ActionEdge, ActionNode, ParameterValues, parse};
use crate::registry::{ActionMetadata, MetadataIndex};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompileRequest {
    pub nodes: Vec<ActionNode>,
    pub edges: Vec<ActionEdge>,
    pub metadata: Vec<ActionMetadata>,
    pub values: ParameterValues,
    pub config: PipelineConfig,
}

impl CompileRequest {
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(json).map_err(|e| {
            CompilerError::parse("P001", format!("Failed to parse request JSON: {}", e), None)
        })
    }

    fn metadata_index(&self) -> MetadataIndex {
        MetadataIndex::from_metadata(self.metadata.iter().cloned())
    }
}

/// Parse the control-flow graph. Returns a `ParsedWorkflow`.
#[wasm_bindgen]
pub fn parse_workflow(json: &str) -> JsValue {
    respond(CompileRequest::from_json(json).map(|req| parse(&req.nodes, &req.edges)))
}

/// Data-flow analysis. Returns a `DataFlowAnalysis`.
#[wasm_bindgen]
pub fn analyze_workflow(json: &str) -> JsValue {
    respond(CompileRequest::from_json(json).map(|req| {
        let workflow = parse(&req.nodes, &req.edges);
        crate::analysis::analyze_data_flow_with(
            &workflow,
            &req.metadata_index(),
            &req.values,
            &req.config.analysis,
        )
    }))
}

/// Execution readiness. Returns an `ExecutionReadiness`.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    respond(CompileRequest::from_json(json).map(|req| {
        let workflow = parse(&req.nodes, &req.edges);
        crate::readiness::validate_for_execution_with(
            &workflow,
            &req.metadata_index(),
            &req.values,
            &crate::readiness::CadenceParameterValidator,
            &req.config,
        )
    }))
}

/// Cadence code generation with the builtin templates. Returns a
/// `CadenceGenerationResult`.
#[wasm_bindgen]
pub fn generate_workflow(json: &str) -> JsValue {
    respond(CompileRequest::from_json(json).map(|req| {
        let workflow = parse(&req.nodes, &req.edges).with_values(&req.values);
        CadenceGenerator::new(TemplateLibrary::builtin())
            .generate_transaction_with_details(&workflow, &req.config.generation)
    }))
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(untagged)]
enum Response<T> {
    Ok(T),
    Err { errors: Vec<CompilerError> },
}

fn respond<T: Serialize>(result: Result<T, CompilerError>) -> JsValue {
    let response = match result {
        Ok(value) => Response::Ok(value),
        Err(e) => Response::Err { errors: vec![e] },
    };
    serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_default() {
        let req = CompileRequest::from_json(r#"{"nodes":[{"id":"a","actionType":"get-balance"}]}"#)
            .unwrap();
        assert_eq!(req.nodes.len(), 1);
        assert!(req.edges.is_empty());
        assert!(req.config.generation.enable_fallbacks);
    }

    #[test]
    fn malformed_request_is_p001() {
        let err = CompileRequest::from_json("{nodes").unwrap_err();
        assert_eq!(err.code, "P001");
    }
}
