pub mod analysis;
pub mod codegen;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod readiness;
pub mod registry;
pub mod validate;
pub mod wasm;

pub use analysis::{DataFlowAnalysis, analyze_data_flow};
pub use codegen::{
    CadenceGenerationResult, generate_summary, generate_transaction,
    generate_transaction_with_details,
};
pub use parse::{ParsedWorkflow, parse};
pub use pipeline::{CompilationReport, compile, compile_with_metadata};
pub use readiness::{ExecutionReadiness, validate_for_execution};
