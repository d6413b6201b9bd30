//! End-to-end: editor JSON → registry lookup → every stage.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cadence_compiler::config::PipelineConfig;
use cadence_compiler::error::LookupError;
use cadence_compiler::parse::GraphDocument;
use cadence_compiler::pipeline::compile;
use cadence_compiler::registry::catalog::builtin_registry;
use cadence_compiler::registry::{ActionMetadata, ActionRegistry, StaticRegistry};
use helpers::*;
use serde_json::json;

/// Wraps the builtin catalog, counting lookups and failing one action type.
struct FlakyRegistry {
    inner: StaticRegistry,
    failing: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ActionRegistry for FlakyRegistry {
    async fn fetch(&self, action_type: &str) -> Result<ActionMetadata, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if action_type == self.failing {
            return Err(LookupError::Unavailable {
                action_type: action_type.to_string(),
                reason: "connection reset".into(),
            });
        }
        self.inner.fetch(action_type).await
    }
}

fn fixture() -> GraphDocument {
    serde_json::from_str(include_str!("fixtures/balance_swap_stake.json")).unwrap()
}

#[test]
fn fixture_compiles_end_to_end() {
    let doc = fixture();
    let report = tokio_test::block_on(compile(
        &builtin_registry(),
        &doc.nodes,
        &doc.edges,
        &no_values(),
        &PipelineConfig::default(),
    ));

    assert!(report.structure.valid);
    assert_eq!(report.analysis.connections.len(), 2);
    assert!(report.readiness.can_execute);
    assert_eq!(report.readiness.readiness_score, 100);
    assert!(report.generation.success);
    assert!(report.generation.script.contains("amount: swap_amountOut"));
}

#[test]
fn registry_failure_degrades_one_action_type() {
    let doc = fixture();
    let registry = FlakyRegistry {
        inner: builtin_registry(),
        failing: "swap-tokens",
        calls: AtomicUsize::new(0),
    };
    let report = tokio_test::block_on(compile(
        &registry,
        &doc.nodes,
        &doc.edges,
        &no_values(),
        &PipelineConfig::default(),
    ));

    // one lookup per distinct action type
    assert_eq!(registry.calls.load(Ordering::SeqCst), 3);

    assert!(!report.readiness.can_execute);
    assert!(report.structure.errors.iter().any(|e| e.code == "P007"));
    // stake reads swap.amountOut, whose outputs are now unknown
    assert!(report.readiness.blocking_errors.iter().any(|e| e.code == "D005"));

    assert!(report.generation.success);
    assert!(report.generation.fallback_used);
    assert!(report.generation.script.contains("// [fallback] 2. Swap FLOW to USDC (swap-tokens)"));
    assert!(!report.generation.script.contains("SwapRouter"));
}

#[test]
fn editor_values_flow_into_every_stage() {
    let nodes = vec![
        action("bal", "get-balance", &[("address", "Address", json!(""))]).then("send"),
        action("send", "transfer-tokens", &[]),
    ];
    let values = values(&[
        ("bal", "address", json!("0x01")),
        ("send", "recipient", json!("0x02")),
        ("send", "amount", json!("bal.balance")),
    ]);
    let report = tokio_test::block_on(compile(
        &builtin_registry(),
        &nodes,
        &[],
        &values,
        &PipelineConfig::default(),
    ));

    assert!(report.readiness.can_execute, "{:?}", report.readiness.blocking_errors);
    assert_eq!(report.analysis.connections.len(), 1);
    let script = &report.generation.script;
    assert!(script.contains("getAccount(0x01)"));
    assert!(script.contains("getAccount(0x02)"));
    assert!(script.contains("withdraw(amount: bal_balance)"));
}

#[test]
fn pipeline_is_idempotent() {
    let doc = fixture();
    let run = || {
        tokio_test::block_on(compile(
            &builtin_registry(),
            &doc.nodes,
            &doc.edges,
            &no_values(),
            &PipelineConfig::default(),
        ))
    };
    assert_eq!(run(), run());
}
