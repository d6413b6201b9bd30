//! Static gas and time estimates for display. Nothing is executed.

use serde::{Deserialize, Serialize};

use crate::config::CostConfig;
use crate::parse::ParsedWorkflow;
use crate::registry::MetadataIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub gas: u64,
    pub time_ms: u64,
}

/// Σ per-action gas (metadata estimate, else the configured default) plus a
/// fixed overhead per connection. Time grows linearly in both counts.
pub fn estimate_cost(
    workflow: &ParsedWorkflow,
    metadata: &MetadataIndex,
    connection_count: usize,
    config: &CostConfig,
) -> CostEstimate {
    if workflow.is_empty() {
        return CostEstimate::default();
    }
    let connections = connection_count as u64;
    // Metadata estimates are untrusted; the totals saturate instead of wrapping.
    let action_gas = workflow
        .actions
        .iter()
        .map(|a| {
            metadata
                .get(&a.action_type)
                .and_then(|m| m.gas_estimate)
                .unwrap_or(config.default_action_gas)
        })
        .fold(0u64, u64::saturating_add);
    let actions = workflow.actions.len() as u64;

    CostEstimate {
        gas: action_gas.saturating_add(connections.saturating_mul(config.connection_gas)),
        time_ms: config
            .base_time_ms
            .saturating_add(actions.saturating_mul(config.per_action_time_ms))
            .saturating_add(connections.saturating_mul(config.per_connection_time_ms)),
    }
}
