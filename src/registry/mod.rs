//! Action registry boundary.
//!
//! The registry is an external collaborator; this module defines the metadata it
//! supplies, the async lookup trait, and the resolved per-type index every
//! downstream stage reads synchronously.

pub mod catalog;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::parse::ParsedWorkflow;

// =============================================================================
// METADATA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    /// Action-type id this metadata describes.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    /// Action types that must not appear in the same workflow.
    #[serde(default)]
    pub conflicts_with: Vec<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub gas_estimate: Option<u64>,
}

impl ActionMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        ActionMetadata {
            id: id.into(),
            name: name.into(),
            parameters: Vec::new(),
            outputs: Vec::new(),
            conflicts_with: Vec::new(),
            required_capabilities: Vec::new(),
            gas_estimate: None,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|o| o.name == name)
    }

    pub fn with_parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, output_type: impl Into<String>) -> Self {
        self.outputs.push(OutputSpec {
            name: name.into(),
            output_type: output_type.into(),
            description: None,
        });
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas_estimate = Some(gas);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        ParameterSpec {
            name: name.into(),
            param_type: param_type.into(),
            required: true,
            description: None,
            min: None,
            max: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        ParameterSpec {
            required: false,
            ..Self::required(name, param_type)
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// LOOKUP
// =============================================================================

#[async_trait]
pub trait ActionRegistry: Send + Sync {
    async fn fetch(&self, action_type: &str) -> Result<ActionMetadata, LookupError>;
}

/// In-memory registry.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: HashMap<String, ActionMetadata>,
}

impl StaticRegistry {
    pub fn new(metadata: impl IntoIterator<Item = ActionMetadata>) -> Self {
        StaticRegistry {
            entries: metadata.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn insert(&mut self, metadata: ActionMetadata) {
        self.entries.insert(metadata.id.clone(), metadata);
    }
}

#[async_trait]
impl ActionRegistry for StaticRegistry {
    async fn fetch(&self, action_type: &str) -> Result<ActionMetadata, LookupError> {
        self.entries
            .get(action_type)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                action_type: action_type.to_string(),
            })
    }
}

/// Resolved metadata, one lookup outcome per action type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataIndex {
    entries: BTreeMap<String, Result<ActionMetadata, LookupError>>,
}

impl MetadataIndex {
    pub fn from_metadata(metadata: impl IntoIterator<Item = ActionMetadata>) -> Self {
        MetadataIndex {
            entries: metadata.into_iter().map(|m| (m.id.clone(), Ok(m))).collect(),
        }
    }

    pub fn record(&mut self, action_type: impl Into<String>, outcome: Result<ActionMetadata, LookupError>) {
        self.entries.insert(action_type.into(), outcome);
    }

    pub fn get(&self, action_type: &str) -> Option<&ActionMetadata> {
        self.entries.get(action_type).and_then(|r| r.as_ref().ok())
    }

    pub fn lookup(&self, action_type: &str) -> Option<&Result<ActionMetadata, LookupError>> {
        self.entries.get(action_type)
    }

    /// Action types whose lookup failed.
    pub fn failed_types(&self) -> impl Iterator<Item = (&str, &LookupError)> {
        self.entries
            .iter()
            .filter_map(|(k, r)| r.as_ref().err().map(|e| (k.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Await one registry lookup per distinct action type, in execution order.
///
/// A failed lookup is recorded and the remaining types are still fetched.
pub async fn resolve_metadata<R>(registry: &R, workflow: &ParsedWorkflow) -> MetadataIndex
where
    R: ActionRegistry + ?Sized,
{
    let mut index = MetadataIndex::default();
    for action in workflow.ordered_actions() {
        if index.lookup(&action.action_type).is_some() {
            continue;
        }
        let outcome = registry.fetch(&action.action_type).await;
        if let Err(e) = &outcome {
            log::warn!("metadata lookup failed for '{}': {}", action.action_type, e);
        }
        index.record(action.action_type.clone(), outcome);
    }
    log::debug!(
        "resolved metadata for {} action types ({} failed)",
        index.len(),
        index.failed_types().count()
    );
    index
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::parse::{ActionNode, parse};

    struct CountingRegistry {
        inner: StaticRegistry,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ActionRegistry for CountingRegistry {
        async fn fetch(&self, action_type: &str) -> Result<ActionMetadata, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(action_type).await
        }
    }

    #[test]
    fn fetches_each_type_once_and_records_failures() {
        let registry = CountingRegistry {
            inner: StaticRegistry::new([ActionMetadata::new("swap-tokens", "Swap")]),
            calls: AtomicUsize::new(0),
        };
        let nodes = vec![
            ActionNode::new("a", "swap-tokens").then("b"),
            ActionNode::new("b", "swap-tokens").then("c"),
            ActionNode::new("c", "bridge"),
        ];
        let workflow = parse(&nodes, &[]);

        let index = tokio_test::block_on(resolve_metadata(&registry, &workflow));

        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
        assert!(index.get("swap-tokens").is_some());
        assert!(index.get("bridge").is_none());
        let failed: Vec<&str> = index.failed_types().map(|(t, _)| t).collect();
        assert_eq!(failed, vec!["bridge"]);
    }
}
