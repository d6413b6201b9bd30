//! The compiled control-flow view consumed by every later stage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{ActionEdge, ActionNode, ParameterBinding, ParameterValues};
use crate::error::CompilerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedWorkflow {
    /// Actions with unique ids, in insertion order.
    pub actions: Vec<ActionNode>,
    /// Topological order; residual (cyclic) actions appended in insertion order.
    pub execution_order: Vec<String>,
    pub root_actions: Vec<String>,
    pub edges: Vec<ActionEdge>,
    /// Actions Kahn's algorithm could not release.
    pub residual_actions: Vec<String>,
    /// Structural errors found while parsing.
    pub errors: Vec<CompilerError>,
    pub summary: WorkflowSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub action_count: usize,
    pub edge_count: usize,
    pub root_count: usize,
    pub leaf_count: usize,
    pub parameter_count: usize,
}

impl ParsedWorkflow {
    pub fn action(&self, id: &str) -> Option<&ActionNode> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.action(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Control-flow graph had no cycle.
    pub fn is_acyclic(&self) -> bool {
        self.residual_actions.is_empty()
    }

    /// Index of each action id within the execution order.
    pub fn positions(&self) -> HashMap<&str, usize> {
        self.execution_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.execution_order.iter().position(|a| a == id)
    }

    /// Actions in execution order.
    pub fn ordered_actions(&self) -> impl Iterator<Item = &ActionNode> {
        self.execution_order.iter().filter_map(|id| self.action(id))
    }

    /// A fresh workflow whose bindings carry the given values.
    ///
    /// Values for parameters an action has no binding for are appended as new
    /// bindings (sorted by name, untyped).
    pub fn with_values(&self, values: &ParameterValues) -> ParsedWorkflow {
        let mut next = self.clone();
        for action in &mut next.actions {
            let Some(overrides) = values.get(&action.id) else {
                continue;
            };
            let mut extra: Vec<(&String, &serde_json::Value)> = Vec::new();
            for (name, value) in overrides {
                match action.parameters.iter_mut().find(|p| &p.name == name) {
                    Some(binding) => binding.value = value.clone(),
                    None => extra.push((name, value)),
                }
            }
            extra.sort_by(|a, b| a.0.cmp(b.0));
            for (name, value) in extra {
                action
                    .parameters
                    .push(ParameterBinding::new(name.clone(), "", value.clone()));
            }
        }
        next.summary.parameter_count = next.actions.iter().map(|a| a.parameters.len()).sum();
        next
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parse::parse;

    #[test]
    fn with_values_overrides_without_touching_original() {
        let nodes = vec![ActionNode::new("a", "t").with_parameter(ParameterBinding::new(
            "amount",
            "UFix64",
            json!(""),
        ))];
        let workflow = parse(&nodes, &[]);
        let mut values = ParameterValues::new();
        values.insert(
            "a".into(),
            HashMap::from([
                ("amount".to_string(), json!("5.0")),
                ("memo".to_string(), json!("hi")),
            ]),
        );

        let updated = workflow.with_values(&values);

        assert_eq!(workflow.actions[0].parameters[0].value, json!(""));
        let a = updated.action("a").unwrap();
        assert_eq!(a.binding("amount").unwrap().value, json!("5.0"));
        assert_eq!(a.binding("memo").unwrap().value, json!("hi"));
        assert_eq!(updated.summary.parameter_count, 2);
    }
}
