//! Human-readable outline of what the generated transaction does.

use super::CadenceGenerator;
use crate::parse::{ParameterValue, ParsedWorkflow, literal_text};

impl CadenceGenerator {
    /// One line per action in execution order, listing its inputs and the
    /// variables its outputs are bound to.
    pub fn generate_summary(&self, workflow: &ParsedWorkflow) -> String {
        let is_action = |id: &str| workflow.contains(id);
        let scope = self.var_scope(workflow);
        let mut out = String::new();

        for (i, action) in workflow.ordered_actions().enumerate() {
            let inputs: Vec<String> = action
                .parameters
                .iter()
                .map(|binding| {
                    let shown = match ParameterValue::classify(Some(&binding.value), is_action) {
                        ParameterValue::Unset => "<unset>".to_string(),
                        ParameterValue::Literal { value } => literal_text(&value),
                        ParameterValue::Reference(reference) => format!("<- {}", reference),
                    };
                    format!("{}={}", binding.name, shown)
                })
                .collect();

            let outputs: Vec<String> = match self.template_for(&action.action_type) {
                Some(template) => template
                    .outputs
                    .iter()
                    .map(|o| format!("{}: {}", scope.output(&action.id, &o.name), o.output_type))
                    .collect(),
                None => vec!["(no template)".to_string()],
            };

            out.push_str(&format!(
                "{}. {} [{}] inputs: {}; outputs: {}\n",
                i + 1,
                action.display_name(),
                action.action_type,
                if inputs.is_empty() { "none".to_string() } else { inputs.join(", ") },
                if outputs.is_empty() { "none".to_string() } else { outputs.join(", ") },
            ));
        }

        out
    }
}
