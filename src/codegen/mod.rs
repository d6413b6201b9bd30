//! Codegen pass: `ParsedWorkflow` → Cadence transaction script.
//!
//! Public API: `generate_transaction(workflow) -> String` and
//! `generate_transaction_with_details(workflow, options) -> CadenceGenerationResult`.
//! The generator walks the execution order computed by the parser and does not
//! re-validate; problems are reported alongside a best-effort script.

mod summary;
pub mod templates;
pub mod value_expr;
mod writer;

pub use templates::{CodeTemplate, ImportDecl, TemplateLibrary, TemplateOutput, TemplateParam};
pub use value_expr::binding_var_name;

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::GenerationOptions;
use crate::error::CompilerError;
use crate::parse::{ActionNode, ParameterValue, ParsedWorkflow, literal_text};
use value_expr::{
    action_prefix, emit_literal, local_var_name, render_template, scoped_var_name, template_locals,
};
use writer::CodeWriter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceGenerationResult {
    pub script: String,
    pub success: bool,
    pub fallback_used: bool,
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerError>,
}

pub fn generate_transaction(workflow: &ParsedWorkflow) -> String {
    CadenceGenerator::default().generate_transaction(workflow)
}

pub fn generate_transaction_with_details(
    workflow: &ParsedWorkflow,
    options: &GenerationOptions,
) -> CadenceGenerationResult {
    CadenceGenerator::default().generate_transaction_with_details(workflow, options)
}

pub fn generate_summary(workflow: &ParsedWorkflow) -> String {
    CadenceGenerator::default().generate_summary(workflow)
}

/// Template-driven generator.
#[derive(Debug, Clone)]
pub struct CadenceGenerator {
    templates: TemplateLibrary,
    /// Action types treated as having no template (e.g. metadata lookup failed).
    unavailable: HashSet<String>,
}

impl Default for CadenceGenerator {
    fn default() -> Self {
        Self::new(TemplateLibrary::builtin())
    }
}

/// One action's rendered code.
struct EmittedAction {
    lines: Vec<String>,
    outputs: Vec<(String, String, String)>,
}

/// Variable prefix per action id. Sanitizing can map distinct ids onto the
/// same identifier, so a later action whose names clash gets `_2`, `_3`, ...
#[derive(Debug, Default)]
struct VarScope {
    prefixes: HashMap<String, String>,
}

impl VarScope {
    fn prefix(&self, action_id: &str) -> String {
        self.prefixes
            .get(action_id)
            .cloned()
            .unwrap_or_else(|| action_prefix(action_id))
    }

    fn output(&self, action_id: &str, name: &str) -> String {
        scoped_var_name(&self.prefix(action_id), name)
    }

    fn local(&self, action_id: &str, name: &str) -> String {
        local_var_name(&self.prefix(action_id), name)
    }
}

impl CadenceGenerator {
    pub fn new(templates: TemplateLibrary) -> Self {
        CadenceGenerator {
            templates,
            unavailable: HashSet::new(),
        }
    }

    pub fn excluding<I, S>(mut self, action_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unavailable.extend(action_types.into_iter().map(Into::into));
        self
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    fn template_for(&self, action_type: &str) -> Option<&CodeTemplate> {
        if self.unavailable.contains(action_type) {
            return None;
        }
        self.templates.get(action_type)
    }

    /// Claim variable names in execution order. Actions without a template
    /// bind nothing and claim nothing.
    fn var_scope(&self, workflow: &ParsedWorkflow) -> VarScope {
        let mut scope = VarScope::default();
        let mut taken: HashSet<String> = HashSet::new();

        for action in workflow.ordered_actions() {
            let Some(template) = self.template_for(&action.action_type) else {
                continue;
            };
            let locals: BTreeSet<String> = template
                .body
                .iter()
                .chain(template.outputs.iter().map(|o| &o.expression))
                .flat_map(|text| template_locals(text))
                .collect();

            let base = action_prefix(&action.id);
            let mut prefix = base.clone();
            let mut suffix = 1;
            loop {
                let names: Vec<String> = template
                    .outputs
                    .iter()
                    .map(|o| scoped_var_name(&prefix, &o.name))
                    .chain(locals.iter().map(|l| local_var_name(&prefix, l)))
                    .collect();
                if names.iter().all(|n| !taken.contains(n)) {
                    taken.extend(names);
                    break;
                }
                suffix += 1;
                prefix = format!("{}_{}", base, suffix);
            }
            if suffix > 1 {
                log::debug!("variables of '{}' renamed to prefix '{}'", action.id, prefix);
            }
            scope.prefixes.insert(action.id.clone(), prefix);
        }

        scope
    }

    pub fn generate_transaction(&self, workflow: &ParsedWorkflow) -> String {
        self.generate_transaction_with_details(workflow, &GenerationOptions::default())
            .script
    }

    pub fn generate_transaction_with_details(
        &self,
        workflow: &ParsedWorkflow,
        options: &GenerationOptions,
    ) -> CadenceGenerationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if workflow.is_empty() {
            errors.push(CompilerError::codegen(
                "G004",
                "Workflow has no actions; nothing to generate",
                None,
            ));
            return CadenceGenerationResult {
                script: String::new(),
                success: false,
                fallback_used: false,
                errors,
                warnings,
            };
        }

        let mut success = true;
        if workflow.root_actions.is_empty() {
            success = false;
            errors.push(CompilerError::codegen(
                "G005",
                "Control flow has no root action; every action is part of a cycle",
                None,
            ));
        }

        let is_action = |id: &str| workflow.contains(id);
        let scope = self.var_scope(workflow);
        let mut bound: HashSet<String> = HashSet::new();
        let mut imports: Vec<&ImportDecl> = Vec::new();
        let mut entitlements: BTreeSet<&str> = BTreeSet::new();
        let mut emitted: Vec<(&ActionNode, Option<EmittedAction>)> = Vec::new();
        let mut fallback_used = false;

        for action in workflow.ordered_actions() {
            let Some(template) = self.template_for(&action.action_type) else {
                if options.enable_fallbacks {
                    fallback_used = true;
                    log::warn!("no template for '{}', emitting stub", action.action_type);
                    warnings.push(CompilerError::codegen(
                        "G002",
                        format!(
                            "No code template for action type '{}'; emitted a stub for '{}'",
                            action.action_type, action.id
                        ),
                        Some(action.id.clone()),
                    ));
                } else {
                    errors.push(CompilerError::codegen(
                        "G001",
                        format!(
                            "No code template for action type '{}' (action '{}')",
                            action.action_type, action.id
                        ),
                        Some(action.id.clone()),
                    ));
                }
                emitted.push((action, None));
                continue;
            };

            for decl in &template.imports {
                if !imports.iter().any(|i| i.contract == decl.contract) {
                    imports.push(decl);
                }
            }
            entitlements.extend(template.entitlements.iter().map(String::as_str));

            let emitted_action =
                emit_action(action, template, &is_action, &scope, &bound, &mut warnings);
            for (name, _, _) in &emitted_action.outputs {
                bound.insert(name.clone());
            }
            emitted.push((action, Some(emitted_action)));
        }

        let mut w = CodeWriter::new();
        for decl in &imports {
            w.line(&format!("import {} from {}", decl.contract, decl.address));
        }
        if !imports.is_empty() {
            w.blank();
        }

        w.block_open("transaction");
        let signer = if entitlements.is_empty() {
            "&Account".to_string()
        } else {
            format!(
                "auth({}) &Account",
                entitlements.into_iter().collect::<Vec<_>>().join(", ")
            )
        };
        w.block_open(&format!("prepare(signer: {})", signer));

        for (i, (action, code)) in emitted.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            match code {
                Some(code) => {
                    if options.include_comments {
                        w.comment(&format!(
                            "{}. {} ({})",
                            i + 1,
                            action.display_name(),
                            action.action_type
                        ));
                    }
                    for line in &code.lines {
                        w.line(line);
                    }
                    for (var, ty, expr) in &code.outputs {
                        w.line(&format!("let {}: {} = {}", var, ty, expr));
                    }
                }
                None => {
                    let tag = if options.enable_fallbacks { "[fallback] " } else { "" };
                    w.comment(&format!(
                        "{}{}. {} ({}): no code template available, action skipped",
                        tag,
                        i + 1,
                        action.display_name(),
                        action.action_type
                    ));
                }
            }
        }

        w.block_close();
        w.block_close();

        log::debug!(
            "generated script for {} actions ({} errors, {} warnings)",
            emitted.len(),
            errors.len(),
            warnings.len()
        );

        CadenceGenerationResult {
            script: w.finish(),
            success,
            fallback_used,
            errors,
            warnings,
        }
    }
}

fn emit_action(
    action: &ActionNode,
    template: &CodeTemplate,
    is_action: &dyn Fn(&str) -> bool,
    scope: &VarScope,
    bound: &HashSet<String>,
    warnings: &mut Vec<CompilerError>,
) -> EmittedAction {
    // (parameter, declared type, value text)
    let mut rejected: Vec<(String, String, String)> = Vec::new();
    let mut lookup = |key: &str| -> Option<String> {
        if let Some(local) = key.strip_prefix('$') {
            return Some(scope.local(&action.id, local));
        }
        let spec = template.parameter(key);
        let binding = action.binding(key);
        let value = ParameterValue::classify(binding.map(|b| &b.value), is_action);
        match value {
            ParameterValue::Reference(reference) => {
                Some(scope.output(&reference.action_id, &reference.output_name))
            }
            ParameterValue::Literal { value } => {
                let declared = spec
                    .map(|s| s.param_type.as_str())
                    .or(binding.map(|b| b.param_type.as_str()))
                    .unwrap_or("");
                Some(emit_literal(&value, declared).unwrap_or_else(|| {
                    rejected.push((key.to_string(), declared.to_string(), literal_text(&value)));
                    "nil".to_string()
                }))
            }
            ParameterValue::Unset => spec.and_then(|s| s.default.clone()),
        }
    };

    let mut missing: Vec<String> = Vec::new();
    let mut lines = Vec::with_capacity(template.body.len());
    for line in &template.body {
        let (text, unknown) = render_template(line, &mut lookup);
        missing.extend(unknown);
        lines.push(text);
    }
    let mut outputs = Vec::with_capacity(template.outputs.len());
    for out in &template.outputs {
        let (expr, unknown) = render_template(&out.expression, &mut lookup);
        missing.extend(unknown);
        outputs.push((
            scope.output(&action.id, &out.name),
            out.output_type.clone(),
            expr,
        ));
    }

    let mut reported = HashSet::new();
    for name in missing {
        if reported.insert(name.clone()) {
            warnings.push(
                CompilerError::codegen(
                    "G003",
                    format!(
                        "Parameter '{}' of action '{}' has no value; emitted nil",
                        name, action.id
                    ),
                    Some(action.id.clone()),
                )
                .on_parameter(name),
            );
        }
    }
    for (name, declared, text) in rejected {
        if reported.insert(name.clone()) {
            log::warn!("rejected literal for '{}.{}'", action.id, name);
            warnings.push(
                CompilerError::codegen(
                    "G007",
                    format!(
                        "Value '{}' of parameter '{}' on action '{}' is not a valid {}; emitted nil",
                        text, name, action.id, declared
                    ),
                    Some(action.id.clone()),
                )
                .on_parameter(name),
            );
        }
    }

    for binding in &action.parameters {
        let value = ParameterValue::classify(Some(&binding.value), is_action);
        if let ParameterValue::Reference(reference) = value {
            let var = scope.output(&reference.action_id, &reference.output_name);
            if !bound.contains(&var) {
                warnings.push(
                    CompilerError::codegen(
                        "G006",
                        format!(
                            "'{}' is not bound by any earlier action; '{}' is undefined here",
                            reference, var
                        ),
                        Some(action.id.clone()),
                    )
                    .on_parameter(binding.name.clone()),
                );
            }
        }
    }

    EmittedAction { lines, outputs }
}
