//! Synthesis engine - merges input values into a template
//!
//! Validation and substitution are independent: every input is validated in
//! declaration order, and the command is rendered in one pass over the parsed
//! segments regardless of the outcome. Callers always get a best-effort
//! command next to the error list.
//!
//! Rendering rules:
//! - `{name}` of a select input is inserted raw, any other input is shell-escaped
//! - `{name|case:text|...}` compares the raw value, inserts branch text as-is and
//!   resolves nested `{other}` references with the rule above
//! - tokens naming no input are emitted verbatim

use crate::shell::escape_shell_arg;
use crate::syntax::{BranchPart, ParsedTemplate, Segment};
use crate::template::{InputSpec, TemplateDefinition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of one synthesis call; persisted verbatim as a history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisResult {
    pub command_text: String,
    /// Exactly `errors.is_empty()`
    pub valid: bool,
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub template_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateOptions {
    /// Report tokens that name no input as errors
    pub strict: bool,
}

impl GenerateOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// A template parsed once, reusable across many calls
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    definition: TemplateDefinition,
    parsed: ParsedTemplate,
}

impl CompiledTemplate {
    pub fn new(definition: TemplateDefinition) -> Self {
        let parsed = ParsedTemplate::parse(&definition.template_text);
        Self { definition, parsed }
    }

    pub fn definition(&self) -> &TemplateDefinition {
        &self.definition
    }

    pub fn parsed(&self) -> &ParsedTemplate {
        &self.parsed
    }

    pub fn generate(&self, inputs: &HashMap<String, String>) -> SynthesisResult {
        synthesize(&self.definition, &self.parsed, inputs, GenerateOptions::default())
    }

    pub fn generate_with(
        &self,
        inputs: &HashMap<String, String>,
        options: GenerateOptions,
    ) -> SynthesisResult {
        synthesize(&self.definition, &self.parsed, inputs, options)
    }
}

/// Synthesize a command from `template` and raw `inputs`
pub fn generate(template: &TemplateDefinition, inputs: &HashMap<String, String>) -> SynthesisResult {
    generate_with(template, inputs, GenerateOptions::default())
}

pub fn generate_with(
    template: &TemplateDefinition,
    inputs: &HashMap<String, String>,
    options: GenerateOptions,
) -> SynthesisResult {
    let parsed = ParsedTemplate::parse(&template.template_text);
    synthesize(template, &parsed, inputs, options)
}

fn synthesize(
    template: &TemplateDefinition,
    parsed: &ParsedTemplate,
    inputs: &HashMap<String, String>,
    options: GenerateOptions,
) -> SynthesisResult {
    let mut errors = validate_inputs(template, inputs);

    let specs: HashMap<&str, &InputSpec> = template
        .inputs
        .iter()
        .map(|spec| (spec.name.as_str(), spec))
        .collect();

    let command_text = render(parsed, &specs, inputs);

    if options.strict {
        for name in parsed.referenced_names() {
            if !specs.contains_key(name) {
                errors.push(format!("Unresolved token {{{}}}", name));
            }
        }
    }

    debug!(
        "Synthesized '{}' with {} validation error(s)",
        template.id,
        errors.len()
    );

    SynthesisResult {
        command_text,
        valid: errors.is_empty(),
        errors,
        created_at: Utc::now(),
        template_id: template.id.clone(),
    }
}

/// Per-field validation in declaration order
fn validate_inputs(template: &TemplateDefinition, inputs: &HashMap<String, String>) -> Vec<String> {
    let mut errors = Vec::new();

    for spec in &template.inputs {
        let value = spec.value_from(inputs);
        let blank = value.trim().is_empty();

        if spec.required && blank {
            errors.push(format!("{} is required", spec.label));
            continue;
        }

        if let (Some(validator), false) = (&spec.validator, blank) {
            let verdict = validator.validate(value);
            if let (false, Some(message)) = (verdict.valid, verdict.message) {
                errors.push(format!("{}: {}", spec.label, message));
            }
        }
    }

    errors
}

fn render(
    parsed: &ParsedTemplate,
    specs: &HashMap<&str, &InputSpec>,
    inputs: &HashMap<String, String>,
) -> String {
    let mut out = String::new();

    for segment in parsed.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Simple(name) => push_reference(&mut out, name, specs, inputs),
            Segment::Conditional(cond) => match specs.get(cond.name.as_str()) {
                Some(spec) => {
                    for part in cond.select(spec.value_from(inputs)) {
                        match part {
                            BranchPart::Text(text) => out.push_str(text),
                            BranchPart::Ref(name) => push_reference(&mut out, name, specs, inputs),
                        }
                    }
                }
                None => out.push_str(&cond.raw),
            },
        }
    }

    out
}

fn push_reference(
    out: &mut String,
    name: &str,
    specs: &HashMap<&str, &InputSpec>,
    inputs: &HashMap<String, String>,
) {
    match specs.get(name) {
        Some(spec) => out.push_str(&substitution(spec, inputs)),
        None => {
            out.push('{');
            out.push_str(name);
            out.push('}');
        }
    }
}

/// Text inserted for a simple reference to `spec`
fn substitution<'a>(spec: &'a InputSpec, inputs: &'a HashMap<String, String>) -> Cow<'a, str> {
    let value = spec.value_from(inputs);
    if spec.is_select() {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(escape_shell_arg(value))
    }
}
