//! Template model - declarative command definitions
//!
//! A template is an id, an ordered list of typed inputs and a command string
//! written in the template language (see `syntax`). Templates are immutable
//! data; the engine never mutates them.

use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How an input is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Textarea,
    /// Enumerated choice; values come from a closed, author-controlled list
    Select,
}

/// Risk classification shown next to a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    #[default]
    Safe,
    Caution,
    #[serde(alias = "high")]
    Dangerous,
}

impl DangerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DangerLevel::Safe => "safe",
            DangerLevel::Caution => "caution",
            DangerLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    /// Map key and token name (`{name}`)
    pub name: String,

    /// Display text, also used in error messages
    pub label: String,

    #[serde(default)]
    pub kind: InputKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Allowed values for `InputKind::Select`, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl InputSpec {
    fn new(name: &str, label: &str, kind: InputKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default_value: None,
            required: false,
            choices: Vec::new(),
            validator: None,
            placeholder: None,
            help_text: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, InputKind::Text)
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(name, label, InputKind::Textarea)
    }

    pub fn select(name: &str, label: &str, choices: &[&str]) -> Self {
        let mut spec = Self::new(name, label, InputKind::Select);
        spec.choices = choices.iter().map(|c| c.to_string()).collect();
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn help(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }

    pub fn is_select(&self) -> bool {
        self.kind == InputKind::Select
    }

    /// Bound value: explicit input, then default, then empty
    pub fn value_from<'a>(&'a self, inputs: &'a HashMap<String, String>) -> &'a str {
        inputs
            .get(&self.name)
            .map(String::as_str)
            .or(self.default_value.as_deref())
            .unwrap_or("")
    }
}

/// A named, parameterized command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub danger_level: DangerLevel,
    /// Collection order; also the order of validation messages
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    pub template_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl TemplateDefinition {
    pub fn new(id: &str, name: &str, category: &str, template_text: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            danger_level: DangerLevel::Safe,
            inputs: Vec::new(),
            template_text: template_text.to_string(),
            examples: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn danger(mut self, level: DangerLevel) -> Self {
        self.danger_level = level;
        self
    }

    pub fn input(mut self, spec: InputSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.examples.push(example.to_string());
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.notes.push(note.to_string());
        self
    }

    /// Look up an input by name
    pub fn find_input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.name == name)
    }
}
