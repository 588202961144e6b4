//! Template lint
//!
//! The engine silently passes unbound tokens through. This catches those and
//! related authoring mistakes before a template ships.

use crate::syntax::ParsedTemplate;
use crate::template::TemplateDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    pub template_id: String,
    pub severity: Severity,
    pub message: String,
}

impl LintIssue {
    fn error(template: &TemplateDefinition, message: String) -> Self {
        Self {
            template_id: template.id.clone(),
            severity: Severity::Error,
            message,
        }
    }

    fn warning(template: &TemplateDefinition, message: String) -> Self {
        Self {
            template_id: template.id.clone(),
            severity: Severity::Warning,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: [{}] {}", tag, self.template_id, self.message)
    }
}

/// Check one template
pub fn lint(template: &TemplateDefinition) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let parsed = ParsedTemplate::parse(&template.template_text);
    let referenced = parsed.referenced_names();

    let mut seen = HashSet::new();
    for spec in &template.inputs {
        if !seen.insert(spec.name.as_str()) {
            issues.push(LintIssue::error(
                template,
                format!("duplicate input '{}'", spec.name),
            ));
        }
    }

    for name in &referenced {
        if template.find_input(name).is_none() {
            issues.push(LintIssue::error(
                template,
                format!("token {{{}}} has no matching input", name),
            ));
        }
    }

    for spec in &template.inputs {
        if !referenced.contains(&spec.name.as_str()) {
            issues.push(LintIssue::warning(
                template,
                format!("input '{}' is never used in the template", spec.name),
            ));
        }

        if !spec.is_select() {
            continue;
        }

        if spec.choices.is_empty() {
            issues.push(LintIssue::error(
                template,
                format!("select input '{}' has no choices", spec.name),
            ));
        }

        if let Some(default) = &spec.default_value {
            if !spec.choices.is_empty() && !spec.choices.contains(default) {
                issues.push(LintIssue::warning(
                    template,
                    format!(
                        "default '{}' of '{}' is not one of its choices",
                        default, spec.name
                    ),
                ));
            }
        }
    }

    for cond in parsed.conditionals() {
        let Some(spec) = template.find_input(&cond.name) else {
            continue;
        };
        if !spec.is_select() || spec.choices.is_empty() {
            continue;
        }
        for branch in &cond.branches {
            if !spec.choices.contains(&branch.case) {
                issues.push(LintIssue::warning(
                    template,
                    format!(
                        "case '{}' in {{{}|...}} is not a choice of '{}'",
                        branch.case, cond.name, spec.name
                    ),
                ));
            }
        }
    }

    issues
}

/// Check a set of templates, including id uniqueness across the set
pub fn lint_all<'a, I>(templates: I) -> Vec<LintIssue>
where
    I: IntoIterator<Item = &'a TemplateDefinition>,
{
    let mut issues = Vec::new();
    let mut ids = HashSet::new();
    for template in templates {
        if !ids.insert(template.id.as_str()) {
            issues.push(LintIssue::error(
                template,
                format!("duplicate template id '{}'", template.id),
            ));
        }
        issues.extend(lint(template));
    }
    issues
}
