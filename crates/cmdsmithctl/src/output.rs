//! Output formatting - plain ASCII terminal output
//!
//! Generated commands go to stdout uncoloured so they can be piped or
//! copied; everything decorative is coloured.

use cmdsmith_common::lint::{LintIssue, Severity};
use cmdsmith_common::template::{DangerLevel, InputKind, TemplateDefinition};
use cmdsmith_common::{HistoryEntry, SynthesisResult};
use owo_colors::OwoColorize;

pub fn danger_tag(level: DangerLevel) -> String {
    match level {
        DangerLevel::Safe => "[safe]".bright_green().to_string(),
        DangerLevel::Caution => "[caution]".yellow().to_string(),
        DangerLevel::Dangerous => "[dangerous]".bright_red().to_string(),
    }
}

/// One line per template: marker, id, category, danger, name
pub fn display_template_row(template: &TemplateDefinition, favorite: bool) {
    let marker = if favorite { "*" } else { " " };
    println!(
        "{} {:<26} {:<12} {:<20} {}",
        marker.yellow(),
        template.id.bold(),
        template.category.dimmed(),
        danger_tag(template.danger_level),
        template.name
    );
}

pub fn display_template(template: &TemplateDefinition) {
    println!("{}  {}", template.name.bold(), danger_tag(template.danger_level));
    println!("  id:        {}", template.id);
    println!("  category:  {}", template.category);
    if !template.description.is_empty() {
        println!("  {}", template.description);
    }
    println!();
    println!("[TEMPLATE]");
    println!("  {}", template.template_text.cyan());

    if !template.inputs.is_empty() {
        println!();
        println!("[INPUTS]");
        for spec in &template.inputs {
            let kind = match spec.kind {
                InputKind::Text => "text",
                InputKind::Textarea => "textarea",
                InputKind::Select => "select",
            };
            let required = if spec.required { " required" } else { "" };
            println!("  {} ({}{}) - {}", spec.name.bold(), kind, required, spec.label);
            if let Some(default) = &spec.default_value {
                println!("      default:   {}", default);
            }
            if !spec.choices.is_empty() {
                println!("      choices:   {}", spec.choices.join(", "));
            }
            if let Some(validator) = &spec.validator {
                println!("      validator: {}", validator);
            }
            if let Some(help) = &spec.help_text {
                println!("      {}", help.dimmed());
            }
        }
    }

    if !template.examples.is_empty() {
        println!();
        println!("[EXAMPLES]");
        for example in &template.examples {
            println!("  $ {}", example);
        }
    }

    if !template.notes.is_empty() {
        println!();
        println!("[NOTES]");
        for note in &template.notes {
            println!("  * {}", note);
        }
    }
}

/// Command on stdout, problems on stderr
pub fn display_result(result: &SynthesisResult) {
    println!("{}", result.command_text);
    for error in &result.errors {
        eprintln!("{} {}", "[INVALID]".bright_red(), error);
    }
}

pub fn display_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No saved commands.");
        return;
    }
    for entry in entries {
        let status = if entry.valid {
            "[OK]".bright_green().to_string()
        } else {
            "[INVALID]".bright_red().to_string()
        };
        println!(
            "{} {} {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            status,
            entry.template_id.bold()
        );
        println!("    {}", entry.command_text);
    }
}

pub fn display_lint_issue(issue: &LintIssue) {
    match issue.severity {
        Severity::Error => eprintln!("{}", issue.to_string().bright_red()),
        Severity::Warning => eprintln!("{}", issue.to_string().yellow()),
    }
}
