//! Command handlers for cmdsmithctl

use crate::output;
use anyhow::{bail, Context, Result};
use cmdsmith_common::engine::{generate_with, GenerateOptions};
use cmdsmith_common::lint::{lint, lint_all, LintIssue, Severity};
use cmdsmith_common::template::{DangerLevel, TemplateDefinition};
use cmdsmith_common::{
    config, Catalog, CmdsmithError, FileStore, HistoryStore, PreferenceStore, Settings,
};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a command needs, opened once per invocation
pub struct App {
    settings: Settings,
    settings_path: PathBuf,
    catalog: Catalog,
    history: HistoryStore,
    prefs: PreferenceStore,
}

impl App {
    pub fn open(settings: Settings, settings_path: PathBuf, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| settings.store.data_dir.clone());
        info!("Using data directory {}", data_dir.display());

        let store = Arc::new(FileStore::new(data_dir));
        let prefs = PreferenceStore::new(store.clone());
        let capacity = settings
            .engine
            .history_capacity
            .unwrap_or_else(|| prefs.preferences().command_history_limit);
        let history = HistoryStore::with_capacity(store, capacity);

        let catalog = Catalog::builtin();
        info!("Loaded {} templates", catalog.len());

        Self {
            settings,
            settings_path,
            catalog,
            history,
            prefs,
        }
    }

    fn template(&self, id: &str) -> Result<&TemplateDefinition> {
        self.catalog
            .get(id)
            .ok_or_else(|| CmdsmithError::UnknownTemplate(id.to_string()).into())
    }

    /// Execute `cmdsmithctl list`
    pub fn list(&self, category: Option<&str>, search: Option<&str>) -> Result<ExitCode> {
        let favorites = self.prefs.preferences().favorite_utilities;

        let mut templates: Vec<&TemplateDefinition> = match search {
            Some(query) => self.catalog.search(query),
            None => self.catalog.list().iter().collect(),
        };
        if let Some(category) = category {
            templates.retain(|t| t.category == category);
        }

        for template in &templates {
            output::display_template_row(template, favorites.contains(&template.id));
        }

        if templates.is_empty() {
            println!("No matching templates.");
            if category.is_some() {
                println!("Categories: {}", self.catalog.categories().join(", "));
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl show ID`
    pub fn show(&self, id: &str) -> Result<ExitCode> {
        output::display_template(self.template(id)?);
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl generate ID`; exits 1 when the result is invalid
    pub fn generate(
        &self,
        id: &str,
        assignments: Vec<(String, String)>,
        strict: bool,
        save: bool,
        json: bool,
    ) -> Result<ExitCode> {
        let template = self.template(id)?;
        let prefs = self.prefs.preferences();

        for (name, _) in &assignments {
            if template.find_input(name).is_none() {
                warn!("Template '{}' has no input named '{}'", id, name);
            }
        }
        let mut inputs: HashMap<String, String> = assignments.into_iter().collect();
        prefs.apply_defaults(template, &mut inputs);

        let options = GenerateOptions {
            strict: strict || self.settings.engine.strict,
        };
        let result = generate_with(template, &inputs, options);

        if prefs.show_danger_warnings && !json && template.danger_level != DangerLevel::Safe {
            eprintln!(
                "{} {} - review before running",
                output::danger_tag(template.danger_level),
                template.name
            );
        }

        if save || (prefs.auto_save_history && result.valid) {
            if let Err(e) = self.history.append(result.clone()) {
                eprintln!("{} could not save to history: {}", "[WARNING]".yellow(), e);
            }
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            output::display_result(&result);
        }

        Ok(if result.valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    /// Execute `cmdsmithctl history`
    pub fn history(&self, clear: bool, json: bool) -> Result<ExitCode> {
        if clear {
            self.history.clear().context("failed to clear history")?;
            println!("History cleared.");
            return Ok(ExitCode::SUCCESS);
        }

        let entries = self.history.list();
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            output::display_history(&entries);
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl config show`
    pub fn config_show(&self) -> Result<ExitCode> {
        println!("cmdsmith configuration");
        println!("======================");
        println!();
        if self.settings_path.exists() {
            println!("Settings file:    {}", self.settings_path.display());
        } else {
            println!(
                "Settings file:    {} (using defaults)",
                self.settings_path.display()
            );
        }
        println!("History capacity: {}", self.history.capacity());
        println!("Strict mode:      {}", self.settings.engine.strict);
        println!();
        println!("{}", self.prefs.export_config());
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl config export`
    pub fn config_export(&self) -> Result<ExitCode> {
        println!("{}", self.prefs.export_config());
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl config import FILE`
    pub fn config_import(&self, file: &Path) -> Result<ExitCode> {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        if !self.prefs.import_config(&text) {
            bail!(
                "{} is not a valid configuration export; nothing was changed",
                file.display()
            );
        }
        println!("Imported configuration from {}", file.display());
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl config reset`
    pub fn config_reset(&self) -> Result<ExitCode> {
        self.prefs
            .reset_to_defaults()
            .context("failed to reset configuration")?;
        println!("Preferences and system config reset to defaults.");
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl config favorite ID`
    pub fn config_favorite(&self, id: &str) -> Result<ExitCode> {
        self.template(id)?;
        if self.prefs.toggle_favorite(id)? {
            println!("Added {} to favorites.", id);
        } else {
            println!("Removed {} from favorites.", id);
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Execute `cmdsmithctl lint [ID]`; exits 1 when any error is found
    pub fn lint(&self, id: Option<&str>) -> Result<ExitCode> {
        let (checked, issues): (usize, Vec<LintIssue>) = match id {
            Some(id) => (1, lint(self.template(id)?)),
            None => (self.catalog.len(), lint_all(self.catalog.list())),
        };

        for issue in &issues {
            output::display_lint_issue(issue);
        }

        let errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        println!(
            "{} template(s) checked, {} error(s), {} warning(s)",
            checked,
            errors,
            issues.len() - errors
        );

        Ok(if errors == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Settings file location for this invocation
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config::config_path)
}
