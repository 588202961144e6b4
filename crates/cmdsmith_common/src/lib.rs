//! cmdsmith common - template command synthesis
//!
//! Parametric command templates, input validation, shell-safe substitution,
//! plus the persisted command history and user preferences.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod lint;
pub mod preferences;
pub mod shell;
pub mod store;
pub mod syntax;
pub mod template;
pub mod validator;

pub use catalog::Catalog;
pub use config::Settings;
pub use engine::{generate, generate_with, CompiledTemplate, GenerateOptions, SynthesisResult};
pub use error::{CmdsmithError, Result};
pub use history::{HistoryEntry, HistoryStore};
pub use lint::{lint, lint_all, LintIssue, Severity};
pub use preferences::{PreferenceStore, SystemConfig, UserPreferences};
pub use shell::escape_shell_arg;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use template::{DangerLevel, InputKind, InputSpec, TemplateDefinition};
pub use validator::{Validator, Verdict};
