//! Validator set for template inputs
//!
//! Each check is a pure function `&str -> Verdict`. Inputs carry a `Validator`
//! value rather than an opaque closure so rules can be serialized, listed by
//! the CLI and linted. `Validator::Custom` keeps the door open for injected
//! predicates.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pseudo-filesystem roots that are refused as command targets
pub const DENIED_ROOTS: &[&str] = &["/dev", "/proc", "/sys"];

/// Outcome of a single validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Verdict {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Path must be absolute and outside the pseudo-filesystems
pub fn validate_path(path: &str) -> Verdict {
    if path.trim().is_empty() {
        return Verdict::invalid("Path cannot be empty");
    }

    if !path.starts_with('/') {
        return Verdict::invalid("Path must be absolute (start with /)");
    }

    if DENIED_ROOTS.iter().any(|root| path.starts_with(root)) {
        return Verdict::invalid("This path may contain system files that could cause issues");
    }

    Verdict::ok()
}

/// File name glob: no traversal, no separators
pub fn validate_pattern(pattern: &str) -> Verdict {
    if pattern.trim().is_empty() {
        return Verdict::invalid("Pattern cannot be empty");
    }

    if pattern.contains("..") || pattern.contains('/') {
        return Verdict::invalid("Pattern should not contain path traversal characters");
    }

    Verdict::ok()
}

/// Integer within `[min, max]` inclusive
pub fn validate_number(value: &str, min: i64, max: i64) -> Verdict {
    let num = match value.trim().parse::<i64>() {
        Ok(n) => n,
        Err(_) => return Verdict::invalid("Must be a valid number"),
    };

    if num < min || num > max {
        return Verdict::invalid(format!("Must be between {} and {}", min, max));
    }

    Verdict::ok()
}

/// Service/unit style identifier: letters, digits, `-` and `_`
pub fn validate_identifier(name: &str) -> Verdict {
    if name.trim().is_empty() {
        return Verdict::invalid("Service name cannot be empty");
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Verdict::invalid(
            "Service name can only contain letters, numbers, hyphens, and underscores",
        );
    }

    Verdict::ok()
}

/// Search keyword without quote characters
pub fn validate_keyword(keyword: &str) -> Verdict {
    if keyword.trim().is_empty() {
        return Verdict::invalid("Search keyword cannot be empty");
    }

    if keyword.contains('"') || keyword.contains('\'') {
        return Verdict::invalid("Keyword should not contain quotes");
    }

    Verdict::ok()
}

/// Injected predicate for rules the built-in kinds cannot express
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    check: Arc<dyn Fn(&str) -> Verdict + Send + Sync>,
}

impl CustomValidator {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Validation rule attached to an input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Absolute path outside the denied roots
    Path,
    /// File name pattern
    Pattern,
    /// Integer range, inclusive
    NumberRange { min: i64, max: i64 },
    /// Letters, digits, hyphen, underscore
    Identifier,
    /// Free text without quotes
    Keyword,
    /// Non-blank with a field specific message
    NotBlank { message: String },
    /// Fixed shape check, e.g. `^[A-Z]{3}$`
    Regex { pattern: String, message: String },
    #[serde(skip)]
    Custom(CustomValidator),
}

impl Validator {
    pub fn number_range(min: i64, max: i64) -> Self {
        Validator::NumberRange { min, max }
    }

    pub fn not_blank(message: impl Into<String>) -> Self {
        Validator::NotBlank {
            message: message.into(),
        }
    }

    pub fn regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Validator::Regex {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Verdict + Send + Sync + 'static,
    {
        Validator::Custom(CustomValidator {
            name: name.into(),
            check: Arc::new(check),
        })
    }

    /// Run the rule against a raw value
    pub fn validate(&self, value: &str) -> Verdict {
        match self {
            Validator::Path => validate_path(value),
            Validator::Pattern => validate_pattern(value),
            Validator::NumberRange { min, max } => validate_number(value, *min, *max),
            Validator::Identifier => validate_identifier(value),
            Validator::Keyword => validate_keyword(value),
            Validator::NotBlank { message } => {
                if value.trim().is_empty() {
                    Verdict::invalid(message.clone())
                } else {
                    Verdict::ok()
                }
            }
            Validator::Regex { pattern, message } => match Regex::new(pattern) {
                Ok(re) if re.is_match(value) => Verdict::ok(),
                Ok(_) => Verdict::invalid(message.clone()),
                Err(e) => Verdict::invalid(format!("Invalid validation pattern '{}': {}", pattern, e)),
            },
            Validator::Custom(custom) => (custom.check)(value),
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Path => write!(f, "absolute path"),
            Validator::Pattern => write!(f, "file name pattern"),
            Validator::NumberRange { min, max } => write!(f, "integer {}-{}", min, max),
            Validator::Identifier => write!(f, "identifier"),
            Validator::Keyword => write!(f, "keyword without quotes"),
            Validator::NotBlank { .. } => write!(f, "non-empty"),
            Validator::Regex { pattern, .. } => write!(f, "matches {}", pattern),
            Validator::Custom(custom) => write!(f, "custom ({})", custom.name),
        }
    }
}
