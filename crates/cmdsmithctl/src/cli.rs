//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cmdsmith command synthesis CLI
#[derive(Parser)]
#[command(name = "cmdsmithctl")]
#[command(about = "Build safe shell commands from administration templates", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Settings file (overrides $CMDSMITH_CONFIG and defaults)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for history and preferences (overrides settings)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List available templates
    List {
        /// Only templates in this category
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive search over id, name and description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a template's inputs, examples and notes
    Show {
        /// Template id
        id: String,
    },

    /// Synthesize a command from a template
    Generate {
        /// Template id
        id: String,

        /// Input value (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Report tokens without a matching input as errors
        #[arg(long)]
        strict: bool,

        /// Save the result to history even when invalid or auto-save is off
        #[arg(long)]
        save: bool,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show or clear command history
    History {
        /// Remove all saved commands
        #[arg(long)]
        clear: bool,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Manage user preferences and system config
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Check templates for authoring mistakes
    Lint {
        /// Template id (all templates when omitted)
        id: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current settings, preferences and system config
    Show,

    /// Print preferences and system config as JSON
    Export,

    /// Merge an exported JSON document
    Import {
        /// File produced by `config export`
        file: PathBuf,
    },

    /// Restore default preferences and system config
    Reset,

    /// Add or remove a template from favorites
    Favorite {
        /// Template id
        id: String,
    },
}

/// Parse `NAME=VALUE`; the value may itself contain `=`
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("missing input name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}
