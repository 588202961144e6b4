//! cmdsmith Control - CLI for template command synthesis
//!
//! Builds shell commands from the built-in templates, keeps a history of
//! generated commands and manages user preferences. Never runs a command.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use cmdsmith_common::Settings;
use commands::App;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings_path = commands::settings_path(cli.config.as_deref());
    let settings = Settings::load_from(&settings_path)?;
    init_logging(&settings.log.level);

    let app = App::open(settings, settings_path, cli.data_dir);

    match cli.command {
        Commands::List { category, search } => app.list(category.as_deref(), search.as_deref()),
        Commands::Show { id } => app.show(&id),
        Commands::Generate {
            id,
            set,
            strict,
            save,
            json,
        } => app.generate(&id, set, strict, save, json),
        Commands::History { clear, json } => app.history(clear, json),
        Commands::Config { action } => match action {
            ConfigCommands::Show => app.config_show(),
            ConfigCommands::Export => app.config_export(),
            ConfigCommands::Import { file } => app.config_import(&file),
            ConfigCommands::Reset => app.config_reset(),
            ConfigCommands::Favorite { id } => app.config_favorite(&id),
        },
        Commands::Lint { id } => app.lint(id.as_deref()),
    }
}

/// `RUST_LOG` wins over the settings file
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
