//! Error types for cmdsmith.
//!
//! Synthesis never fails; these cover lookup and I/O failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdsmithError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CmdsmithError>;
