//! Shared command context, error types, and document file helpers.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use anyhow::{Context, anyhow};
use mctl_config::{FileProjectStore, Notice};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Validation error listing every notice on its own line.
    pub(crate) fn rejected(notices: &[Notice]) -> Self {
        let lines: Vec<String> = notices.iter().map(ToString::to_string).collect();
        Self::Validation(lines.join("\n"))
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) store: FileProjectStore,
    pub(crate) output: OutputFormat,
}

pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    serde_json::from_str(&payload).map_err(|err| {
        CliError::failure(anyhow!(
            "{} is not a valid configuration document: {err}",
            path.display()
        ))
    })
}

pub(crate) fn write_document<T: Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let text = to_pretty_json(value)?;
    std::fs::write(path, format!("{text}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
        .map_err(CliError::failure)
}

pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
