//! Validation helpers for project metadata.

use crate::error::{ConfigError, ConfigResult};
use crate::model::ProjectConfig;

/// Ensure a project name is non-empty after trimming.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the name is blank.
pub fn validate_project_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "project".to_string(),
            field: "name".to_string(),
            value: Some(name.to_string()),
            reason: "must not be empty",
        });
    }
    Ok(())
}

/// Ensure a project identifier is non-empty and limited to `[a-z0-9-]`.
///
/// Identifiers double as store file names, so anything else is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the identifier is malformed.
pub fn validate_project_id(id: &str) -> ConfigResult<()> {
    if id.is_empty() {
        return Err(invalid_id(id, "must not be empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid_id(
            id,
            "must contain only lowercase letters, digits, and '-'",
        ));
    }
    Ok(())
}

/// Check the metadata a store needs before writing a project.
///
/// # Errors
///
/// Returns the first invalid field encountered.
pub fn ensure_persistable<R>(config: &ProjectConfig<R>) -> ConfigResult<()> {
    validate_project_id(config.id())?;
    validate_project_name(config.name())
}

fn invalid_id(id: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        section: "project".to_string(),
        field: "id".to_string(),
        value: Some(id.to_string()),
        reason,
    }
}
