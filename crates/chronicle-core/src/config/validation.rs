//! Sanity checks on a loaded configuration

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Reject settings that would make generation fail later in a less
/// obvious way. The first offending field is reported.
pub fn validate_config(config: &Config) -> Result<()> {
    let checks: [(&str, bool, &str); 3] = [
        (
            "changelog.file",
            config.changelog.file.as_os_str().is_empty(),
            "file cannot be empty",
        ),
        (
            "changelog.tag_prefix",
            config.changelog.tag_prefix.chars().any(char::is_whitespace),
            "must not contain whitespace",
        ),
        ("git.remote", config.git.remote.trim().is_empty(), "remote cannot be empty"),
    ];

    if let Some((field, _, message)) = checks.iter().find(|(_, failed, _)| *failed) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        }
        .into());
    }

    debug!("configuration valid");
    Ok(())
}
