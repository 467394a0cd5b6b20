//! Configuration validation utilities.

use herald_framework::RouterConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{HeraldConfig, LogFormat, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_router_config(&config.router)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates router settings.
fn validate_router_config(router: &RouterConfig) -> ConfigResult<()> {
    if router.command_prefix.is_empty() {
        return Err(ConfigError::validation("Command prefix cannot be empty"));
    }

    if router.command_prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Command prefix cannot contain whitespace: {:?}",
            router.command_prefix
        )));
    }

    if let Some(lang) = &router.error_code_block
        && lang.trim().is_empty()
    {
        return Err(ConfigError::validation(
            "Error code block language cannot be empty; omit it for plain replies",
        ));
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    Ok(())
}
