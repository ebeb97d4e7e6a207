use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Data store URL is not empty
/// - Tool program is not empty
/// - Workspace directory is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.datastore.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "datastore.url cannot be empty".to_string(),
        ));
    }

    if config.tool.program.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "tool.program cannot be empty".to_string(),
        ));
    }

    if config.workspace.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "workspace.dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
