use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error("allowed_extensions must contain at least one entry")]
    NoAllowedExtensions,

    #[error("allowed_extensions contains an empty entry")]
    EmptyExtension,

    #[error("files_dir and archives_dir must differ: {0}")]
    SharedStorageDir(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_downloads(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    non_zero("server.request_timeout_secs", config.server.request_timeout_secs)?;
    Ok(())
}

fn validate_downloads(config: &Config) -> Result<(), ValidationError> {
    let downloads = &config.downloads;

    non_zero("downloads.max_open_tasks", downloads.max_open_tasks as u64)?;
    non_zero("downloads.max_in_flight", downloads.max_in_flight as u64)?;
    non_zero("downloads.connect_timeout_secs", downloads.connect_timeout_secs)?;

    if downloads.allowed_extensions.is_empty() {
        return Err(ValidationError::NoAllowedExtensions);
    }

    // An empty suffix would match every link
    if downloads.allowed_extensions.iter().any(|ext| ext.is_empty()) {
        return Err(ValidationError::EmptyExtension);
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.files_dir == config.storage.archives_dir {
        return Err(ValidationError::SharedStorageDir(
            config.storage.files_dir.display().to_string(),
        ));
    }

    Ok(())
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroLimit { field });
    }
    Ok(())
}
