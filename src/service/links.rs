use crate::tasks::{Result, TaskError};

/// Reject empty links and anything that is not http(s).
pub fn validate_link(link: &str) -> Result<()> {
    if link.is_empty() {
        return Err(TaskError::Validation("link must not be empty".to_string()));
    }

    if !link.starts_with("http://") && !link.starts_with("https://") {
        return Err(TaskError::Validation(
            "link must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}
