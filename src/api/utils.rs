//! API utility functions
//!
//! Pure, stateless helpers for request parsing and response headers.

use crate::api::error::ApiError;

/// Parses a task id path segment
pub fn parse_task_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::InvalidRequest(format!("invalid task id: {raw}")))
}

/// Content type of archive downloads
pub fn zip_mime() -> mime::Mime {
    "application/zip"
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Download link for a task's archive, absolute when `public_url` is set
pub fn archive_download_link(public_url: Option<&str>, task_id: u64) -> String {
    let path = format!("/api/archives/{task_id}/download");
    match public_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("0").unwrap(), 0);
        assert_eq!(parse_task_id("42").unwrap(), 42);
        assert!(parse_task_id("-1").is_err());
        assert!(parse_task_id("abc").is_err());
        assert!(parse_task_id("").is_err());
    }

    #[test]
    fn test_zip_mime() {
        assert_eq!(zip_mime().essence_str(), "application/zip");
    }

    #[test]
    fn test_archive_download_link() {
        assert_eq!(archive_download_link(None, 3), "/api/archives/3/download");
        assert_eq!(
            archive_download_link(Some("http://localhost:8080/"), 3),
            "http://localhost:8080/api/archives/3/download"
        );
    }
}
