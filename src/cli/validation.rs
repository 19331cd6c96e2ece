//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use reqwest::Url;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{}': {}", path_str, e)),
    }
}

/// Validate the server base URL (http, https, ws or wss)
pub fn validate_server_url(url_str: &str) -> Result<String, String> {
    let url_str = url_str.trim();
    let url = Url::parse(url_str).map_err(|e| format!("Invalid URL '{}': {}", url_str, e))?;

    match url.scheme() {
        "http" | "https" | "ws" | "wss" => {}
        other => {
            return Err(format!(
                "Unsupported scheme '{}'. Use http, https, ws or wss",
                other
            ));
        }
    }

    if url.host_str().is_none() {
        return Err(format!("URL has no host: '{}'", url_str));
    }

    Ok(url_str.to_string())
}

/// Validate a Socket.IO namespace
pub fn validate_namespace(namespace: &str) -> Result<String, String> {
    let namespace = namespace.trim();

    if !namespace.starts_with('/') {
        return Err(format!("Namespace must start with '/', got '{}'", namespace));
    }

    if namespace.contains(',') || namespace.contains(' ') {
        return Err(format!(
            "Namespace cannot contain commas or spaces: '{}'",
            namespace
        ));
    }

    Ok(namespace.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_server_url_valid() {
        for url in [
            "http://localhost:3000",
            "https://review.example.com",
            "wss://review.example.com/api",
        ] {
            assert!(validate_server_url(url).is_ok(), "{} should be valid", url);
        }
    }

    #[test]
    fn test_server_url_invalid() {
        for url in ["", "localhost:3000", "ftp://review.example.com", "not a url"] {
            assert!(validate_server_url(url).is_err(), "{} should be invalid", url);
        }
    }

    #[test]
    fn test_namespace_validation() {
        assert_eq!(validate_namespace("/notifications").unwrap(), "/notifications");
        assert!(validate_namespace("notifications").is_err());
        assert!(validate_namespace("/a,b").is_err());
    }

    #[test]
    fn test_config_file_path_validation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[channel]").unwrap();
        let path = file.path().to_str().unwrap();
        assert!(validate_config_file_path(path).is_ok());

        assert!(validate_config_file_path("/nonexistent/review-notify.toml").is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
    }
}
