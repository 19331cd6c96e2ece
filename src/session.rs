//! Session credential handling.
//!
//! The bearer token is read once when the channel is built. The channel does
//! not react to the token changing afterwards.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};

/// Opaque bearer token
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank tokens
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Anything able to produce the session credential
pub trait CredentialSource: Send + Sync {
    /// `Ok(None)` when no session exists
    fn load(&self) -> AppResult<Option<Credential>>;
}

#[derive(Deserialize)]
struct PersistedSession {
    token: Option<String>,
}

/// Reads the credential from configuration or a persisted session file
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl SessionStore {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            token: config.token.clone(),
            token_file: config.token_file.as_ref().map(PathBuf::from),
        }
    }

    fn read_file(&self, path: &Path) -> AppResult<Option<Credential>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No persisted session file");
                return Ok(None);
            }
            Err(e) => {
                return Err(AppError::Configuration {
                    key: "session.token_file".to_string(),
                    source: anyhow::Error::new(e)
                        .context(format!("Failed to read {}", path.display())),
                });
            }
        };

        let trimmed = content.trim();
        if trimmed.starts_with('{') {
            let session: PersistedSession =
                serde_json::from_str(trimmed).map_err(|e| AppError::Configuration {
                    key: "session.token_file".to_string(),
                    source: anyhow::Error::new(e)
                        .context(format!("Invalid session file {}", path.display())),
                })?;
            return Ok(session.token.and_then(Credential::new));
        }

        Ok(Credential::new(trimmed))
    }
}

impl CredentialSource for SessionStore {
    fn load(&self) -> AppResult<Option<Credential>> {
        if let Some(credential) = self.token.clone().and_then(Credential::new) {
            return Ok(Some(credential));
        }
        match &self.token_file {
            Some(path) => self.read_file(path),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_with_file(content: &str) -> (SessionStore, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let store = SessionStore::from_config(&SessionConfig {
            token: None,
            token_file: Some(file.path().to_string_lossy().into_owned()),
        });
        (store, file)
    }

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" abc ").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("secret-token").unwrap();
        assert!(!format!("{:?}", credential).contains("secret"));
    }

    #[test]
    fn test_no_session_configured() {
        let store = SessionStore::default();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_inline_token_wins() {
        let (mut store, _file) = store_with_file("from-file");
        store.token = Some("inline".to_string());
        assert_eq!(store.load().unwrap().unwrap().expose(), "inline");
    }

    #[test]
    fn test_json_session_file() {
        let (store, _file) = store_with_file(r#"{"token":"jwt-abc","user":{"id":1}}"#);
        assert_eq!(store.load().unwrap().unwrap().expose(), "jwt-abc");
    }

    #[test]
    fn test_json_session_without_token() {
        let (store, _file) = store_with_file(r#"{"user":null}"#);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_plain_text_session_file() {
        let (store, _file) = store_with_file("plain-token\n");
        assert_eq!(store.load().unwrap().unwrap().expose(), "plain-token");
    }

    #[test]
    fn test_missing_file_means_no_session() {
        let store = SessionStore::from_config(&SessionConfig {
            token: None,
            token_file: Some("/nonexistent/review-notify/session.json".to_string()),
        });
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_broken_json_is_an_error() {
        let (store, _file) = store_with_file("{not json");
        assert!(matches!(
            store.load().unwrap_err(),
            AppError::Configuration { ref key, .. } if key == "session.token_file"
        ));
    }
}
