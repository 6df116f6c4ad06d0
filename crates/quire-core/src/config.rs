//! Configuration for the quire backend
//!
//! All sections have working defaults so a fresh checkout runs without a
//! config file; deployments override via a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuireError, Result};

/// System-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    /// Journal identity and DOI namespace
    pub journal: JournalConfig,
    /// Server binding and storage
    pub server: ServerConfig,
    /// SMTP settings; notifications are dropped when absent
    pub smtp: Option<SmtpConfig>,
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            journal: JournalConfig::default(),
            server: ServerConfig::default(),
            smtp: None,
        }
    }
}

impl QuireConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| QuireError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        toml::from_str(&text).map_err(|e| QuireError::Config(e.to_string()))
    }

    /// Load from a file if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if path.as_ref().exists() {
            Self::load(path.as_ref()).unwrap_or_else(|e| {
                tracing::warn!("failed to load config: {}, using defaults", e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Journal identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Display name of the journal
    pub name: String,
    /// Short code used inside DOI slugs
    pub journal_code: String,
    /// DOI prefix assigned by the registrar
    pub doi_prefix: String,
    /// Public site base URL, used for notification links
    pub public_base_url: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            name: "Journal of Applied and Experimental Publishing Demo".to_string(),
            journal_code: "jaepd".to_string(),
            doi_prefix: "10.9999".to_string(),
            public_base_url: "https://journal.example.com".to_string(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP server
    pub bind_addr: String,
    /// Path to the SQLite database file
    pub db_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            db_path: "quire.db".to_string(),
        }
    }
}

/// SMTP transport settings for notification email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub starttls: bool,
    pub from_email: String,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuireConfig::default();
        assert_eq!(config.journal.journal_code, "jaepd");
        assert_eq!(config.journal.doi_prefix, "10.9999");
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.toml");
        std::fs::write(
            &path,
            r#"
[journal]
journal_code = "abcd"

[server]
bind_addr = "0.0.0.0:9000"
"#,
        )
        .unwrap();

        let config = QuireConfig::load(&path).unwrap();
        assert_eq!(config.journal.journal_code, "abcd");
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        // Unspecified fields fall back to defaults
        assert_eq!(config.journal.doi_prefix, "10.9999");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = QuireConfig::load_or_default("/nonexistent/quire.toml");
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    }
}
