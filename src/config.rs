//! Centralized configuration management for breeam-intake

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the criteria and upload endpoints
    pub backend_url: String,
    /// Directory for downloaded report documents
    pub download_dir: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "breeam-intake/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let backend_url = std::env::var("BREEAM_INTAKE_BACKEND_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

        let download_dir = std::env::var("BREEAM_INTAKE_DOWNLOAD_DIR")
            .unwrap_or_else(|_| "./downloads".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("BREEAM_INTAKE_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("BREEAM_INTAKE_USER_AGENT")
                .unwrap_or_else(|_| "breeam-intake/0.1.0".to_string()),
        };

        Ok(Config {
            backend_url,
            download_dir,
            http,
        })
    }

    /// Get download directory as string
    pub fn download_dir_str(&self) -> &str {
        self.download_dir.to_str().unwrap_or("./downloads")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Trailing slashes would double up when endpoint paths are appended
        if self.backend_url.ends_with('/') {
            return Err(anyhow::anyhow!(
                "Backend URL must not end with a slash: {}",
                self.backend_url
            ));
        }

        std::fs::create_dir_all(&self.download_dir).with_context(|| {
            format!(
                "Cannot create download directory: {}",
                self.download_dir.display()
            )
        })?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert_eq!(config.download_dir_str(), "./downloads");
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_validate_rejects_trailing_slash() {
        let config = Config {
            backend_url: "http://127.0.0.1:8000/".to_string(),
            download_dir: "./downloads".into(),
            http: HttpConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_creates_download_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            backend_url: "http://127.0.0.1:8000".to_string(),
            download_dir: temp_dir.path().join("reports"),
            http: HttpConfig::default(),
        };
        config.validate().unwrap();
        assert!(temp_dir.path().join("reports").exists());
    }
}
