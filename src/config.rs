/// Configuration management for the ChezFlora admin client
use crate::error::{AdminError, AdminResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every route is joined onto (e.g. https://api.chezflora.com/api)
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where credentials are kept between runs; `None` keeps them in memory only
    pub file: Option<PathBuf>,
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                timeout_secs: 30,
                user_agent: default_user_agent(),
            },
            session: SessionConfig { file: None },
            export: ExportConfig {
                directory: PathBuf::from("."),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AdminResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> AdminResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CHEZFLORA_API_URL")
            .unwrap_or_else(|| "http://localhost:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = lookup("CHEZFLORA_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| AdminError::Config("Invalid HTTP timeout".to_string()))?;
        let user_agent = lookup("CHEZFLORA_USER_AGENT").unwrap_or_else(default_user_agent);

        let session_file = match lookup("CHEZFLORA_SESSION_FILE") {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::config_dir().map(|dir| dir.join("chezflora-admin").join("session.json")),
        };

        let export_directory = lookup("CHEZFLORA_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let config = ClientConfig {
            api: ApiConfig {
                base_url,
                timeout_secs,
                user_agent,
            },
            session: SessionConfig { file: session_file },
            export: ExportConfig {
                directory: export_directory,
            },
            logging: LoggingConfig { level: log_level },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> AdminResult<()> {
        let url = reqwest::Url::parse(&self.api.base_url)
            .map_err(|e| AdminError::Config(format!("Invalid API URL {}: {}", self.api.base_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AdminError::Config(format!(
                "API URL must use http or https, got {}",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(AdminError::Config("API URL has no host".to_string()));
        }

        if self.api.timeout_secs == 0 {
            return Err(AdminError::Config("HTTP timeout must be positive".to_string()));
        }

        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("chezflora-admin/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.user_agent.starts_with("chezflora-admin/"));
        assert_eq!(config.export.directory, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("CHEZFLORA_API_URL", "https://api.chezflora.com/api/"),
            ("CHEZFLORA_HTTP_TIMEOUT_SECS", "5"),
            ("CHEZFLORA_SESSION_FILE", "/tmp/session.json"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.chezflora.com/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.session.file, Some(PathBuf::from("/tmp/session.json")));
    }

    #[test]
    fn test_empty_session_file_disables_persistence() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("CHEZFLORA_SESSION_FILE", "")])).unwrap();
        assert!(config.session.file.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClientConfig::from_lookup(lookup_from(&[("CHEZFLORA_API_URL", "ftp://x")])).is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[("CHEZFLORA_API_URL", "not a url")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup_from(&[("CHEZFLORA_HTTP_TIMEOUT_SECS", "0")])).is_err()
        );
        assert!(
            ClientConfig::from_lookup(lookup_from(&[("CHEZFLORA_HTTP_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
