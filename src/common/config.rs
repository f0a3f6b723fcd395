//! Configuration file handling

use serde::Deserialize;

use super::paths::config_path;
use super::Result;

/// Environment variable that overrides the configured API token
const TOKEN_ENV_VAR: &str = "TESTWEAVER_API_TOKEN";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Organization settings
    #[serde(default)]
    pub organization: OrgConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote API connection settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote test-automation API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for authentication
    #[serde(default)]
    pub auth_token: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.testweaver.dev/api".to_string()
}

/// Organization settings
#[derive(Debug, Deserialize, Default)]
pub struct OrgConfig {
    /// Organization the created projects belong to
    #[serde(default)]
    pub id: i64,
}

/// HTTP client settings in seconds
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Output settings
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Default output format: human, json, yaml or ai
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Enable verbose output by default
    #[serde(default)]
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            verbose: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if the file doesn't exist. The
    /// `TESTWEAVER_API_TOKEN` environment variable overrides the file token.
    pub fn load() -> Result<Self> {
        let mut config = if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| super::Error::file_read(&path, e))?;
                toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()))?
            } else {
                Self::default()
            }
        } else {
            Self::default()
        };

        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                config.api.auth_token = token;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.output.default_format, "human");
        assert!(!config.output.verbose);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://example.test/api"
            auth_token = "secret"

            [organization]
            id = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://example.test/api");
        assert_eq!(config.organization.id, 42);
        assert_eq!(config.http.timeout_secs, 30);
    }
}
