//! Configuration loading for mimird.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.mimir/config.toml` (user)
//! 3. `/etc/mimir/config.toml` (system)
//! 4. Built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.mimir/secrets.toml` (user, must be 0600)
//! 2. `/etc/mimir/secrets.toml` (system, must be 0600)
//! 3. `GEMINI_API_KEY` / `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::ProviderSettings;
use crate::providers::RetryConfig;
use crate::types::RequestLimits;
use crate::{MimirError, Result};

/// Environment variable that overrides `server.environment`.
pub const ENVIRONMENT_ENV_VAR: &str = "MIMIR_ENV";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Deployment environment. Production hides upstream error detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse an environment name; anything but "production" is development.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3001).
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            environment: Environment::default(),
            limits: LimitsConfig::default(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:3001".to_string()
}

/// Input and time limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(flatten)]
    pub request: RequestLimits,
    /// Whole-request timeout in seconds (default: 120).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Per-provider-call timeout in seconds (default: 60).
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
    /// Raw body cap in bytes; derived from the request limits when unset.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request: RequestLimits::default(),
            request_timeout_secs: default_request_timeout(),
            provider_timeout_secs: default_provider_timeout(),
            max_body_bytes: None,
        }
    }
}

impl LimitsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn default_request_timeout() -> u64 {
    120
}

fn default_provider_timeout() -> u64 {
    60
}

/// `[retry]` table, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig::new()
            .max_attempts(settings.max_attempts)
            .initial_delay(Duration::from_millis(settings.initial_delay_ms))
            .max_delay(Duration::from_millis(settings.max_delay_ms))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// Per-provider overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub anthropic: ProviderSettings,
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
    #[serde(default)]
    pub openai: Option<ApiKeySecret>,
    #[serde(default)]
    pub anthropic: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Provider name → environment variable name mapping.
const PROVIDER_ENV_VARS: &[(&str, &str)] = &[
    ("gemini", "GEMINI_API_KEY"),
    ("openai", "OPENAI_API_KEY"),
    ("anthropic", "ANTHROPIC_API_KEY"),
];

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first file found is
    /// used, falling back to defaults. `MIMIR_ENV` is applied last.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        if let Ok(env) = std::env::var(ENVIRONMENT_ENV_VAR) {
            config.server.environment = Environment::from_name(&env);
        }
        Ok(config)
    }

    /// Parse one config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MimirError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MimirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".mimir").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/mimir/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (providers may use env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            if let Some(secrets) = Self::load_from_dir(&home.join(".mimir"))? {
                return Ok(secrets);
            }
        }

        // Try system secrets
        if let Some(secrets) = Self::load_from_dir(Path::new("/etc/mimir"))? {
            return Ok(secrets);
        }

        Ok(Secrets::default())
    }

    /// Load `secrets.toml` from `dir`, or `None` if it has none.
    ///
    /// A file readable by group or other is rejected.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join("secrets.toml");
        if !path.exists() {
            return Ok(None);
        }
        Self::check_permissions(&path)?;
        Self::load_from_file(&path).map(Some)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MimirError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(MimirError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Get API key for a provider, falling back to the corresponding environment variable.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        let from_file = match provider {
            "gemini" => self.gemini.as_ref(),
            "openai" => self.openai.as_ref(),
            "anthropic" => self.anthropic.as_ref(),
            _ => None,
        }
        .map(|s| s.api_key.clone())
        .filter(|key| !key.trim().is_empty());

        from_file.or_else(|| {
            PROVIDER_ENV_VARS
                .iter()
                .find(|(name, _)| *name == provider)
                .and_then(|(_, env_var)| std::env::var(env_var).ok())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:3001");
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.server.limits.request.max_code_chars, 50_000);
        assert_eq!(config.server.limits.request_timeout_secs, 120);
        assert_eq!(config.server.limits.provider_timeout_secs, 60);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:3001"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:3001");
        // Defaults preserved
        assert_eq!(config.server.limits.request.max_context_chars, 2_000);
        assert_eq!(config.retry.initial_delay_ms, 1_000);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:8080"
            environment = "production"

            [server.limits]
            max_code_chars = 1000
            max_context_chars = 100
            max_report_results = 5
            request_timeout_secs = 30
            provider_timeout_secs = 10

            [retry]
            max_attempts = 5
            initial_delay_ms = 250
            max_delay_ms = 4000

            [providers.gemini]
            model = "gemini-1.5-pro"
            priority = 3

            [providers.anthropic]
            base_url = "http://localhost:9999"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.server.environment.is_production());
        assert_eq!(config.server.limits.request.max_code_chars, 1000);
        assert_eq!(config.server.limits.request.max_report_results, 5);
        assert_eq!(config.server.limits.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.server.limits.provider_timeout(), Duration::from_secs(10));

        let retry = RetryConfig::from(&config.retry);
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.initial_delay, Duration::from_millis(250));
        assert_eq!(retry.max_delay, Duration::from_secs(4));

        assert_eq!(config.providers.gemini.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.providers.gemini.priority, Some(3));
        assert_eq!(
            config.providers.anthropic.base_url.as_deref(),
            Some("http://localhost:9999")
        );
        assert_eq!(config.providers.openai, ProviderSettings::default());
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [gemini]
            api_key = "gemini-test-key"

            [anthropic]
            api_key = "sk-ant-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.gemini.as_ref().unwrap().api_key, "gemini-test-key");
        assert_eq!(secrets.anthropic.as_ref().unwrap().api_key, "sk-ant-test-key");
        assert!(secrets.openai.is_none());
    }

    #[test]
    fn api_key_from_secrets() {
        let secrets = Secrets {
            gemini: Some(ApiKeySecret {
                api_key: "from-file".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(secrets.api_key("gemini"), Some("from-file".to_string()));
        // Unknown provider returns None
        assert_eq!(secrets.api_key("nonexistent"), None);
    }

    #[test]
    fn environment_names() {
        assert_eq!(Environment::from_name("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::from_name("staging"), Environment::Development);
    }

    #[test]
    fn explicit_config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
