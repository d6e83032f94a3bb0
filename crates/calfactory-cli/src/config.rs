//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfactory/config.toml` by default.
//!
//! `client_secret_json` holds either a path to the client secret file
//! downloaded from the Google Cloud Console or the JSON document itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use calfactory::{ClientSecretSource, FactoryConfig};
use serde::{Deserialize, Serialize};

/// Default token cache location.
pub const DEFAULT_CREDENTIALS_PATH: &str = "~/.credentials/calfactory-token.json";

/// Configuration for the calfactory CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Application name sent to Google as user agent.
    pub application_name: String,

    /// Client secret path or inline JSON.
    pub client_secret_json: Option<String>,

    /// Token cache path; `~` is replaced by the home directory.
    pub credentials_path: String,

    /// OAuth scope override.
    pub scope: Option<String>,

    /// Token endpoint timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            application_name: "calfactory".to_string(),
            client_secret_json: None,
            credentials_path: DEFAULT_CREDENTIALS_PATH.to_string(),
            scope: None,
            timeout_secs: FactoryConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfactory")
            .join("config.toml")
    }

    /// Converts to the bootstrapper configuration.
    pub fn to_factory_config(&self) -> Result<FactoryConfig, String> {
        let secret = self.client_secret_json.as_deref().ok_or_else(|| {
            format!(
                "client secret not configured. Add to {}:\n  \
                 client_secret_json = \"~/path/to/client_secret.json\"",
                Self::default_path().display()
            )
        })?;

        let mut config = FactoryConfig::new(
            self.application_name.clone(),
            ClientSecretSource::parse(secret),
            self.credentials_path.clone(),
        )
        .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(ref scope) = self.scope {
            config = config.with_scope(scope);
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = CliConfig::default();
        assert_eq!(config.application_name, "calfactory");
        assert_eq!(config.credentials_path, DEFAULT_CREDENTIALS_PATH);
        assert!(config.client_secret_json.is_none());
    }

    #[test]
    fn parses_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
application_name = "Team Sync"
client_secret_json = "~/secrets/client_secret.json"
credentials_path = "~/.creds/token.json"
scope = "https://www.googleapis.com/auth/calendar.readonly"
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        let factory = config.to_factory_config().unwrap();

        assert_eq!(factory.application_name, "Team Sync");
        assert_eq!(
            factory.client_secret,
            ClientSecretSource::Path(PathBuf::from("~/secrets/client_secret.json"))
        );
        assert_eq!(factory.credentials_path, "~/.creds/token.json");
        assert_eq!(
            factory.scope,
            "https://www.googleapis.com/auth/calendar.readonly"
        );
        assert_eq!(factory.timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: CliConfig =
            toml::from_str(r#"client_secret_json = '{"installed": {}}'"#).unwrap();
        let factory = config.to_factory_config().unwrap();

        assert!(matches!(factory.client_secret, ClientSecretSource::Inline(_)));
        assert_eq!(factory.scope, FactoryConfig::CALENDAR_SCOPE);
        assert_eq!(factory.credentials_path, DEFAULT_CREDENTIALS_PATH);
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = CliConfig::default().to_factory_config().unwrap_err();
        assert!(err.contains("client_secret_json"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "application_name = [").unwrap();

        let err = CliConfig::load_from(&path).unwrap_err();
        assert!(err.contains("failed to parse config"));
    }
}
