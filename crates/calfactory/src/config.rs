//! Bootstrapper configuration and Google client secret parsing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FactoryError, FactoryResult};

/// Google's default authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's default token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Redirect URI used when the client secret lists none.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Where the OAuth client secret comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSecretSource {
    /// Path to a client secret JSON file downloaded from the Cloud Console.
    Path(PathBuf),
    /// The client secret JSON document itself.
    Inline(String),
}

impl ClientSecretSource {
    /// Interprets a raw configuration value.
    ///
    /// Values whose first non-blank character is `{` are inline JSON,
    /// everything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.trim_start().starts_with('{') {
            Self::Inline(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }

    /// Loads and parses the client secret.
    pub fn load(&self) -> FactoryResult<ClientSecret> {
        match self {
            Self::Path(path) => ClientSecret::from_file(path),
            Self::Inline(json) => ClientSecret::from_json(json),
        }
    }
}

/// Layout of a Google client secret JSON document.
///
/// Either an `installed`/`web` section, or `client_id`/`client_secret` at
/// the root.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretSection>,
    web: Option<ClientSecretSection>,
    #[serde(flatten)]
    flat: FlatSection,
}

#[derive(Debug, Deserialize)]
struct ClientSecretSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FlatSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

/// A parsed OAuth client secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecret {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
    /// Redirect URI sent with the authorization and exchange requests.
    pub redirect_uri: String,
    /// Authorization endpoint.
    pub auth_uri: String,
    /// Token endpoint.
    pub token_uri: String,
}

impl ClientSecret {
    /// Creates a client secret with Google's default endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_uri: GOOGLE_AUTH_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Reads a client secret JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> FactoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FactoryError::configuration(format!(
                "failed to read client secret {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses a client secret JSON document.
    pub fn from_json(json: &str) -> FactoryResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json).map_err(|e| {
            FactoryError::configuration(format!("failed to parse client secret JSON: {}", e))
                .with_source(e)
        })?;

        let (client_id, client_secret, redirect_uris, auth_uri, token_uri) =
            match file.installed.or(file.web) {
                Some(s) => (
                    s.client_id,
                    s.client_secret,
                    s.redirect_uris,
                    s.auth_uri,
                    s.token_uri,
                ),
                None => match (file.flat.client_id, file.flat.client_secret) {
                    (Some(id), Some(secret)) => (
                        id,
                        secret,
                        file.flat.redirect_uris,
                        file.flat.auth_uri,
                        file.flat.token_uri,
                    ),
                    _ => {
                        return Err(FactoryError::configuration(
                            "client secret must contain an 'installed'/'web' section \
                             or 'client_id'/'client_secret' at root level",
                        ));
                    }
                },
            };

        let secret = Self {
            client_id,
            client_secret,
            redirect_uri: redirect_uris
                .into_iter()
                .next()
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            auth_uri: auth_uri.unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
            token_uri: token_uri.unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        };
        secret.validate()?;
        Ok(secret)
    }

    fn validate(&self) -> FactoryResult<()> {
        if self.client_id.is_empty() {
            return Err(FactoryError::configuration("client_id is required"));
        }
        if self.client_secret.is_empty() {
            return Err(FactoryError::configuration("client_secret is required"));
        }
        Ok(())
    }
}

/// Static configuration for [`CalendarFactory`](crate::CalendarFactory).
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// Application name, sent as the user agent.
    pub application_name: String,

    /// OAuth scope to request.
    ///
    /// Defaults to read/write calendar access.
    pub scope: String,

    /// Where the OAuth client secret comes from.
    pub client_secret: ClientSecretSource,

    /// Token cache location. Every `~` is replaced by the home directory.
    pub credentials_path: String,

    /// Timeout for token endpoint requests.
    pub timeout: Duration,
}

impl FactoryConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read/write calendar scope.
    pub const CALENDAR_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Creates a configuration with the calendar scope and default timeout.
    pub fn new(
        application_name: impl Into<String>,
        client_secret: ClientSecretSource,
        credentials_path: impl Into<String>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            scope: Self::CALENDAR_SCOPE.to_string(),
            client_secret,
            credentials_path: credentials_path.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the OAuth scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FactoryResult<()> {
        if self.application_name.trim().is_empty() {
            return Err(FactoryError::configuration("application name is required"));
        }
        if self.scope.trim().is_empty() {
            return Err(FactoryError::configuration("an OAuth scope is required"));
        }
        if self.credentials_path.trim().is_empty() {
            return Err(FactoryError::configuration("credentials_path is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactoryErrorCode;

    #[test]
    fn secret_source_detects_inline_json() {
        assert_eq!(
            ClientSecretSource::parse("  {\"installed\": {}}"),
            ClientSecretSource::Inline("  {\"installed\": {}}".to_string())
        );
        assert_eq!(
            ClientSecretSource::parse("~/secrets/client.json"),
            ClientSecretSource::Path(PathBuf::from("~/secrets/client.json"))
        );
    }

    #[test]
    fn secret_from_installed_section() {
        let json = r#"{
            "installed": {
                "client_id": "id.apps.googleusercontent.com",
                "client_secret": "shh",
                "project_id": "demo",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
            }
        }"#;

        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(secret.auth_uri, "https://accounts.google.com/o/oauth2/auth");
    }

    #[test]
    fn secret_from_web_section_uses_defaults() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;

        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.client_id, "web-id");
        assert_eq!(secret.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(secret.auth_uri, GOOGLE_AUTH_URL);
        assert_eq!(secret.token_uri, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn secret_from_flat_document() {
        let json = r#"{"client_id": "flat-id", "client_secret": "flat-secret"}"#;

        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.client_id, "flat-id");
        assert_eq!(secret.client_secret, "flat-secret");
    }

    #[test]
    fn secret_missing_fields_is_configuration_error() {
        let err = ClientSecret::from_json(r#"{"other": {}}"#).unwrap_err();
        assert_eq!(err.code(), FactoryErrorCode::Configuration);

        let err = ClientSecret::from_json("not json").unwrap_err();
        assert_eq!(err.code(), FactoryErrorCode::Configuration);
        assert!(err.message().contains("parse"));
    }

    #[test]
    fn secret_file_missing_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecretSource::Path(dir.path().join("absent.json"))
            .load()
            .unwrap_err();
        assert_eq!(err.code(), FactoryErrorCode::Configuration);
    }

    #[test]
    fn config_defaults() {
        let config = FactoryConfig::new(
            "Demo",
            ClientSecretSource::Path("secret.json".into()),
            "~/.credentials/token.json",
        );
        assert_eq!(config.scope, FactoryConfig::CALENDAR_SCOPE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        let secret = ClientSecretSource::Path("secret.json".into());

        let no_name = FactoryConfig::new(" ", secret.clone(), "token.json");
        assert!(no_name.validate().is_err());

        let no_scope = FactoryConfig::new("Demo", secret.clone(), "token.json").with_scope("");
        assert!(no_scope.validate().is_err());

        let no_path = FactoryConfig::new("Demo", secret, "");
        assert!(no_path.validate().is_err());
    }
}
