//! OAuth 2.0 authorization-code flow against Google's token endpoint.
//!
//! # Flow Overview
//!
//! 1. Build the authorization URL with `access_type=offline`
//! 2. The user opens it, grants access and copies the verification code
//! 3. Exchange the code for access and refresh tokens
//! 4. Later, exchange the refresh token for a new access token
//!
//! The [`TokenProvider`] trait is the seam the bootstrapper talks to;
//! [`GoogleOAuthClient`] is the production implementation.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::ClientSecret;
use crate::error::{FactoryError, FactoryResult};
use crate::tokens::TokenRecord;

/// The OAuth operations the bootstrapper needs.
pub trait TokenProvider {
    /// Builds the URL the user opens to grant access.
    fn authorization_url(&self) -> FactoryResult<String>;

    /// Exchanges a verification code for a token record.
    fn exchange_code(&self, code: &str) -> FactoryResult<TokenRecord>;

    /// Returns true if the record's access token must be refreshed.
    fn is_expired(&self, token: &TokenRecord) -> bool {
        token.is_expired()
    }

    /// Exchanges a refresh token for a new token record.
    fn refresh(&self, refresh_token: &str) -> FactoryResult<TokenRecord>;
}

/// OAuth client for Google APIs.
#[derive(Debug)]
pub struct GoogleOAuthClient {
    secret: ClientSecret,
    scope: String,
    http_client: reqwest::blocking::Client,
}

impl GoogleOAuthClient {
    /// Creates a client for the given secret and scope.
    pub fn new(
        secret: ClientSecret,
        scope: impl Into<String>,
        timeout: Duration,
    ) -> FactoryResult<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                FactoryError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            secret,
            scope: scope.into(),
            http_client,
        })
    }

    /// Returns the client secret in use.
    pub fn secret(&self) -> &ClientSecret {
        &self.secret
    }

    fn post_token_form(&self, params: &[(&str, &str)], what: &str) -> FactoryResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .map_err(|e| {
                FactoryError::network(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            FactoryError::network(format!("failed to read {} response: {}", what, e))
                .with_source(e)
        })?;

        parse_token_response(status.as_u16(), &body, what)
    }
}

impl TokenProvider for GoogleOAuthClient {
    fn authorization_url(&self) -> FactoryResult<String> {
        build_authorization_url(&self.secret, &self.scope)
    }

    fn exchange_code(&self, code: &str) -> FactoryResult<TokenRecord> {
        let params = [
            ("code", code),
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("redirect_uri", self.secret.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("exchanging verification code at {}", self.secret.token_uri);
        let response = self.post_token_form(&params, "token exchange")?;

        info!("obtained tokens for {}", self.secret.client_id);
        Ok(response.into_record(None))
    }

    fn refresh(&self, refresh_token: &str) -> FactoryResult<TokenRecord> {
        let params = [
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        debug!("refreshing access token at {}", self.secret.token_uri);
        let response = self.post_token_form(&params, "token refresh")?;

        info!("refreshed access token");
        Ok(response.into_record(Some(refresh_token)))
    }
}

/// Builds the consent page URL for an offline-access authorization code.
pub fn build_authorization_url(secret: &ClientSecret, scope: &str) -> FactoryResult<String> {
    let url = Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("response_type", "code"),
            ("access_type", "offline"),
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", secret.redirect_uri.as_str()),
            ("scope", scope),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| {
        FactoryError::configuration(format!("invalid auth_uri {}: {}", secret.auth_uri, e))
            .with_source(e)
    })?;

    Ok(url.into())
}

/// Successful response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TokenResponse {
    /// Stamps the response with the current time.
    ///
    /// Refresh responses usually omit the refresh token; `previous_refresh`
    /// is carried over in that case.
    fn into_record(self, previous_refresh: Option<&str>) -> TokenRecord {
        let mut record = TokenRecord::new(
            self.access_token,
            self.refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            self.expires_in,
            Utc::now(),
        );
        record.scope = self.scope;
        record.token_type = self.token_type;
        record.extra = self.extra;
        record
    }
}

/// Error body from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn parse_token_response(status: u16, body: &str, what: &str) -> FactoryResult<TokenResponse> {
    if !(200..300).contains(&status) {
        let detail = match serde_json::from_str::<TokenErrorResponse>(body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => body.trim().to_string(),
        };
        return Err(FactoryError::authorization(format!(
            "{} failed ({}): {}",
            what, status, detail
        )));
    }

    serde_json::from_str(body).map_err(|e| {
        FactoryError::invalid_response(format!("invalid {} response: {}", what, e)).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GOOGLE_AUTH_URL;
    use crate::error::FactoryErrorCode;

    fn secret() -> ClientSecret {
        ClientSecret::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn auth_url_format() {
        let url = build_authorization_url(&secret(), "https://www.googleapis.com/auth/calendar")
            .unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("client_id=test-client.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn auth_url_rejects_bad_endpoint() {
        let mut secret = secret();
        secret.auth_uri = "not a url".to_string();
        let err = build_authorization_url(&secret, "scope").unwrap_err();
        assert_eq!(err.code(), FactoryErrorCode::Configuration);
    }

    #[test]
    fn client_builds_auth_url_for_its_scope() {
        let client = GoogleOAuthClient::new(secret(), "scope-a", Duration::from_secs(5)).unwrap();
        let url = client.authorization_url().unwrap();
        assert!(url.contains("scope=scope-a"));
        assert_eq!(client.secret().client_secret, "test-secret");
    }

    #[test]
    fn exchange_response_becomes_record() {
        let body = r#"{
            "access_token": "ya29.new",
            "expires_in": 3599,
            "refresh_token": "1//refresh",
            "scope": "https://www.googleapis.com/auth/calendar",
            "token_type": "Bearer",
            "id_token": "jwt"
        }"#;

        let before = Utc::now().timestamp();
        let record = parse_token_response(200, body, "token exchange")
            .unwrap()
            .into_record(None);

        assert_eq!(record.access_token, "ya29.new");
        assert_eq!(record.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(record.expires_in, Some(3599));
        assert!(record.created.unwrap() >= before);
        assert_eq!(record.token_type.as_deref(), Some("Bearer"));
        assert_eq!(record.extra.get("id_token"), Some(&Value::from("jwt")));
        assert!(!record.is_expired());
    }

    #[test]
    fn refresh_response_keeps_previous_refresh_token() {
        let body = r#"{"access_token": "ya29.fresh", "expires_in": 3599}"#;
        let record = parse_token_response(200, body, "token refresh")
            .unwrap()
            .into_record(Some("1//old"));

        assert_eq!(record.access_token, "ya29.fresh");
        assert_eq!(record.refresh_token.as_deref(), Some("1//old"));
    }

    #[test]
    fn error_response_is_authorization_error() {
        let body = r#"{
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        }"#;
        let err = parse_token_response(400, body, "token refresh").unwrap_err();

        assert_eq!(err.code(), FactoryErrorCode::Authorization);
        assert!(err.message().contains("invalid_grant"));
        assert!(err.message().contains("expired or revoked"));
    }

    #[test]
    fn unparsable_success_is_invalid_response() {
        let err = parse_token_response(200, "<html></html>", "token exchange").unwrap_err();
        assert_eq!(err.code(), FactoryErrorCode::InvalidResponse);
    }
}
