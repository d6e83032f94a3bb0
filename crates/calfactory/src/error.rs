//! Error types for the credential bootstrapper.
//!
//! Every failure aborts the call and reaches the caller unchanged. The
//! [`FactoryErrorCode`] classifies where in the flow it happened.

use std::fmt;
use thiserror::Error;

/// The category of a factory error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryErrorCode {
    /// Missing or invalid configuration or client secret.
    Configuration,
    /// Reading or writing the token cache failed.
    Io,
    /// The cached token record is not valid JSON or lacks required fields.
    Decode,
    /// The authorization server rejected a code or refresh token.
    Authorization,
    /// The token endpoint could not be reached.
    Network,
    /// The token endpoint answered with something we could not parse.
    InvalidResponse,
    /// Unexpected internal state.
    Internal,
}

impl FactoryErrorCode {
    /// Returns a machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::Io => "io_error",
            Self::Decode => "decode_error",
            Self::Authorization => "authorization_error",
            Self::Network => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for FactoryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while bootstrapping a calendar handle.
#[derive(Debug, Error)]
pub struct FactoryError {
    code: FactoryErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FactoryError {
    /// Creates a new error with the given code and message.
    pub fn new(code: FactoryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Configuration, message)
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Io, message)
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Decode, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Authorization, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Network, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::InvalidResponse, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FactoryErrorCode::Internal, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FactoryErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
