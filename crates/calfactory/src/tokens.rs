//! Token records and the on-disk token cache.
//!
//! The cache file holds one JSON object in the layout Google's client
//! libraries write: `access_token`, `refresh_token`, `expires_in`,
//! `created` and whatever else the token endpoint returned.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{FactoryError, FactoryResult};

/// Seconds before the real expiry at which a token already counts as expired.
pub const EXPIRY_LEEWAY_SECS: i64 = 30;

/// An OAuth token record as returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime of the access token in seconds, counted from `created`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Unix timestamp at which the access token was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,

    /// Granted scopes, space separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Any other fields, kept so a rewrite does not lose them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    /// Creates a record issued at `created`.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_in,
            created: Some(created.timestamp()),
            scope: None,
            token_type: None,
            extra: Map::new(),
        }
    }

    /// Returns when the access token expires, if the record says.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let created = self.created?;
        let expires_in = self.expires_in?;
        DateTime::from_timestamp(created.checked_add(expires_in)?, 0)
    }

    /// Returns true if the access token is expired or expires within
    /// [`EXPIRY_LEEWAY_SECS`] of `now`.
    ///
    /// A record without `created` or `expires_in`, or whose expiry does not
    /// fit in an `i64`, is treated as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match (self.created, self.expires_in) {
            (Some(created), Some(expires_in)) => created
                .checked_add(expires_in)
                .and_then(|t| t.checked_sub(EXPIRY_LEEWAY_SECS))
                .is_none_or(|t| t < now.timestamp()),
            _ => true,
        }
    }

    /// Returns true if the access token is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// The JSON token cache file.
///
/// The component assumes exclusive access; there is no locking.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the cache file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and decodes the cached record.
    ///
    /// Returns `Ok(None)` when there is no cache file. A file that exists
    /// but does not decode is an error.
    pub fn load(&self) -> FactoryResult<Option<TokenRecord>> {
        if !self.path.exists() {
            debug!("no token cache at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            FactoryError::io(format!(
                "failed to read token cache {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })?;

        let record: TokenRecord = serde_json::from_str(&content).map_err(|e| {
            FactoryError::decode(format!(
                "failed to decode token cache {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })?;

        debug!("loaded token cache from {:?}", self.path);
        Ok(Some(record))
    }

    /// Writes the record, replacing any previous content.
    ///
    /// Missing parent directories are created owner-only (`0700`) and the
    /// file itself is made owner-readable (`0600`) on Unix.
    pub fn save(&self, record: &TokenRecord) -> FactoryResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            create_private_dir(parent)?;
        }

        let content = serde_json::to_string(record).map_err(|e| {
            FactoryError::internal(format!("failed to encode token record: {}", e))
        })?;

        // Write to temp file first, then rename into place
        let temp_path = self.path.with_extension("json.tmp");
        write_private_file(&temp_path, content.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            FactoryError::io(format!(
                "failed to write token cache {}: {}",
                temp_path.display(),
                e
            ))
            .with_source(e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            FactoryError::io(format!(
                "failed to replace token cache {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })?;

        info!("saved token cache to {:?}", self.path);
        Ok(())
    }
}

/// Writes `content` to `path`, owner read/write only on Unix.
///
/// The mode is applied at creation and reapplied in case the file already
/// existed with looser permissions.
fn write_private_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content)?;
    file.sync_all()
}

fn create_private_dir(dir: &Path) -> FactoryResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir).map_err(|e| {
        FactoryError::io(format!(
            "failed to create token directory {}: {}",
            dir.display(),
            e
        ))
        .with_source(e)
    })?;

    debug!("created token directory {:?}", dir);
    Ok(())
}
