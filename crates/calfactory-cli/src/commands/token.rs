//! Token cache inspection.

use std::path::PathBuf;

use chrono::Utc;

use calfactory::{EnvHome, TokenCache, TokenRecord, expand_home};

use crate::config::CliConfig;
use crate::error::CliResult;

fn cache_path(config: &CliConfig) -> CliResult<PathBuf> {
    Ok(expand_home(&config.credentials_path, &EnvHome::new())?)
}

/// Print the resolved token cache path.
pub fn path(config: &CliConfig) -> CliResult<()> {
    println!("{}", cache_path(config)?.display());
    Ok(())
}

/// Print the cached token status.
pub fn show(config: &CliConfig) -> CliResult<()> {
    let cache = TokenCache::new(cache_path(config)?);
    println!("cache: {}", cache.path().display());

    match cache.load()? {
        None => println!("status: not authorized (run `calfactory connect <calendar-id>`)"),
        Some(token) => println!("status: {}", describe(&token)),
    }
    Ok(())
}

/// One-line summary of a token's state.
pub fn describe(token: &TokenRecord) -> String {
    let now = Utc::now();
    let refresh = if token.refresh_token.is_some() {
        "refresh token present"
    } else {
        "no refresh token"
    };

    match token.expires_at() {
        Some(at) if !token.is_expired_at(now) => {
            let minutes = (at - now).num_minutes();
            format!("valid for {} more minutes, {}", minutes, refresh)
        }
        Some(at) => format!("expired at {}, {}", at.to_rfc3339(), refresh),
        None => format!("expiry unknown (treated as expired), {}", refresh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn describes_valid_token() {
        let token = TokenRecord::new("a", Some("r".into()), Some(3600), Utc::now());
        let text = describe(&token);
        assert!(text.starts_with("valid for"));
        assert!(text.ends_with("refresh token present"));
    }

    #[test]
    fn describes_expired_token() {
        let token = TokenRecord::new("a", None, Some(60), Utc::now() - Duration::hours(1));
        let text = describe(&token);
        assert!(text.starts_with("expired at"));
        assert!(text.ends_with("no refresh token"));
    }

    #[test]
    fn describes_token_without_expiry() {
        let mut token = TokenRecord::new("a", None, None, Utc::now());
        token.created = None;
        assert!(describe(&token).starts_with("expiry unknown"));
    }
}
