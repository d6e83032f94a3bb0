//! The credential bootstrapper.
//!
//! [`CalendarFactory::create_for_calendar_id`] loads the cached token or
//! runs the interactive authorization, refreshes an expired access token,
//! and returns a [`CalendarHandle`] bound to the requested calendar.

use std::io::{StdinLock, Stdout};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::calendar::{CalendarHandle, CalendarService};
use crate::config::{ClientSecretSource, FactoryConfig};
use crate::error::{FactoryError, FactoryResult};
use crate::home::{EnvHome, HomeResolver, expand_home};
use crate::oauth::{GoogleOAuthClient, TokenProvider};
use crate::prompt::{AuthorizationPrompt, StdinPrompt};
use crate::tokens::{TokenCache, TokenRecord};

/// How the token record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    /// Read from the token cache.
    Cached,
    /// Obtained through the interactive authorization-code exchange.
    Interactive,
}

/// Builds calendar handles from a configuration and three capabilities:
/// the OAuth provider, the home directory resolver and the prompt.
pub struct CalendarFactory<P, H, A> {
    config: FactoryConfig,
    provider: P,
    home: H,
    prompt: A,
}

/// A factory wired to Google, the process environment and the terminal.
pub type GoogleCalendarFactory =
    CalendarFactory<GoogleOAuthClient, EnvHome, StdinPrompt<StdinLock<'static>, Stdout>>;

impl GoogleCalendarFactory {
    /// Creates a factory talking to Google, reading the home directory from
    /// the environment and prompting on the terminal.
    ///
    /// Loads the client secret eagerly; a missing or invalid secret fails here.
    pub fn google(config: FactoryConfig) -> FactoryResult<Self> {
        config.validate()?;

        let home = EnvHome::new();
        let secret = match &config.client_secret {
            ClientSecretSource::Path(path) => {
                let path = expand_home(&path.to_string_lossy(), &home)?;
                ClientSecretSource::Path(path).load()?
            }
            inline => inline.load()?,
        };
        let provider = GoogleOAuthClient::new(secret, config.scope.clone(), config.timeout)?;

        Ok(Self::new(config, provider, home, StdinPrompt::new()))
    }
}

impl<P, H, A> CalendarFactory<P, H, A>
where
    P: TokenProvider,
    H: HomeResolver,
    A: AuthorizationPrompt,
{
    /// Creates a factory from explicit capabilities.
    pub fn new(config: FactoryConfig, provider: P, home: H, prompt: A) -> Self {
        Self {
            config,
            provider,
            home,
            prompt,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the token cache path with `~` expanded.
    pub fn credentials_path(&self) -> FactoryResult<PathBuf> {
        expand_home(&self.config.credentials_path, &self.home)
    }

    /// Returns an authenticated handle bound to `calendar_id`.
    ///
    /// A present cache file always wins over interactive authorization;
    /// a cache file that fails to decode is an error. An expired access
    /// token is refreshed and the cache rewritten before returning.
    pub fn create_for_calendar_id(&mut self, calendar_id: &str) -> FactoryResult<CalendarHandle> {
        let cache = TokenCache::new(self.credentials_path()?);
        let (token, source) = self.load_or_authorize(&cache)?;
        debug!("using {:?} token for calendar {}", source, calendar_id);

        let token = self.refresh_if_expired(&cache, token)?;

        let service = CalendarService::new(
            token.access_token,
            self.config.application_name.clone(),
            self.config.timeout,
        )?;
        Ok(CalendarHandle::new(service, calendar_id))
    }

    fn load_or_authorize(
        &mut self,
        cache: &TokenCache,
    ) -> FactoryResult<(TokenRecord, TokenSource)> {
        if let Some(token) = cache.load()? {
            return Ok((token, TokenSource::Cached));
        }

        info!("no cached credentials, requesting authorization");
        let url = self.provider.authorization_url()?;
        let code = self.prompt.verification_code(&url)?;
        let token = self.provider.exchange_code(code.trim())?;

        cache.save(&token)?;
        self.prompt.credentials_saved(cache.path());
        Ok((token, TokenSource::Interactive))
    }

    fn refresh_if_expired(
        &self,
        cache: &TokenCache,
        token: TokenRecord,
    ) -> FactoryResult<TokenRecord> {
        if !self.provider.is_expired(&token) {
            return Ok(token);
        }

        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            FactoryError::authorization(format!(
                "access token expired and {} holds no refresh token",
                cache.path().display()
            ))
        })?;

        debug!("access token expired, refreshing");
        let refreshed = self.provider.refresh(refresh_token)?;
        cache.save(&refreshed)?;
        Ok(refreshed)
    }
}

impl<P, H, A> std::fmt::Debug for CalendarFactory<P, H, A>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarFactory")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
