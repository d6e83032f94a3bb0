//! OAuth2 bootstrap for Google Calendar.
//!
//! [`CalendarFactory`] turns a [`FactoryConfig`] into a [`CalendarHandle`]
//! bound to one calendar:
//!
//! ```text
//!  credentials_path ──expand_home──▶ token cache
//!                                        │
//!                 exists? ── yes ──▶ decode ──┐
//!                    │                        │
//!                    no                       ▼
//!                    ▼                  expired? ── yes ──▶ refresh ──▶ rewrite cache
//!  authorization URL ▶ prompt ▶ exchange ─┘    │                            │
//!                                              no                           │
//!                                              ▼                            ▼
//!                                         CalendarService + calendar id = CalendarHandle
//! ```
//!
//! The OAuth provider, the home directory lookup and the prompt are traits
//! ([`TokenProvider`], [`HomeResolver`], [`AuthorizationPrompt`]) so that
//! callers and tests can substitute them.
//!
//! # Example
//!
//! ```ignore
//! use calfactory::{ClientSecretSource, FactoryConfig, GoogleCalendarFactory};
//!
//! let config = FactoryConfig::new(
//!     "My App",
//!     ClientSecretSource::Path("~/.config/calfactory/client_secret.json".into()),
//!     "~/.credentials/calendar-token.json",
//! );
//!
//! let mut factory = GoogleCalendarFactory::google(config)?;
//! let calendar = factory.create_for_calendar_id("primary")?;
//! println!("{}", calendar.events_url());
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod factory;
pub mod home;
pub mod logging;
pub mod oauth;
pub mod prompt;
pub mod tokens;

pub use calendar::{CalendarHandle, CalendarService};
pub use config::{ClientSecret, ClientSecretSource, FactoryConfig};
pub use error::{FactoryError, FactoryErrorCode, FactoryResult};
pub use factory::{CalendarFactory, GoogleCalendarFactory};
pub use home::{EnvHome, HomeResolver, expand_home};
pub use logging::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use oauth::{GoogleOAuthClient, TokenProvider};
pub use prompt::{AuthorizationPrompt, StdinPrompt};
pub use tokens::{TokenCache, TokenRecord};
