//! The authenticated calendar service and the per-calendar handle.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};

use crate::error::{FactoryError, FactoryResult};

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// An authenticated Calendar API client.
///
/// Every request built through [`CalendarService::request`] carries the
/// bearer token and the application name as user agent.
#[derive(Debug, Clone)]
pub struct CalendarService {
    http_client: Client,
    access_token: String,
    application_name: String,
    base_url: String,
}

impl CalendarService {
    /// Creates a service authenticated with `access_token`.
    pub fn new(
        access_token: impl Into<String>,
        application_name: impl Into<String>,
        timeout: Duration,
    ) -> FactoryResult<Self> {
        let application_name = application_name.into();
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(application_name.clone())
            .build()
            .map_err(|e| {
                FactoryError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            application_name,
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    /// Points the service at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the application name sent as user agent.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Returns the API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the resource URL of a calendar.
    pub fn calendar_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// Starts an authorized request.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }
}

/// A calendar service bound to a single calendar.
#[derive(Debug, Clone)]
pub struct CalendarHandle {
    service: CalendarService,
    calendar_id: String,
}

impl CalendarHandle {
    /// Binds `service` to `calendar_id`.
    pub fn new(service: CalendarService, calendar_id: impl Into<String>) -> Self {
        Self {
            service,
            calendar_id: calendar_id.into(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn service(&self) -> &CalendarService {
        &self.service
    }

    /// Returns the events collection URL of the bound calendar.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.service.calendar_url(&self.calendar_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CalendarService {
        CalendarService::new("ya29.token", "Demo App", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn calendar_urls_are_encoded() {
        let service = service();
        assert_eq!(
            service.calendar_url("team@group.calendar.google.com"),
            "https://www.googleapis.com/calendar/v3/calendars/team%40group.calendar.google.com"
        );
    }

    #[test]
    fn handle_binds_calendar() {
        let handle = CalendarHandle::new(service(), "primary");
        assert_eq!(handle.calendar_id(), "primary");
        assert_eq!(handle.service().access_token(), "ya29.token");
        assert_eq!(handle.service().application_name(), "Demo App");
        assert_eq!(
            handle.events_url(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }

    #[test]
    fn custom_base_url() {
        let service = service().with_base_url("http://127.0.0.1:9000/v3/");
        assert_eq!(service.base_url(), "http://127.0.0.1:9000/v3");
        assert_eq!(
            service.calendar_url("primary"),
            "http://127.0.0.1:9000/v3/calendars/primary"
        );
    }

    #[test]
    fn requests_carry_bearer_token() {
        let service = service();
        let request = service
            .request(Method::GET, &service.calendar_url("primary"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer ya29.token"
        );
    }
}
