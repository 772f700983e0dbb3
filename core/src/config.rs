//! Client configuration.
//!
//! `ClientConfig::from_env` reads the portal URL, access token and request
//! timeout from `HUBSPOT_*` variables. `UnknownProperties` decides whether a
//! property missing from the portal's definitions is passed through as text
//! or rejected before any request is sent.

use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// What the formatter does with a property missing from the type map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownProperties {
    /// Send the value as a string and let HubSpot reject it.
    #[default]
    PassThrough,
    /// Fail locally before anything is sent.
    Reject,
}

/// Connection settings for a HubSpot portal.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub unknown_properties: UnknownProperties,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(30),
            unknown_properties: UnknownProperties::PassThrough,
        }
    }

    pub fn from_env() -> Self {
        let unknown_properties = if env_bool("HUBSPOT_REJECT_UNKNOWN_PROPERTIES", false) {
            UnknownProperties::Reject
        } else {
            UnknownProperties::PassThrough
        };
        Self {
            base_url: env_string("HUBSPOT_API_URL", DEFAULT_BASE_URL),
            access_token: env::var("HUBSPOT_ACCESS_TOKEN").ok().filter(|token| !token.is_empty()),
            request_timeout: env_duration_millis("HUBSPOT_TIMEOUT_MS", 30_000),
            unknown_properties,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_unknown_properties(mut self, policy: UnknownProperties) -> Self {
        self.unknown_properties = policy;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
