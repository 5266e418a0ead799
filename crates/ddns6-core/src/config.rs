//! Configuration types for the ddns6 system
//!
//! This module defines all configuration structures consumed by the core.
//! How they are populated (environment variables, files) is the daemon's
//! business.

use serde::{Deserialize, Serialize};

/// Update endpoint used when the configuration supplies none
/// (Strato's dyndns2 endpoint).
pub const DEFAULT_UPDATE_TEMPLATE: &str =
    "https://dyndns.strato.com/nic/update?hostname={domain}&myip={current_ip}";

/// Main ddns6 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Network interface to inspect for a global IPv6 address
    pub interface: String,

    /// Provider credentials
    pub credentials: Credentials,

    /// Provider update endpoint
    #[serde(default)]
    pub endpoint: UpdateEndpoint,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interface.is_empty() {
            return Err(crate::Error::config("interface name cannot be empty"));
        }

        self.credentials.validate()?;
        self.endpoint.validate()?;

        Ok(())
    }
}

/// Provider credentials. Immutable after load.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Host record to update (also the default basic-auth user)
    pub domain: String,

    /// Explicit basic-auth user, when the provider wants one distinct
    /// from the domain
    #[serde(default)]
    pub username: Option<String>,

    /// Provider password or token
    pub password: String,
}

impl Credentials {
    /// Basic-auth user: the explicit username, or the domain itself.
    pub fn auth_username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.domain)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("domain cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(crate::Error::config("password cannot be empty"));
        }
        Ok(())
    }
}

// The password never appears in Debug output or logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Provider update endpoint. Exactly one of the two shapes is active
/// per configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateEndpoint {
    /// URL template with `{domain}`, `{current_ip}` and optionally
    /// `{password}` placeholders
    Template {
        /// The URL template
        template: String,
    },

    /// Fixed URL; `hostname` and `myip` are attached as query parameters
    QueryParams {
        /// The base URL
        url: String,
    },
}

impl UpdateEndpoint {
    /// Whether the rendered request already carries the password, making
    /// basic authentication unnecessary.
    pub fn embeds_password(&self) -> bool {
        matches!(self, Self::Template { template } if template.contains("{password}"))
    }

    /// Validate the endpoint configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let url = match self {
            Self::Template { template } => template,
            Self::QueryParams { url } => url,
        };

        if url.is_empty() {
            return Err(crate::Error::config("update endpoint cannot be empty"));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "update endpoint must use HTTP or HTTPS. Got: {}",
                url
            )));
        }

        Ok(())
    }
}

impl Default for UpdateEndpoint {
    fn default() -> Self {
        Self::Template {
            template: DEFAULT_UPDATE_TEMPLATE.to_string(),
        }
    }
}

/// Engine configuration
///
/// The defaults are the timings the loop is designed around; tests dial
/// them down to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sleep between cycles when nothing went wrong (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Cooldown after a failed address resolution (in seconds)
    #[serde(default = "default_resolve_retry_secs")]
    pub resolve_retry_secs: u64,

    /// Cooldown after a failed provider update (in seconds)
    #[serde(default = "default_publish_retry_secs")]
    pub publish_retry_secs: u64,

    /// Maximum age of the last confirmed publish before the address is
    /// re-asserted even when unchanged (in seconds)
    ///
    /// Providers may expire a host record that is never refreshed;
    /// periodic re-assertion prevents silent de-registration.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            resolve_retry_secs: default_resolve_retry_secs(),
            publish_retry_secs: default_publish_retry_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_resolve_retry_secs() -> u64 {
    60
}

fn default_publish_retry_secs() -> u64 {
    600
}

fn default_refresh_interval_secs() -> u64 {
    43_200 // 12 hours
}

fn default_event_channel_capacity() -> usize {
    1000
}
