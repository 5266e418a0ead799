// # dyndns2 Update Publisher
//
// Reports the current address to a dyndns2-style update endpoint
// (`/nic/update`). Strato, DynDNS, DNS-O-Matic, IPv64 and many other
// providers speak this protocol.
//
// ## Response contract
//
// Responses are free text carrying a status marker: `good` means the
// record was updated, `nochg` means it already matched. Classification
// is by substring — providers embed the marker in additional text
// ("good 2001:db8::1"), so stricter parsing breaks against real servers.
// A response without either marker is a failure and is reported
// verbatim. The HTTP status line is not consulted for classification;
// the body alone decides.
//
// ## Constraints
//
// - Exactly one HTTP GET per publish call
// - NO retry or backoff logic (owned by the UpdateLoop)
// - Credentials never appear in Debug output or logs

use async_trait::async_trait;
use ddns6_core::config::{Credentials, UpdateEndpoint};
use ddns6_core::traits::{PublishOutcome, UpdatePublisher};
use ddns6_core::{Error, Result};
use std::net::Ipv6Addr;
use std::time::Duration;
use tracing::debug;

/// Default HTTP timeout for update requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// dyndns2 update publisher
pub struct Dyndns2Publisher {
    credentials: Credentials,
    endpoint: UpdateEndpoint,
    client: reqwest::Client,
}

// Credentials redact their own password; the endpoint may still embed
// one in a template, so it is reduced to its shape here.
impl std::fmt::Debug for Dyndns2Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self.endpoint {
            UpdateEndpoint::Template { .. } => "template",
            UpdateEndpoint::QueryParams { .. } => "query_params",
        };
        f.debug_struct("Dyndns2Publisher")
            .field("credentials", &self.credentials)
            .field("endpoint", &shape)
            .finish()
    }
}

impl Dyndns2Publisher {
    /// Create a new publisher for `endpoint` authenticating with
    /// `credentials`
    pub fn new(credentials: Credentials, endpoint: UpdateEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            endpoint,
            client,
        })
    }

    /// Build the update request for `address`.
    ///
    /// Basic authentication is attached unless the endpoint template
    /// already embeds the password.
    fn build_request(&self, address: Ipv6Addr) -> Result<reqwest::Request> {
        let address_text = address.to_string();

        let builder = match &self.endpoint {
            UpdateEndpoint::Template { template } => {
                let url = render_template(template, &self.credentials, &address_text);
                self.client.get(url)
            }
            UpdateEndpoint::QueryParams { url } => self.client.get(url.as_str()).query(&[
                ("hostname", self.credentials.domain.as_str()),
                ("myip", address_text.as_str()),
            ]),
        };

        let builder = if self.endpoint.embeds_password() {
            builder
        } else {
            builder.basic_auth(
                self.credentials.auth_username(),
                Some(self.credentials.password.as_str()),
            )
        };

        builder
            .build()
            .map_err(|e| Error::publish(format!("invalid update request: {}", e)))
    }
}

#[async_trait]
impl UpdatePublisher for Dyndns2Publisher {
    async fn publish(&self, address: Ipv6Addr) -> Result<PublishOutcome> {
        let request = self.build_request(address)?;
        debug!("sending update for {}", address);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::publish(format!("update request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::publish(format!("failed to read update response: {}", e)))?;

        classify_response(&body).ok_or_else(|| {
            Error::publish(format!("update rejected (HTTP {}): {}", status, body.trim()))
        })
    }

    fn publisher_name(&self) -> &'static str {
        "dyndns2"
    }
}

/// Substitute the `{domain}`, `{current_ip}` and `{password}`
/// placeholders of an endpoint template.
fn render_template(template: &str, credentials: &Credentials, address: &str) -> String {
    template
        .replace("{domain}", &credentials.domain)
        .replace("{current_ip}", address)
        .replace("{password}", &credentials.password)
}

/// Classify a dyndns2 response body; `None` means no marker was found.
fn classify_response(body: &str) -> Option<PublishOutcome> {
    if body.contains("good") {
        Some(PublishOutcome::Updated)
    } else if body.contains("nochg") {
        Some(PublishOutcome::Unchanged)
    } else {
        None
    }
}
