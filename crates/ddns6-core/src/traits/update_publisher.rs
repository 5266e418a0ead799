// # Update Publisher Trait
//
// Defines the interface for reporting the current address to a
// dynamic-DNS provider's HTTP update endpoint.
//
// ## Implementations
//
// - dyndns2-style protocol: `ddns6-provider-dyndns2` crate

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Result of a provider update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The provider accepted and applied the new address
    Updated,
    /// The provider already had this address on record
    Unchanged,
}

/// Trait for update publisher implementations
///
/// A publisher performs exactly one outbound request per call and
/// interprets the provider's response. It must not retry, back off, cache
/// or decide *whether* an update is due; all of that is owned by the
/// [`UpdateLoop`]. A publisher that retried internally would defeat the
/// loop's differentiated cooldown policy.
///
/// Both [`PublishOutcome`] variants are successful publishes: `Unchanged`
/// still confirms the address with the provider and resets its staleness
/// clock.
///
/// [`UpdateLoop`]: crate::engine::UpdateLoop
#[async_trait]
pub trait UpdatePublisher: Send + Sync {
    /// Report `address` to the provider.
    ///
    /// # Returns
    ///
    /// - `Ok(PublishOutcome)`: the provider confirmed the address
    /// - `Err(Error::Publish)`: transport failure or unclassifiable
    ///   response; always recoverable
    async fn publish(&self, address: Ipv6Addr) -> Result<PublishOutcome, crate::Error>;

    /// Get the publisher name (for logging/debugging)
    fn publisher_name(&self) -> &'static str;
}
