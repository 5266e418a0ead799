// # Address Source Trait
//
// Defines the interface for discovering the host's current global-scope
// IPv6 address on a configured interface.
//
// ## Implementations
//
// - iproute2-based (Linux): `ddns6-addr-iproute` crate
// - Future: direct netlink (RTM_GETADDR), platform-specific APIs

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Trait for address source implementations
///
/// A source answers a single question: which global, stable IPv6 address
/// does the configured interface currently carry?
///
/// Sources are read-only observers. They perform the OS query and nothing
/// else: no retry logic, no scheduling decisions, no caching beyond a
/// single call. Cooldowns after failures are owned by the [`UpdateLoop`].
///
/// [`UpdateLoop`]: crate::engine::UpdateLoop
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Resolve the current global IPv6 address of the interface.
    ///
    /// Tentative, deprecated and DAD-failed addresses are excluded at the
    /// OS query; temporary (privacy-extension) and unique-local
    /// (`fc00::/7`) addresses are filtered from the result. When several
    /// global addresses survive, the first one in OS-reported order wins.
    /// That order is not guaranteed stable across kernel versions; this
    /// is an inherited ambiguity, not something implementations should
    /// second-guess with their own tie-breaks.
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv6Addr)`: the selected address
    /// - `Err(Error::NoAddress)`: the query failed or no address survived
    ///   the filter; always recoverable
    async fn resolve(&self) -> Result<Ipv6Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
