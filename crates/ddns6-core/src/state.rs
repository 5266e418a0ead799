// # Loop State
//
// In-memory record of the last confirmed publish.
//
// ## Crash Behavior
//
// State is intentionally not persisted. After a restart the first cycle
// always publishes; the provider answers `nochg` if the record already
// matched, which is harmless.

use chrono::{DateTime, Duration, Utc};
use std::net::Ipv6Addr;

/// Last confirmed publish, owned exclusively by the [`UpdateLoop`].
///
/// Only a confirmed successful publish advances this state. A failed
/// publish leaves it untouched, so the next cycle still treats the
/// current address as unconfirmed and retries.
///
/// The loop is strictly sequential; nothing else ever touches this
/// struct, so it needs no lock.
///
/// [`UpdateLoop`]: crate::engine::UpdateLoop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    last_address: Option<Ipv6Addr>,
    last_published_at: DateTime<Utc>,
}

impl LoopState {
    /// Fresh state: no address published yet, timestamp at the epoch.
    pub fn new() -> Self {
        Self {
            last_address: None,
            last_published_at: DateTime::UNIX_EPOCH,
        }
    }

    /// The last address the provider confirmed, if any
    pub fn last_address(&self) -> Option<Ipv6Addr> {
        self.last_address
    }

    /// When the provider last confirmed an address
    pub fn last_published_at(&self) -> DateTime<Utc> {
        self.last_published_at
    }

    /// Whether `address` must be published at `now`.
    ///
    /// True when the address differs from the last confirmed one, or when
    /// the last confirmed publish is at least `max_age` old. The second
    /// trigger exists because providers may expire a host record that is
    /// never re-asserted, even when the address has not changed.
    pub fn needs_publish(&self, address: Ipv6Addr, now: DateTime<Utc>, max_age: Duration) -> bool {
        if self.last_address != Some(address) {
            return true;
        }
        now.signed_duration_since(self.last_published_at) >= max_age
    }

    /// Record a confirmed publish.
    ///
    /// `last_published_at` only moves forward, in lockstep with
    /// `last_address`, even if the wall clock stepped backwards between
    /// cycles.
    pub fn record_publish(&mut self, address: Ipv6Addr, now: DateTime<Utc>) {
        self.last_address = Some(address);
        if now > self.last_published_at {
            self.last_published_at = now;
        }
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::new()
    }
}
