//! Test doubles and common utilities for update-loop contract tests
//!
//! The doubles are scripted rather than smart: they replay a fixed
//! sequence of results and count calls, so tests can assert on loop
//! behavior without any real OS query or HTTP traffic.

use async_trait::async_trait;
use ddns6_core::config::{Credentials, DdnsConfig, EngineConfig, UpdateEndpoint};
use ddns6_core::error::{Error, Result};
use ddns6_core::traits::{AddressSource, PublishOutcome, UpdatePublisher};
use std::collections::VecDeque;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An AddressSource that replays a scripted sequence of results, then
/// keeps returning a fallback address forever.
pub struct ScriptedAddressSource {
    script: Mutex<VecDeque<Result<Ipv6Addr>>>,
    fallback: Ipv6Addr,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedAddressSource {
    /// A source that always resolves to `address`
    pub fn constant(address: Ipv6Addr) -> Self {
        Self::with_script(Vec::new(), address)
    }

    /// A source that replays `script`, then falls back to `fallback`
    pub fn with_script(script: Vec<Result<Ipv6Addr>>, fallback: Ipv6Addr) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the resolve() call counter
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.resolve_call_count)
    }
}

#[async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn resolve(&self) -> Result<Ipv6Addr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.fallback),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// An UpdatePublisher that replays scripted outcomes (then keeps
/// answering `Updated`), recording every published address.
pub struct ScriptedPublisher {
    outcomes: Mutex<VecDeque<Result<PublishOutcome>>>,
    published: Arc<Mutex<Vec<Ipv6Addr>>>,
    publish_call_count: Arc<AtomicUsize>,
}

impl ScriptedPublisher {
    /// A publisher that always answers `Updated`
    pub fn always_updated() -> Self {
        Self::with_script(Vec::new())
    }

    /// A publisher that replays `outcomes`, then answers `Updated`
    pub fn with_script(outcomes: Vec<Result<PublishOutcome>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            published: Arc::new(Mutex::new(Vec::new())),
            publish_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the publish() call counter
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.publish_call_count)
    }

    /// Shared handle on the list of published addresses, in call order
    pub fn published(&self) -> Arc<Mutex<Vec<Ipv6Addr>>> {
        Arc::clone(&self.published)
    }
}

#[async_trait]
impl UpdatePublisher for ScriptedPublisher {
    async fn publish(&self, address: Ipv6Addr) -> Result<PublishOutcome> {
        self.publish_call_count.fetch_add(1, Ordering::SeqCst);
        self.published.lock().unwrap().push(address);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(PublishOutcome::Updated),
        }
    }

    fn publisher_name(&self) -> &'static str {
        "scripted"
    }
}

/// A publish error for scripting failures
pub fn publish_error() -> Error {
    Error::publish("421 try again later")
}

/// A resolve error for scripting failures
pub fn resolve_error() -> Error {
    Error::no_address("no usable global IPv6 address on eth0")
}

/// Minimal config with zeroed timings so tests run without real sleeps
pub fn fast_config() -> DdnsConfig {
    DdnsConfig {
        interface: "eth0".to_string(),
        credentials: Credentials {
            domain: "home.example.org".to_string(),
            username: None,
            password: "hunter2".to_string(),
        },
        endpoint: UpdateEndpoint::default(),
        engine: EngineConfig {
            poll_interval_secs: 0,
            resolve_retry_secs: 0,
            publish_retry_secs: 0,
            refresh_interval_secs: 43_200,
            event_channel_capacity: 100,
        },
    }
}

pub fn addr(s: &str) -> Ipv6Addr {
    s.parse().expect("test address parses")
}
