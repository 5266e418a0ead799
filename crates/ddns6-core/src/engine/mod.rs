//! Core update loop
//!
//! The UpdateLoop is responsible for:
//! - Polling the AddressSource at a fixed interval
//! - Deciding whether the provider must be (re-)notified
//! - Publishing via UpdatePublisher
//! - Tracking the last confirmed publish in LoopState
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐      resolve      ┌──────────────┐
//! │ AddressSource │ ────────────────▶ │  UpdateLoop  │
//! └───────────────┘                   └──────┬───────┘
//!                                            │ changed or stale?
//!         ┌──────────────────────────────────┼──────────────────┐
//!         ▼                                  ▼                  ▼
//! ┌─────────────────┐               ┌──────────────┐     ┌─────────────┐
//! │ UpdatePublisher │               │  LoopState   │     │   Events    │
//! │  (one request)  │               │ (confirmed)  │     │  (notify)   │
//! └─────────────────┘               └──────────────┘     └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Resolve the current global IPv6 address
//! 2. Publish when the address changed or the refresh ceiling elapsed;
//!    skip otherwise
//! 3. On a confirmed publish, advance LoopState
//! 4. Sleep and start over
//!
//! The sleep is where the backoff policy lives: 1 s between ordinary
//! cycles, 60 s after a resolve failure, 600 s after a publish failure.
//! Neither failure is ever fatal; the loop swallows both after logging
//! and resumes from Idle.

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::state::LoopState;
use crate::traits::{AddressSource, PublishOutcome, UpdatePublisher};
use chrono::Utc;
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Events emitted by the UpdateLoop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Loop started
    Started {
        interface: String,
    },

    /// Address discovery failed; the loop cools down and retries
    ResolveFailed {
        error: String,
    },

    /// Publish skipped (address unchanged and not stale)
    PublishSkipped {
        address: Ipv6Addr,
    },

    /// The provider confirmed the address
    Published {
        address: Ipv6Addr,
        outcome: PublishOutcome,
    },

    /// The provider update failed; the loop cools down and retries
    PublishFailed {
        address: Ipv6Addr,
        error: String,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Core update loop
///
/// The loop orchestrates the resolve → decide → publish flow. It runs
/// continuously until the process is stopped externally; there is no
/// terminal state under normal operation.
///
/// ## Lifecycle
///
/// 1. Create with [`UpdateLoop::new()`]
/// 2. Start with [`UpdateLoop::run()`]
/// 3. The loop runs until a shutdown signal is received
///
/// ## Threading
///
/// Strictly sequential: one resolve, at most one publish, one sleep per
/// cycle. `run()` consumes the loop; [`LoopState`] is a plain owned field
/// and never crosses a concurrency boundary, so no locks are involved.
pub struct UpdateLoop {
    /// Address source polled every cycle
    source: Box<dyn AddressSource>,

    /// Publisher invoked when the address changed or went stale
    publisher: Box<dyn UpdatePublisher>,

    /// Last confirmed publish
    state: LoopState,

    /// Interface name (for logging and the Started event)
    interface: String,

    /// Sleep between ordinary cycles
    poll_interval: Duration,

    /// Cooldown after a failed resolve
    resolve_retry: Duration,

    /// Cooldown after a failed publish
    publish_retry: Duration,

    /// Staleness ceiling for re-asserting an unchanged address
    refresh_interval: chrono::Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl UpdateLoop {
    /// Create a new update loop
    ///
    /// # Returns
    ///
    /// A tuple of (loop, event_receiver) where event_receiver yields
    /// engine events for logging or monitoring.
    pub fn new(
        source: Box<dyn AddressSource>,
        publisher: Box<dyn UpdatePublisher>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            publisher,
            state: LoopState::new(),
            interface: config.interface,
            poll_interval: Duration::from_secs(config.engine.poll_interval_secs),
            resolve_retry: Duration::from_secs(config.engine.resolve_retry_secs),
            publish_retry: Duration::from_secs(config.engine.publish_retry_secs),
            refresh_interval: chrono::Duration::seconds(config.engine.refresh_interval_secs as i64),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the loop until a shutdown signal (SIGINT) is received.
    pub async fn run(self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            interface: self.interface.clone(),
        });
        info!(
            "watching {} via {}, publishing via {}",
            self.interface,
            self.source.source_name(),
            self.publisher.publisher_name()
        );

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                let delay = self.cycle().await;
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT
            loop {
                let delay = self.cycle().await;
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one cycle; returns how long to sleep before the next one.
    ///
    /// The returned duration is the whole backoff policy: the ordinary
    /// poll interval on success or skip, the resolve cooldown when
    /// discovery failed, the publish cooldown when the provider update
    /// failed.
    async fn cycle(&mut self) -> Duration {
        let address = match self.source.resolve().await {
            Ok(address) => address,
            Err(e) => {
                warn!("address resolution failed: {}", e);
                self.emit_event(EngineEvent::ResolveFailed {
                    error: e.to_string(),
                });
                return self.resolve_retry;
            }
        };

        if !self
            .state
            .needs_publish(address, Utc::now(), self.refresh_interval)
        {
            debug!("address {} unchanged and not stale, skipping publish", address);
            self.emit_event(EngineEvent::PublishSkipped { address });
            return self.poll_interval;
        }

        match self.publisher.publish(address).await {
            Ok(outcome) => {
                // `Unchanged` confirms the address just as `Updated` does;
                // both reset the staleness clock.
                self.state.record_publish(address, Utc::now());
                match outcome {
                    PublishOutcome::Updated => info!("updated address to {}", address),
                    PublishOutcome::Unchanged => info!("address {} already up to date", address),
                }
                self.emit_event(EngineEvent::Published { address, outcome });
                self.poll_interval
            }
            Err(e) => {
                // LoopState stays untouched: the same address must be
                // treated as unconfirmed and retried next cycle.
                warn!("publishing {} failed: {}", address, e);
                self.emit_event(EngineEvent::PublishFailed {
                    address,
                    error: e.to_string(),
                });
                self.publish_retry
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            // Channel full: the consumer is slower than event generation.
            // Dropping keeps memory bounded.
            warn!("event channel full, dropping event");
        }
    }

    /// Test-only helper to run the loop with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: contract tests require controlled shutdown.
    /// Production code should use `run()` instead, which shuts down on
    /// OS signals rather than programmatic channels.
    pub async fn run_with_shutdown(self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}
