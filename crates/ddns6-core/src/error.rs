//! Error types for the ddns6 system
//!
//! The updater deliberately knows only two recoverable failure kinds:
//! address discovery failed, or the provider update failed. Auth
//! rejections, rate limits and network partitions all fold into the
//! latter; the loop applies one cooldown per kind, nothing finer.

use thiserror::Error;

/// Result type alias for ddns6 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ddns6 system
#[derive(Error, Debug)]
pub enum Error {
    /// Address discovery failed or yielded nothing usable.
    ///
    /// Always recoverable: the loop logs it, cools down and retries.
    /// Carries the raw diagnostic output of the underlying OS query.
    #[error("no IPv6 address: {0}")]
    NoAddress(String),

    /// The provider update failed: transport error, or a response that
    /// contained neither success marker.
    ///
    /// Always recoverable: the loop logs it, cools down and retries with
    /// the same address. Carries the raw response/diagnostic text.
    #[error("update failed: {0}")]
    Publish(String),

    /// Configuration errors. Startup-fatal; never produced by the
    /// running loop.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a "no address" error
    pub fn no_address(msg: impl Into<String>) -> Self {
        Self::NoAddress(msg.into())
    }

    /// Create a publish error
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
