//! Core traits for the ddns6 system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressSource`]: Discover the interface's current global IPv6 address
//! - [`UpdatePublisher`]: Report that address to a dynamic-DNS provider

pub mod address_source;
pub mod update_publisher;

pub use address_source::AddressSource;
pub use update_publisher::{PublishOutcome, UpdatePublisher};
