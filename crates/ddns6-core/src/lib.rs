// # ddns6-core
//
// Core library for the ddns6 IPv6 dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a dynamic-DNS
// host record pointed at the machine's current global IPv6 address:
// - **AddressSource**: Trait for discovering the interface's current address
// - **UpdatePublisher**: Trait for reporting that address to a provider
// - **UpdateLoop**: Sequential poll → decide → publish engine with
//   differentiated cooldowns
// - **LoopState**: In-memory record of the last confirmed publish
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Discovery and publishing are pluggable
//    implementations behind traits; all decisions live in the loop
// 2. **Sequential by Construction**: One resolve, at most one publish,
//    one sleep per cycle; no locks, no concurrent requests
// 3. **Recoverable Errors Only**: Discovery and publish failures are
//    logged, cooled down and retried; neither is ever fatal
// 4. **Library-First**: The daemon binary is a thin wiring layer

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{Credentials, DdnsConfig, EngineConfig, UpdateEndpoint};
pub use engine::{EngineEvent, UpdateLoop};
pub use error::{Error, Result};
pub use state::LoopState;
pub use traits::{AddressSource, PublishOutcome, UpdatePublisher};
