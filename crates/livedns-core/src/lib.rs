// # livedns-core
//
// Core library for the LiveDNS host record updater.
//
// ## Architecture Overview
//
// The updater keeps a set of host A records pointed at the machine's public
// IP. It runs once per invocation (an external scheduler provides the
// cadence):
// - **IpSource**: Trait for obtaining the current public IP
// - **DnsProvider**: Trait for reading a zone and deleting/creating A records
// - **StateStore**: Trait for persisting the last applied IP
// - **ReconciliationEngine**: Plans and applies delete-then-create operations
// - **Updater**: Run controller tying the above together
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic is separate from I/O
// 2. **Capability Interfaces**: The provider transport is swappable
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Best Effort per Host**: One failing host never blocks the others
// 5. **Idempotency**: Stored state only advances after full convergence

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod hostname;
pub mod state;
pub mod updater;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpRecord, IpSource, StateStore, ZoneRecord};
pub use engine::{HostOutcome, HostResult, ReconciliationEngine, ReconciliationPlan};
pub use config::{Credentials, RunConfig};
pub use error::{Error, Result};
pub use state::{FileStateStore, MemoryStateStore};
pub use updater::{RunReport, Updater};
