// # State Store Trait
//
// Defines the interface for persisting the last IP this updater applied.
//
// ## Purpose
//
// The stored record is what makes a run cheap when nothing changed: if the
// freshly observed address equals the stored one, the zone is not touched.
// It reflects the last *successful* reconciliation only.
//
// ## Implementations
//
// - File-based: [`crate::state::FileStateStore`] (JSON)
// - In-memory: [`crate::state::MemoryStateStore`]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Address returned when nothing usable is stored.
///
/// A loopback address can never be a host's public address, so a run that
/// starts from the sentinel always reconciles.
pub const SENTINEL_IP: &str = "127.0.0.1";

/// The last IP applied to the zone and when it was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRecord {
    /// Dotted-quad address
    pub ip: String,
    /// Time the address was stored
    #[serde(rename = "updateTime")]
    pub update_time: chrono::DateTime<chrono::Utc>,
}

impl IpRecord {
    /// Create a record stamped with the current time
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            update_time: chrono::Utc::now(),
        }
    }

    /// The "no previous state" record
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_IP)
    }

    pub fn is_sentinel(&self) -> bool {
        self.ip == SENTINEL_IP
    }
}

/// Trait for IP state store implementations
///
/// Both operations are infallible from the caller's point of view. Storage
/// faults are handled and logged inside the store:
///
/// - `load` falls back to [`IpRecord::sentinel`] when nothing is stored or the
///   stored state cannot be used
/// - `save` reports `false` when the record could not be written
///
/// A single run assumes exclusive access to the underlying storage; stores do
/// not lock against concurrent invocations.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last applied IP record, or the sentinel
    async fn load(&self) -> IpRecord;

    /// Persist `ip` with the current timestamp
    ///
    /// # Returns
    ///
    /// `true` when the record was written, `false` otherwise (already logged)
    async fn save(&self, ip: &str) -> bool;
}
