// # DNS Provider Trait
//
// Defines the capability interface the reconciliation engine drives against
// the remote zone authority.
//
// ## Implementations
//
// - LiveDNS (SOAP): `livedns-provider` crate
//
// ## Usage
//
// ```rust,ignore
// use livedns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let credentials = /* Credentials from RunConfig */;
//
//     let zone = provider.list_zone_records(&credentials).await?;
//     provider.delete_a_record(&credentials, "www").await?;
//     provider.create_a_record(&credentials, "www", "203.0.113.7", 14400).await?;
//
//     Ok(())
// }
// ```
//
// The remote API has no upsert, so replacing a host's address is always two
// calls with two distinct failure points: a delete that may legitimately find
// nothing, and a create that may be refused.

use crate::config::Credentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a zone record, as far as reconciliation is concerned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 host record, subject to reconciliation
    A,
    /// Any other record type; read but never mutated. Holds the provider's label.
    Other(String),
}

impl RecordType {
    pub fn is_a(&self) -> bool {
        matches!(self, RecordType::A)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::Other(label) => f.write_str(label),
        }
    }
}

/// A single record from a zone snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Host label. Providers may report it fully qualified; the engine
    /// normalizes it to the short form before comparing.
    pub host: String,
    /// Record type
    pub record_type: RecordType,
    /// Record data (an address for A records)
    pub data: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl ZoneRecord {
    /// Create an A record entry
    pub fn a(host: impl Into<String>, data: impl Into<String>, ttl: u32) -> Self {
        Self {
            host: host.into(),
            record_type: RecordType::A,
            data: data.into(),
            ttl,
        }
    }
}

/// Outcome of a delete call that reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// An A record for the host was removed
    Removed,
    /// The provider reported that no A record exists for the host.
    /// This is an expected outcome, not a failure.
    NotFound {
        /// Provider's reply text
        reason: String,
    },
}

/// Outcome of a create call that reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The provider acknowledged the new A record
    Created,
    /// The provider answered but did not report success
    Rejected {
        /// Provider's reply text
        reason: String,
    },
}

/// Trait for DNS provider implementations
///
/// Implementations translate the three zone operations into the provider's
/// wire protocol. They must be thread-safe and usable across async tasks.
///
/// # Error contract
///
/// - `Err` means a transport or provider fault (timeout, HTTP status, SOAP
///   fault, unparsable reply). The engine records it as an operation error
///   for the host and moves on.
/// - "No such record" on delete is NOT an error; return
///   [`DeleteOutcome::NotFound`].
/// - A create the provider answered but refused is NOT an error; return
///   [`CreateOutcome::Rejected`].
///
/// # Responsibilities
///
/// Providers perform one remote call per method invocation. They do not retry,
/// cache zone contents, touch the IP state store or decide whether an update is
/// needed; all of that belongs to the engine and the run controller.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read every record of the configured zone
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ZoneRecord>)`: The zone snapshot, in provider order
    /// - `Err(Error)`: If the zone could not be read
    async fn list_zone_records(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<ZoneRecord>, crate::Error>;

    /// Remove one A record for `host` (short form, `""` for the apex)
    async fn delete_a_record(
        &self,
        credentials: &Credentials,
        host: &str,
    ) -> Result<DeleteOutcome, crate::Error>;

    /// Create an A record `host -> ip` with the given TTL in seconds
    async fn create_a_record(
        &self,
        credentials: &Credentials,
        host: &str,
        ip: &str,
        ttl: u32,
    ) -> Result<CreateOutcome, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether mutations are only logged, not sent
    ///
    /// A dry-run provider reports deletes and creates as successful without
    /// touching the zone, so the run controller must not persist the new IP.
    fn is_dry_run(&self) -> bool {
        false
    }
}
