//! Core traits for the LiveDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Obtain the current public IP
//! - [`DnsProvider`]: Read a zone and delete/create A records
//! - [`StateStore`]: Persist the last applied IP

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{CreateOutcome, DeleteOutcome, DnsProvider, RecordType, ZoneRecord};
pub use state_store::{IpRecord, SENTINEL_IP, StateStore};
