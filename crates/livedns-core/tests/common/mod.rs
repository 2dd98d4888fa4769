//! Test doubles and common utilities for contract tests
//!
//! The mock provider keeps a small live zone: deletes remove a matching A
//! record (or answer "does not exist"), creates append one. Tests can check
//! both the exact call sequence and the zone the run converged to.

#![allow(dead_code)]

use livedns_core::config::{Credentials, RunConfig};
use livedns_core::error::{Error, Result};
use livedns_core::hostname::normalize_host;
use livedns_core::traits::{
    CreateOutcome, DeleteOutcome, DnsProvider, IpRecord, IpSource, StateStore, ZoneRecord,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "example.com";

/// Reply LiveDNS gives when deleting a host without an A record
pub const NOT_FOUND_REPLY: &str = "A Record does not exists";

/// An IP source that always reports the same address
#[derive(Clone)]
pub struct FixedIpSource {
    ip: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: Some(ip.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose lookup always fails
    pub fn unreachable() -> Self {
        Self {
            ip: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .clone()
            .ok_or_else(|| Error::ip_source("echo service unreachable"))
    }
}

/// A provider call, as recorded by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Delete(String),
    Create { host: String, ip: String, ttl: u32 },
}

impl Call {
    pub fn delete(host: &str) -> Self {
        Call::Delete(host.to_string())
    }

    pub fn create(host: &str, ip: &str, ttl: u32) -> Self {
        Call::Create {
            host: host.to_string(),
            ip: ip.to_string(),
            ttl,
        }
    }
}

/// A mock DnsProvider with a live zone and call log
///
/// Clones share the zone, the call log and the failure switches.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    zone: Arc<Mutex<Vec<ZoneRecord>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failing_deletes: Arc<Mutex<HashSet<String>>>,
    failing_creates: Arc<Mutex<HashSet<String>>>,
    rejecting_creates: Arc<Mutex<HashSet<String>>>,
    failing_listing: Arc<AtomicBool>,
    dry_run: Arc<AtomicBool>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(records: Vec<ZoneRecord>) -> Self {
        let provider = Self::new();
        *provider.zone.lock().unwrap() = records;
        provider
    }

    /// Deletes for `host` raise a transport fault
    pub fn failing_delete(self, host: &str) -> Self {
        self.failing_deletes.lock().unwrap().insert(host.to_string());
        self
    }

    /// Creates for `host` raise a transport fault
    pub fn failing_create(self, host: &str) -> Self {
        self.failing_creates.lock().unwrap().insert(host.to_string());
        self
    }

    /// Creates for `host` are answered without success
    pub fn rejecting_create(self, host: &str) -> Self {
        self.rejecting_creates
            .lock()
            .unwrap()
            .insert(host.to_string());
        self
    }

    /// Zone listing raises a transport fault
    pub fn failing_listing(self) -> Self {
        self.failing_listing.store(true, Ordering::SeqCst);
        self
    }

    /// Deletes and creates are recorded and reported as successful, but the
    /// zone is left as it is
    pub fn dry_run(self) -> Self {
        self.dry_run.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that touched the zone (everything but listing)
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::List)
            .collect()
    }

    pub fn zone(&self) -> Vec<ZoneRecord> {
        self.zone.lock().unwrap().clone()
    }

    /// Addresses of the A records `host` currently has
    pub fn a_records_for(&self, host: &str) -> Vec<String> {
        self.zone()
            .into_iter()
            .filter(|r| r.record_type.is_a() && normalize_host(&r.host, DOMAIN) == host)
            .map(|r| r.data)
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zone_records(&self, _credentials: &Credentials) -> Result<Vec<ZoneRecord>> {
        self.record(Call::List);
        if self.failing_listing.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "zone listing timed out"));
        }
        Ok(self.zone())
    }

    async fn delete_a_record(&self, _credentials: &Credentials, host: &str) -> Result<DeleteOutcome> {
        self.record(Call::delete(host));
        if self.failing_deletes.lock().unwrap().contains(host) {
            return Err(Error::provider("mock", "delete timed out"));
        }
        if self.is_dry_run() {
            return Ok(DeleteOutcome::Removed);
        }

        let mut zone = self.zone.lock().unwrap();
        let position = zone
            .iter()
            .position(|r| r.record_type.is_a() && normalize_host(&r.host, DOMAIN) == host);
        match position {
            Some(index) => {
                zone.remove(index);
                Ok(DeleteOutcome::Removed)
            }
            None => Ok(DeleteOutcome::NotFound {
                reason: NOT_FOUND_REPLY.to_string(),
            }),
        }
    }

    async fn create_a_record(
        &self,
        _credentials: &Credentials,
        host: &str,
        ip: &str,
        ttl: u32,
    ) -> Result<CreateOutcome> {
        self.record(Call::create(host, ip, ttl));
        if self.failing_creates.lock().unwrap().contains(host) {
            return Err(Error::provider("mock", "create timed out"));
        }
        if self.rejecting_creates.lock().unwrap().contains(host) {
            return Ok(CreateOutcome::Rejected {
                reason: "0".to_string(),
            });
        }

        if !self.is_dry_run() {
            self.zone.lock().unwrap().push(ZoneRecord::a(host, ip, ttl));
        }
        Ok(CreateOutcome::Created)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run.load(Ordering::SeqCst)
    }
}

/// A mock StateStore that tracks calls
///
/// Clones share the stored record and counters.
#[derive(Clone, Default)]
pub struct MockStateStore {
    record: Arc<Mutex<Option<IpRecord>>>,
    load_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
    failing_saves: Arc<AtomicBool>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ip(ip: &str) -> Self {
        let store = Self::new();
        *store.record.lock().unwrap() = Some(IpRecord::new(ip));
        store
    }

    /// Saves report failure and leave the record untouched
    pub fn failing_saves(self) -> Self {
        self.failing_saves.store(true, Ordering::SeqCst);
        self
    }

    pub fn stored(&self) -> Option<IpRecord> {
        self.record.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn load(&self) -> IpRecord {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        self.stored().unwrap_or_else(IpRecord::sentinel)
    }

    async fn save(&self, ip: &str) -> bool {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        if self.failing_saves.load(Ordering::SeqCst) {
            return false;
        }
        *self.record.lock().unwrap() = Some(IpRecord::new(ip));
        true
    }
}

/// Helper to create a RunConfig for testing
pub fn config_with_hosts(hosts: &[&str]) -> RunConfig {
    RunConfig::new(
        Credentials::new("user", "secret", DOMAIN),
        hosts.iter().map(|h| h.to_string()).collect(),
    )
}
