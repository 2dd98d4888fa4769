//! Reconciliation planning
//!
//! Turns a zone snapshot plus the required host list into the ordered set of
//! delete-then-create operations that converge the zone on the current IP.
//! Planning is pure; nothing here talks to the provider.

use crate::hostname::normalize_host;
use crate::traits::ZoneRecord;

/// Delete every A record of `host`, then create one pointing at the plan's IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOperation {
    /// Short host label (`""` is the apex)
    pub host: String,

    /// Number of delete calls to issue before the create.
    ///
    /// One per A record the snapshot holds for this host, and at least one:
    /// a host missing from the zone still gets a delete attempt, which the
    /// provider answers with "not found".
    pub deletes: usize,

    /// TTL for the created record
    pub ttl: u32,

    /// Whether the host was absent from the snapshot and synthesized
    pub synthesized: bool,
}

/// Derived, never persisted: discarded once applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Address every operation creates
    pub current_ip: String,

    /// Operations in execution order
    pub operations: Vec<HostOperation>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Operation for a host, if planned
    pub fn operation(&self, host: &str) -> Option<&HostOperation> {
        self.operations.iter().find(|op| op.host == host)
    }
}

/// Compute the reconciliation plan
///
/// 1. Normalize every snapshot host against `domain`.
/// 2. Drop records that are not A records; they are never touched.
/// 3. Append a placeholder `{host, A, current_ip, default_ttl}` for each
///    required host with no A record in the snapshot.
/// 4. Emit one operation per distinct host of the completed working set, in
///    first-appearance order: snapshot order, then missing required hosts in
///    configuration order.
///
/// A host with several A records keeps all of them as delete targets and
/// takes the TTL of its first record.
pub fn reconcile(
    current_ip: &str,
    snapshot: &[ZoneRecord],
    required_hosts: &[String],
    domain: &str,
    default_ttl: u32,
) -> ReconciliationPlan {
    let mut working: Vec<ZoneRecord> = snapshot
        .iter()
        .filter(|record| record.record_type.is_a())
        .map(|record| ZoneRecord {
            host: normalize_host(&record.host, domain),
            ..record.clone()
        })
        .collect();
    let present = working.len();

    for host in required_hosts {
        if !working.iter().any(|record| &record.host == host) {
            working.push(ZoneRecord::a(host.clone(), current_ip, default_ttl));
        }
    }

    let mut operations: Vec<HostOperation> = Vec::new();
    for (index, record) in working.into_iter().enumerate() {
        match operations.iter_mut().find(|op| op.host == record.host) {
            Some(op) => op.deletes += 1,
            None => operations.push(HostOperation {
                host: record.host,
                deletes: 1,
                ttl: record.ttl,
                synthesized: index >= present,
            }),
        }
    }

    ReconciliationPlan {
        current_ip: current_ip.to_string(),
        operations,
    }
}
